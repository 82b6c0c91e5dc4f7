//! Shared types for the Caja day-close suite
//!
//! Domain models, the pure cash-reconciliation math, the unified API
//! response envelope and ID/time utilities used by both the server and
//! the typed HTTP client.

pub mod cash;
pub mod models;
pub mod response;
pub mod util;

// Re-exports
pub use cash::{DENOMINATIONS, DenominationCount, DenominationOverride, Reconciliation};
pub use response::{ApiResponse, PageMeta};
pub use serde::{Deserialize, Serialize};
