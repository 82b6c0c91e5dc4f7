//! Caja Client - HTTP client for the Caja server
//!
//! Typed wrappers over the shift, order and report endpoints. Operator
//! identity travels in headers; the server trusts them as-is.

pub mod config;
pub mod error;
pub mod http;

pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use http::HttpClient;

// Re-export shared types for convenience
pub use shared::cash::{DenominationCount, DenominationOverride, Reconciliation};
pub use shared::models::{
    DayCloseOutcome, DayCloseRequest, DayGroup, DayReport, DaySummary, SaleOrder, SaleOrderCreate,
    Shift, ShiftClose, ShiftStart,
};
pub use shared::response::ApiResponse;
