//! Utility module - common helpers and types
//!
//! - [`AppError`] - application error type
//! - time and validation helpers, logging setup

pub mod error;
pub mod logger;
pub mod result;
pub mod time;
pub mod validation;

pub use error::{AppError, ok, ok_paged, ok_with_message};
pub use result::AppResult;
