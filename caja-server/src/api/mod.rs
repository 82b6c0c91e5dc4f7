//! API routing
//!
//! # Structure
//!
//! - [`health`] - liveness check
//! - [`shifts`] - shift lifecycle and reconciliation
//! - [`orders`] - sale capture
//! - [`reports`] - day reports, summaries, exports

pub mod health;
pub mod operator;
pub mod orders;
pub mod reports;
pub mod shifts;

use axum::Router;

use crate::core::ServerState;

pub use operator::Operator;

/// Assemble the full API router with state applied
pub fn router(state: ServerState) -> Router {
    Router::new()
        .merge(health::router())
        .merge(shifts::router())
        .merge(orders::router())
        .merge(reports::router())
        .with_state(state)
}
