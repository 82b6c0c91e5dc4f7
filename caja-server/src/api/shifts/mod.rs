//! Shift API

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/shifts", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).post(handler::start))
        .route("/close", post(handler::close))
        .route("/day-close", post(handler::day_close))
        .route("/reconcile", post(handler::reconcile_preview))
        .route("/current", get(handler::get_current))
        .route("/by-day", get(handler::list_by_day))
        .route("/{id}", get(handler::get_by_id))
}
