//! Day Report API

mod handler;

use axum::{
    Router,
    routing::{delete, get},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/reports", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list))
        .route("/summary", get(handler::summary))
        .route("/download", get(handler::download))
        .route("/{id}", get(handler::get_by_id).delete(handler::delete_by_id))
        .route("/{id}/receipt", get(handler::receipt))
        .route("/date/{date}", delete(handler::delete_by_date))
}
