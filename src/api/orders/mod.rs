//! Customer orders API module

mod handler;

use axum::{Router, routing::{get, put}};

use crate::core::ServerState;

pub use handler::CancelResponse;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/orders", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route("/{id}", get(handler::get_by_id))
        .route("/{id}/cancel", put(handler::cancel))
}
