//! Staff counter API module

mod handler;

use axum::{Router, routing::{get, post, put}};

use crate::core::ServerState;

pub use handler::{OrderRef, ScanResponse, SettleResponse, TopUpResponse};

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/staff", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/orders/scan", post(handler::scan))
        .route("/orders/settle", put(handler::settle))
        .route("/topups", get(handler::topup_history).post(handler::topup))
}
