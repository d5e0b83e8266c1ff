//! Authentication API module

mod handler;

use axum::{Router, routing::{get, post}};

use crate::core::ServerState;

pub use handler::{AuthResponse, LoginRequest};

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/auth", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/signup", post(handler::signup))
        .route("/login", post(handler::login))
        .route("/me", get(handler::me))
}
