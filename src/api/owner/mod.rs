//! Owner API module

mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

pub use handler::RosterMember;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/owner", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route(
            "/restaurant",
            get(handler::get_restaurant).post(handler::create_restaurant),
        )
        .route("/staff", get(handler::roster).post(handler::add_staff))
        .route("/reports/orders", get(handler::orders_report))
        .route("/reports/accounts", get(handler::accounts_report))
}
