//! Customer order handlers
//!
//! Ordering, browsing, and cancelling. Settlement lives in the staff
//! handlers; a customer can never move their own order to SUCCESS.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Serialize;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{Order, OrderCreate, OrderWithItems};
use crate::db::repository::{order as order_repo, restaurant as restaurant_repo};
use crate::orders;
use crate::utils::{AppError, AppResult};

/// GET /api/orders - own orders, newest first
pub async fn list(
    State(state): State<ServerState>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<Order>>> {
    let orders = order_repo::find_all_by_customer(&state.pool, &current_user.id).await?;
    Ok(Json(orders))
}

/// GET /api/orders/{id} - one own order with its line items
pub async fn get_by_id(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<OrderWithItems>> {
    let order = order_repo::find_by_id_for_customer(&state.pool, &id, &current_user.id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Order {id} not found")))?;

    let items = order_repo::items_for(&state.pool, &id).await?;

    Ok(Json(OrderWithItems { order, items }))
}

/// POST /api/orders - place a new order
///
/// The total is computed server-side from the submitted cart and fixed
/// for the life of the order.
pub async fn create(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    Json(payload): Json<OrderCreate>,
) -> AppResult<Json<OrderWithItems>> {
    let restaurant = restaurant_repo::find_by_id(&state.pool, &payload.restaurant_id)
        .await?
        .ok_or_else(|| {
            AppError::not_found(format!("Restaurant {} not found", payload.restaurant_id))
        })?;

    let order = order_repo::create(
        &state.pool,
        &current_user.id,
        &restaurant.id,
        &payload.cart,
        payload.collection_time,
    )
    .await?;

    tracing::info!(
        order_id = %order.order.id,
        customer_id = %current_user.id,
        total = order.order.total,
        "Order created"
    );

    Ok(Json(order))
}

/// Cancel response: the affected order plus the refreshed order list,
/// so the client can redraw without a second request
#[derive(Debug, Serialize)]
pub struct CancelResponse {
    pub order: Order,
    pub orders: Vec<Order>,
}

/// PUT /api/orders/{id}/cancel
///
/// Cancelling an already-cancelled order is a no-op success.
pub async fn cancel(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<CancelResponse>> {
    let order = orders::cancel_order(&state.pool, &current_user.id, &id).await?;
    let orders = order_repo::find_all_by_customer(&state.pool, &current_user.id).await?;

    Ok(Json(CancelResponse { order, orders }))
}
