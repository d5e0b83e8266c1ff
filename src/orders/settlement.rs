//! Order settlement protocol
//!
//! The invariant-bearing core of the system. Three operations move an
//! order through its lifecycle:
//!
//! - **scan**: staff-side pre-check; verifies the customer can afford the
//!   order and marks it SCANNED. No money moves.
//! - **confirm settlement**: debits the customer and flips the order to
//!   SUCCESS in one transaction. The debit is guarded by
//!   `WHERE credit >= total`, the flip by `WHERE status IN
//!   ('PENDING','SCANNED')`, so concurrent attempts serialize to exactly
//!   one success and a balance can never go negative.
//! - **cancel**: customer-side PENDING -> CANCELLED; anything else is a
//!   no-op returning the current state.
//!
//! All checks re-read the latest rows; nothing trusts a balance fetched
//! during an earlier step.

use sqlx::SqlitePool;

use crate::db::models::{Order, Restaurant};
use crate::db::repository::{ORDER_SELECT, order as order_repo, restaurant as restaurant_repo, user as user_repo};
use crate::orders::OrderStatus;
use crate::utils::{AppError, AppResult, now_millis};

/// Result of a scan attempt
#[derive(Debug)]
pub enum ScanOutcome {
    /// Order moved to (or was already) SCANNED
    Scanned(Order),
    /// Order was settled previously; idempotent, not an error
    AlreadySuccess,
}

/// Result of a settlement attempt
#[derive(Debug)]
pub enum SettleOutcome {
    /// Debit applied and order flipped to SUCCESS
    Settled(Order),
    /// Order was settled previously; no second debit occurred
    AlreadySettled,
}

/// Restaurant the acting user is entitled to operate on: owned, or
/// actively staffed. Anything else is an authorization failure.
pub async fn authorize_actor(pool: &SqlitePool, actor_id: &str) -> AppResult<Restaurant> {
    let actor = user_repo::find_by_id(pool, actor_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("User {actor_id} not found")))?;

    let role = actor.role();
    if !role.is_owner() && !role.is_active_staff() {
        return Err(AppError::forbidden("You are not owner or staff"));
    }

    restaurant_repo::find_for_actor(pool, actor_id)
        .await?
        .ok_or_else(|| AppError::not_found("Restaurant not found"))
}

/// Order scoped to customer and restaurant. An absent order is 404; an
/// order of a foreign restaurant is 403.
async fn load_order_for_restaurant(
    pool: &SqlitePool,
    order_id: &str,
    customer_id: &str,
    restaurant: &Restaurant,
) -> AppResult<Order> {
    let order = order_repo::find_by_id_for_customer(pool, order_id, customer_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Order {order_id} not found")))?;

    if order.restaurant_id != restaurant.id {
        return Err(AppError::forbidden(
            "Order does not belong to your restaurant",
        ));
    }
    Ok(order)
}

/// Staff-side pre-settlement check
///
/// Verifies the customer covers the order total before anything is
/// scanned, so the counter can reject up front. The same check runs again
/// inside [`confirm_settlement`] - a top-up or another order may change
/// the balance between the two steps.
pub async fn scan_order(
    pool: &SqlitePool,
    actor_id: &str,
    order_id: &str,
    customer_id: &str,
) -> AppResult<ScanOutcome> {
    let restaurant = authorize_actor(pool, actor_id).await?;
    let order = load_order_for_restaurant(pool, order_id, customer_id, &restaurant).await?;

    let customer = user_repo::find_by_id(pool, customer_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Customer {customer_id} not found")))?;

    if customer.credit < order.total {
        return Err(AppError::insufficient_credit(format!(
            "Customer balance {} does not cover order total {}",
            customer.credit, order.total
        )));
    }

    if order.status == OrderStatus::Success {
        return Ok(ScanOutcome::AlreadySuccess);
    }
    if order.status == OrderStatus::Cancelled {
        return Err(AppError::conflict("Order has been cancelled"));
    }

    // CAS on the current status; re-scanning a SCANNED order just refreshes
    // the scanner identity.
    let rows = sqlx::query(
        "UPDATE orders SET status = 'SCANNED', scanned_by = ?1, updated_at = ?2 WHERE id = ?3 AND status IN ('PENDING', 'SCANNED')",
    )
    .bind(actor_id)
    .bind(now_millis())
    .bind(order_id)
    .execute(pool)
    .await
    .map_err(|e| AppError::database(e.to_string()))?;

    if rows.rows_affected() == 0 {
        // Lost a race to a terminal transition; report what the order became
        return match reload_status(pool, order_id).await? {
            OrderStatus::Success => Ok(ScanOutcome::AlreadySuccess),
            status => Err(AppError::conflict(format!("Order is {status}"))),
        };
    }

    let updated = order_repo::find_by_id(pool, order_id)
        .await?
        .ok_or_else(|| AppError::database("Order vanished after scan"))?;

    tracing::info!(order_id, scanned_by = actor_id, "Order scanned");
    Ok(ScanOutcome::Scanned(updated))
}

/// Atomic debit-and-settle
///
/// The status flip and the balance debit commit as one unit. Either
/// sub-update matching zero rows aborts the transaction, leaving both
/// documents untouched; a commit failure surfaces as a transaction error
/// and the caller may retry (a retry against a settled order lands in the
/// AlreadySettled branch, never a double debit).
pub async fn confirm_settlement(
    pool: &SqlitePool,
    actor_id: &str,
    order_id: &str,
    customer_id: &str,
) -> AppResult<SettleOutcome> {
    let restaurant = authorize_actor(pool, actor_id).await?;
    let order = load_order_for_restaurant(pool, order_id, customer_id, &restaurant).await?;

    let mut tx = pool
        .begin()
        .await
        .map_err(|e| AppError::transaction(e.to_string()))?;

    let now = now_millis();
    let flipped = sqlx::query(
        "UPDATE orders SET status = 'SUCCESS', succeeded_by = ?1, updated_at = ?2 WHERE id = ?3 AND customer_id = ?4 AND status IN ('PENDING', 'SCANNED')",
    )
    .bind(actor_id)
    .bind(now)
    .bind(order_id)
    .bind(customer_id)
    .execute(&mut *tx)
    .await
    .map_err(|e| AppError::transaction(e.to_string()))?;

    if flipped.rows_affected() == 0 {
        // Already terminal; roll back the empty transaction and report
        tx.rollback()
            .await
            .map_err(|e| AppError::transaction(e.to_string()))?;
        return match reload_status(pool, order_id).await? {
            OrderStatus::Success => Ok(SettleOutcome::AlreadySettled),
            status => Err(AppError::conflict(format!("Order is {status}"))),
        };
    }

    // Balance re-check and debit in one statement, against the latest row
    let debited = sqlx::query(
        "UPDATE users SET credit = credit - ?1, updated_at = ?2 WHERE id = ?3 AND credit >= ?1",
    )
    .bind(order.total)
    .bind(now)
    .bind(customer_id)
    .execute(&mut *tx)
    .await
    .map_err(|e| AppError::transaction(e.to_string()))?;

    if debited.rows_affected() == 0 {
        tx.rollback()
            .await
            .map_err(|e| AppError::transaction(e.to_string()))?;
        return Err(AppError::insufficient_credit(format!(
            "Customer balance does not cover order total {}",
            order.total
        )));
    }

    tx.commit()
        .await
        .map_err(|e| AppError::transaction(e.to_string()))?;

    let settled = order_repo::find_by_id(pool, order_id)
        .await?
        .ok_or_else(|| AppError::database("Order vanished after settlement"))?;

    tracing::info!(
        order_id,
        succeeded_by = actor_id,
        total = order.total,
        "Order settled"
    );
    Ok(SettleOutcome::Settled(settled))
}

/// Customer-side cancellation: PENDING -> CANCELLED only
///
/// Cancelling an order that already left PENDING returns the current
/// order unchanged - the caller sees the state, not an error.
pub async fn cancel_order(pool: &SqlitePool, customer_id: &str, order_id: &str) -> AppResult<Order> {
    let order = order_repo::find_by_id_for_customer(pool, order_id, customer_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Order {order_id} not found")))?;

    if order.status != OrderStatus::Pending {
        return Ok(order);
    }

    sqlx::query(
        "UPDATE orders SET status = 'CANCELLED', updated_at = ?1 WHERE id = ?2 AND status = 'PENDING'",
    )
    .bind(now_millis())
    .bind(order_id)
    .execute(pool)
    .await
    .map_err(|e| AppError::database(e.to_string()))?;

    // Whether we won the CAS or lost it to a concurrent transition, the
    // current row is the answer.
    let current = order_repo::find_by_id(pool, order_id)
        .await?
        .ok_or_else(|| AppError::database("Order vanished after cancel"))?;

    tracing::info!(order_id, status = %current.status, "Order cancel requested");
    Ok(current)
}

async fn reload_status(pool: &SqlitePool, order_id: &str) -> AppResult<OrderStatus> {
    let sql = format!("{ORDER_SELECT} WHERE id = ?");
    let order = sqlx::query_as::<_, Order>(&sql)
        .bind(order_id)
        .fetch_optional(pool)
        .await
        .map_err(|e| AppError::database(e.to_string()))?
        .ok_or_else(|| AppError::not_found(format!("Order {order_id} not found")))?;
    Ok(order.status)
}
