//! Order repository
//!
//! Read side plus creation. The status transitions (scan, settle, cancel)
//! live in [`crate::orders::settlement`] next to their invariants.

use sqlx::SqlitePool;
use uuid::Uuid;

use super::{RepoError, RepoResult};
use crate::db::models::{CartItem, Order, OrderItem, OrderWithItems};
use crate::utils::now_millis;

pub const ORDER_SELECT: &str = "SELECT id, customer_id, restaurant_id, total, status, collection_time, scanned_by, succeeded_by, created_at, updated_at FROM orders";

pub async fn find_by_id(pool: &SqlitePool, id: &str) -> RepoResult<Option<Order>> {
    let sql = format!("{ORDER_SELECT} WHERE id = ?");
    let order = sqlx::query_as::<_, Order>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(order)
}

/// Order scoped to its owning customer, the shape every lifecycle
/// operation validates against
pub async fn find_by_id_for_customer(
    pool: &SqlitePool,
    id: &str,
    customer_id: &str,
) -> RepoResult<Option<Order>> {
    let sql = format!("{ORDER_SELECT} WHERE id = ? AND customer_id = ?");
    let order = sqlx::query_as::<_, Order>(&sql)
        .bind(id)
        .bind(customer_id)
        .fetch_optional(pool)
        .await?;
    Ok(order)
}

pub async fn find_all_by_customer(pool: &SqlitePool, customer_id: &str) -> RepoResult<Vec<Order>> {
    let sql = format!("{ORDER_SELECT} WHERE customer_id = ? ORDER BY created_at DESC");
    let orders = sqlx::query_as::<_, Order>(&sql)
        .bind(customer_id)
        .fetch_all(pool)
        .await?;
    Ok(orders)
}

pub async fn find_by_restaurant(pool: &SqlitePool, restaurant_id: &str) -> RepoResult<Vec<Order>> {
    let sql = format!("{ORDER_SELECT} WHERE restaurant_id = ? ORDER BY collection_time DESC");
    let orders = sqlx::query_as::<_, Order>(&sql)
        .bind(restaurant_id)
        .fetch_all(pool)
        .await?;
    Ok(orders)
}

/// Settled orders attributed to any of the given staff identities
pub async fn find_succeeded_by(pool: &SqlitePool, staff_ids: &[String]) -> RepoResult<Vec<Order>> {
    if staff_ids.is_empty() {
        return Ok(vec![]);
    }
    let placeholders = vec!["?"; staff_ids.len()].join(", ");
    let sql = format!("{ORDER_SELECT} WHERE succeeded_by IN ({placeholders})");
    let mut query = sqlx::query_as::<_, Order>(&sql);
    for id in staff_ids {
        query = query.bind(id);
    }
    Ok(query.fetch_all(pool).await?)
}

pub async fn items_for(pool: &SqlitePool, order_id: &str) -> RepoResult<Vec<OrderItem>> {
    let items = sqlx::query_as::<_, OrderItem>(
        "SELECT id, order_id, product_id, name, unit_price, quantity FROM order_items WHERE order_id = ? ORDER BY id",
    )
    .bind(order_id)
    .fetch_all(pool)
    .await?;
    Ok(items)
}

/// Insert a PENDING order and its line items in one transaction.
///
/// `total` is computed here, once; nothing ever recomputes it.
pub async fn create(
    pool: &SqlitePool,
    customer_id: &str,
    restaurant_id: &str,
    cart: &[CartItem],
    collection_time: i64,
) -> RepoResult<OrderWithItems> {
    if cart.is_empty() {
        return Err(RepoError::Validation("Cart is empty".into()));
    }
    for item in cart {
        if item.unit_price < 0 || item.quantity <= 0 {
            return Err(RepoError::Validation(format!(
                "Invalid line item: {} (price {}, quantity {})",
                item.name, item.unit_price, item.quantity
            )));
        }
    }

    let total: i64 = cart.iter().map(|i| i.unit_price * i.quantity).sum();
    let now = now_millis();
    let id = Uuid::new_v4().to_string();

    let mut tx = pool.begin().await?;

    sqlx::query(
        "INSERT INTO orders (id, customer_id, restaurant_id, total, status, collection_time, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, 'PENDING', ?5, ?6, ?6)",
    )
    .bind(&id)
    .bind(customer_id)
    .bind(restaurant_id)
    .bind(total)
    .bind(collection_time)
    .bind(now)
    .execute(&mut *tx)
    .await?;

    for item in cart {
        sqlx::query(
            "INSERT INTO order_items (order_id, product_id, name, unit_price, quantity) VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(&id)
        .bind(&item.product_id)
        .bind(item.name.trim())
        .bind(item.unit_price)
        .bind(item.quantity)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    let order = find_by_id(pool, &id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create order".into()))?;
    let items = items_for(pool, &id).await?;
    Ok(OrderWithItems { order, items })
}
