//! Order model

use serde::{Deserialize, Serialize};

use crate::orders::OrderStatus;

/// Order entity
///
/// `total` is computed once at creation from the line items and never
/// recomputed. `scanned_by` / `succeeded_by` record the staff identity
/// that performed each transition.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Order {
    pub id: String,
    pub customer_id: String,
    pub restaurant_id: String,
    pub total: i64,
    pub status: OrderStatus,
    pub collection_time: i64,
    pub scanned_by: Option<String>,
    pub succeeded_by: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Order line item
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct OrderItem {
    pub id: i64,
    pub order_id: String,
    pub product_id: String,
    pub name: String,
    pub unit_price: i64,
    pub quantity: i64,
}

/// Cart line submitted at order creation
#[derive(Debug, Clone, Deserialize)]
pub struct CartItem {
    pub product_id: String,
    pub name: String,
    /// Unit price in minor currency units
    pub unit_price: i64,
    pub quantity: i64,
}

/// Order creation payload
#[derive(Debug, Deserialize)]
pub struct OrderCreate {
    pub restaurant_id: String,
    pub cart: Vec<CartItem>,
    /// Requested collection time, Unix millis
    pub collection_time: i64,
}

/// Order plus its line items, the customer-facing shape
#[derive(Debug, Clone, Serialize)]
pub struct OrderWithItems {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
}
