//! Restaurant model

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Restaurant entity. One per owner.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Restaurant {
    pub id: String,
    pub name: String,
    pub location: Option<String>,
    pub institute: Option<String>,
    pub owner_id: String,
    pub opening_hours: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Roster entry: staff membership with an active flag
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct StaffEntry {
    pub restaurant_id: String,
    pub user_id: String,
    pub is_active: bool,
    pub created_at: i64,
}

/// Restaurant creation payload
#[derive(Debug, Deserialize, Validate)]
pub struct RestaurantCreate {
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    pub location: Option<String>,
    pub institute: Option<String>,
    pub opening_hours: Option<String>,
}

/// Add-staff payload (lookup by email, like the roster screen submits)
#[derive(Debug, Deserialize, Validate)]
pub struct StaffAdd {
    #[validate(email)]
    pub email: String,
}
