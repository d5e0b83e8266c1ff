//! Top-up model

use serde::{Deserialize, Serialize};

/// Append-only credit grant. Never mutated or deleted; consumed only by
/// the accounts report.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct TopUp {
    pub id: String,
    pub maker_id: String,
    pub user_id: String,
    /// Amount in minor currency units, always positive
    pub amount: i64,
    pub created_at: i64,
}

/// How the top-up target is identified
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TopUpKeyType {
    UserId,
    Email,
    PhoneNumber,
}

/// Top-up request: `key` interpreted according to `key_type`
#[derive(Debug, Deserialize)]
pub struct TopUpCreate {
    pub key: String,
    #[serde(rename = "type")]
    pub key_type: TopUpKeyType,
    pub amount: i64,
}
