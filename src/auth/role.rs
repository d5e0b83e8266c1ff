//! Role definitions
//!
//! An explicit tagged role type for accounts. Stored in the `users`
//! table as `role` + `staff_active` + `staff_access` columns.

use serde::{Deserialize, Serialize};

/// Staff access level. Newly added staff get level A.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccessLevel {
    A,
    B,
}

impl AccessLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "A" => Some(Self::A),
            "B" => Some(Self::B),
            _ => None,
        }
    }
}

/// User role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Owner,
    Staff { active: bool, access: AccessLevel },
    Customer,
}

impl Role {
    /// Database tag for the `role` column
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Owner => "OWNER",
            Self::Staff { .. } => "STAFF",
            Self::Customer => "CUSTOMER",
        }
    }

    /// Reassemble a role from its table columns. Unknown tags degrade to
    /// Customer rather than failing the whole row.
    pub fn from_columns(tag: &str, staff_active: bool, staff_access: Option<&str>) -> Self {
        match tag {
            "OWNER" => Self::Owner,
            "STAFF" => Self::Staff {
                active: staff_active,
                access: staff_access
                    .and_then(AccessLevel::parse)
                    .unwrap_or(AccessLevel::A),
            },
            _ => Self::Customer,
        }
    }

    pub fn is_owner(&self) -> bool {
        matches!(self, Self::Owner)
    }

    /// Active staff may scan and settle orders for their restaurant
    pub fn is_active_staff(&self) -> bool {
        matches!(self, Self::Staff { active: true, .. })
    }
}
