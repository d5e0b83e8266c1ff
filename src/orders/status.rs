//! Order status state machine
//!
//! Status only ever moves forward:
//!
//! ```text
//! PENDING ──> SCANNED ──> SUCCESS
//!    │                      ▲
//!    │          (PENDING may settle directly)
//!    └──> CANCELLED
//! ```
//!
//! `SUCCESS` and `CANCELLED` are terminal.

use serde::{Deserialize, Serialize};

/// Order status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Pending,
    Scanned,
    Success,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Scanned => "SCANNED",
            Self::Success => "SUCCESS",
            Self::Cancelled => "CANCELLED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "PENDING" => Some(Self::Pending),
            "SCANNED" => Some(Self::Scanned),
            "SUCCESS" => Some(Self::Success),
            "CANCELLED" => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// No transition leaves a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Success | Self::Cancelled)
    }

    /// Legal transition table
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        matches!(
            (self, next),
            (Pending, Scanned) | (Pending, Cancelled) | (Pending, Success) | (Scanned, Success)
        )
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
