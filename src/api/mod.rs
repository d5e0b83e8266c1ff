//! API route modules
//!
//! # Structure
//!
//! - [`health`] - health check
//! - [`auth`] - signup, login, current profile
//! - [`orders`] - customer-side order lifecycle
//! - [`staff`] - counter operations: scan, settle, top-up
//! - [`owner`] - restaurant management, roster, reports

pub mod auth;
pub mod health;
pub mod orders;
pub mod owner;
pub mod staff;

// Re-export common types for handlers
pub use crate::utils::{AppResponse, AppResult};
