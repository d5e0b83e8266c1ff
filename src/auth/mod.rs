//! Authentication and authorization
//!
//! - [`JwtService`] - token service
//! - [`CurrentUser`] - authenticated user context
//! - [`require_auth`] - auth middleware
//! - [`Role`] - tagged user role

pub mod extractor;
pub mod jwt;
pub mod middleware;
pub mod role;

pub use jwt::{Claims, CurrentUser, JwtConfig, JwtError, JwtService};
pub use middleware::require_auth;
pub use role::{AccessLevel, Role};
