//! Utility module - shared helpers and types
//!
//! - [`AppError`] / [`AppResult`] - application error types
//! - [`logger`] - tracing setup
//! - [`time`] - Unix-millis helpers

pub mod error;
pub mod logger;
pub mod result;
pub mod time;

pub use error::{AppError, AppResponse, ok, ok_with_message};
pub use result::AppResult;
pub use time::{millis_to_date, now_millis};
