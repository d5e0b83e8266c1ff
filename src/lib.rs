//! Canteen Server - campus food-ordering backend
//!
//! A wallet-based ordering service: customers place orders against a
//! prepaid credit balance, staff scan pickup codes at the counter, and
//! settlement atomically debits the wallet while the order flips to
//! SUCCESS exactly once.
//!
//! # Module structure
//!
//! ```text
//! src/
//! ├── core/       # configuration, state, HTTP server
//! ├── auth/       # JWT authentication, roles
//! ├── api/        # HTTP routes and handlers
//! ├── db/         # SQLite pool, models, repositories
//! ├── orders/     # order status machine and settlement protocol
//! ├── reporting/  # day-grouped reports
//! └── utils/      # errors, logging, time helpers
//! ```

pub mod api;
pub mod auth;
pub mod core;
pub mod db;
pub mod orders;
pub mod reporting;
pub mod utils;

// Re-export public types
pub use auth::{CurrentUser, JwtService, Role};
pub use core::{Config, Server, ServerState};
pub use orders::{OrderStatus, ScanOutcome, SettleOutcome};
pub use utils::{AppError, AppResult};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

/// Load .env, make sure the working directory exists, and start logging
pub fn setup_environment() -> std::io::Result<()> {
    dotenv::dotenv().ok();

    let work_dir = std::env::var("WORK_DIR").unwrap_or_else(|_| "./data".into());
    std::fs::create_dir_all(&work_dir)?;

    let log_dir = format!("{work_dir}/logs");
    std::fs::create_dir_all(&log_dir)?;
    init_logger_with_file(None, Some(&log_dir));

    Ok(())
}
