//! Shared server state

use std::sync::Arc;

use sqlx::SqlitePool;

use crate::auth::JwtService;
use crate::core::Config;
use crate::db::DbService;
use crate::utils::AppResult;

/// State shared by every handler. Cheap to clone; the pool and the JWT
/// service are both reference counted.
#[derive(Clone)]
pub struct ServerState {
    pub config: Config,
    pub pool: SqlitePool,
    pub jwt: Arc<JwtService>,
}

impl ServerState {
    pub fn new(config: Config, pool: SqlitePool) -> Self {
        let jwt = Arc::new(JwtService::with_config(config.jwt.clone()));
        Self { config, pool, jwt }
    }

    /// Open the database under the configured working directory and
    /// build the state around it.
    pub async fn initialize(config: &Config) -> AppResult<Self> {
        std::fs::create_dir_all(&config.work_dir).map_err(|e| {
            crate::utils::AppError::internal(format!(
                "Failed to create work dir {}: {e}",
                config.work_dir
            ))
        })?;

        let db = DbService::new(&config.db_path()).await?;
        Ok(Self::new(config.clone(), db.pool))
    }
}
