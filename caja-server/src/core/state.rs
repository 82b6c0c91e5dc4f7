use sqlx::SqlitePool;

use crate::core::Config;
use crate::db::DbService;
use crate::utils::AppError;

/// Server state - shared by all handlers
///
/// Cheap to clone: the pool is internally reference counted and the config
/// is immutable after startup.
#[derive(Clone, Debug)]
pub struct ServerState {
    /// Server configuration
    pub config: Config,
    /// SQLite connection pool
    pub pool: SqlitePool,
}

impl ServerState {
    /// Initialize server state: ensure the working directory exists, open
    /// the database and run migrations
    pub async fn initialize(config: &Config) -> Result<Self, AppError> {
        std::fs::create_dir_all(&config.work_dir)
            .map_err(|e| AppError::internal(format!("Failed to create work dir: {e}")))?;

        let db = DbService::new(&config.database_path).await?;

        Ok(Self {
            config: config.clone(),
            pool: db.pool,
        })
    }
}
