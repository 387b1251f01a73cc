//! Application state

use busline::{ApiError, MongoDb};
use tokio::sync::OnceCell;

use crate::config::Config;

/// Shared application state
///
/// Holds the server configuration and the process-wide database handle. The
/// handle is established lazily by the first request that needs it and
/// reused by every request after that; the `mongodb::Client` behind it is a
/// connection pool and supports concurrent use.
pub struct AppState {
    config: Config,
    db: OnceCell<MongoDb>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get the database handle, connecting on first use.
    ///
    /// The OnceCell doubles as the initialization barrier for concurrent
    /// first requests: one of them connects, the others wait for the result.
    /// A failed attempt leaves the cell unset, so the failing request gets a
    /// 500 and the next request retries the connection.
    pub async fn db(&self) -> Result<&MongoDb, ApiError> {
        self.db
            .get_or_try_init(|| async {
                MongoDb::connect(&self.config.database_url, &self.config.database_name).await
            })
            .await
            .map_err(|e| {
                tracing::error!("database connection failed: {}", e);
                ApiError::Connection(e.to_string())
            })
    }
}
