use std::sync::Arc;
use std::time::Duration;

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tokio::sync::OnceCell;

use crate::config::Config;

/// Process-scoped handle over a lazily-initialized Postgres pool.
///
/// Nothing connects at startup; the first request that needs the store pays
/// for the connect. `OnceCell` makes that first use single-flight: concurrent
/// callers wait on one connect attempt instead of racing their own.
#[derive(Clone)]
pub struct Db {
    database_url: String,
    pool_max: u32,
    timeout: Duration,
    pool: Arc<OnceCell<PgPool>>,
}

impl Db {
    pub fn new(cfg: &Config) -> Self {
        Self {
            database_url: cfg.database_url.clone(),
            pool_max: cfg.db_pool_max,
            timeout: cfg.db_timeout,
            pool: Arc::new(OnceCell::new()),
        }
    }

    pub async fn pool(&self) -> Result<&PgPool, sqlx::Error> {
        self.pool
            .get_or_try_init(|| async {
                tracing::info!("Connecting to Postgres (pool max {})", self.pool_max);
                PgPoolOptions::new()
                    .max_connections(self.pool_max)
                    .acquire_timeout(self.timeout)
                    .connect(&self.database_url)
                    .await
            })
            .await
    }

    /// Explicit shutdown hook; a no-op when the pool was never touched.
    pub async fn close(&self) {
        if let Some(pool) = self.pool.get() {
            pool.close().await;
        }
    }
}
