use std::env;
use std::time::Duration;

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: String,
    pub db_pool_max: u32,
    pub db_timeout: Duration,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL")?;
        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:3001".to_string());
        let db_pool_max = env::var("DB_POOL_MAX")
            .ok()
            .and_then(|s| s.parse::<u32>().ok())
            .unwrap_or(10);
        // One budget for both connecting and acquiring from the pool; a request
        // that cannot get a connection within it fails instead of queueing.
        let db_timeout_secs = env::var("DB_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(15);

        Ok(Self {
            database_url,
            bind_addr,
            db_pool_max,
            db_timeout: Duration::from_secs(db_timeout_secs),
        })
    }
}
