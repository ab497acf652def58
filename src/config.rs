use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub database_url: String,
    pub cors_origin: String,
    pub db_max_connections: u32,
    pub tx_max_retries: u32,
    pub tx_backoff_ms: u64,
    pub tx_timeout_ms: u64,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        let defaults = Self::default();
        Ok(Self {
            port: env_parse("PORT").unwrap_or(defaults.port),
            database_url: std::env::var("DATABASE_URL").unwrap_or(defaults.database_url),
            cors_origin: std::env::var("CORS_ORIGIN").unwrap_or(defaults.cors_origin),
            db_max_connections: env_parse("DB_MAX_CONNECTIONS")
                .unwrap_or(defaults.db_max_connections),
            tx_max_retries: env_parse("TX_MAX_RETRIES").unwrap_or(defaults.tx_max_retries),
            tx_backoff_ms: env_parse("TX_BACKOFF_MS").unwrap_or(defaults.tx_backoff_ms),
            tx_timeout_ms: env_parse("TX_TIMEOUT_MS").unwrap_or(defaults.tx_timeout_ms),
        })
    }

    pub fn tx_backoff(&self) -> Duration {
        Duration::from_millis(self.tx_backoff_ms)
    }

    pub fn tx_timeout(&self) -> Duration {
        Duration::from_millis(self.tx_timeout_ms)
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 21547,
            database_url: "sqlite:kanban.db".into(),
            cors_origin: "http://localhost:5173,http://127.0.0.1:5173".into(),
            db_max_connections: 5,
            tx_max_retries: 5,
            tx_backoff_ms: 10,
            tx_timeout_ms: 5000,
        }
    }
}
