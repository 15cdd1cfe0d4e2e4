use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub env: Environment,
    pub log_level: String,
    pub platforms_path: PathBuf,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    /// Explicit browser executable; `None` lets the driver locate one.
    pub chrome_path: Option<PathBuf>,
    pub user_agent: String,
    /// Hard ceiling for one platform's extraction.
    pub session_timeout_secs: u64,
    pub node_timeout_secs: u64,
    pub price_wait_ms: u64,
    pub consent_attempt_ms: u64,
    pub settle_delay_ms: u64,
    /// Bound on the result-container wait; always shorter than the session.
    pub container_wait_secs: u64,
    /// Fraction of query words a title must contain, in `(0, 1]`.
    pub relevance_threshold: f64,
    /// `1` visits platforms strictly one at a time.
    pub max_concurrent_platforms: usize,
    pub suggest_limit: usize,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field("platforms_path", &self.platforms_path)
            .field("database_url", &"[redacted]")
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field("chrome_path", &self.chrome_path)
            .field("user_agent", &self.user_agent)
            .field("session_timeout_secs", &self.session_timeout_secs)
            .field("node_timeout_secs", &self.node_timeout_secs)
            .field("price_wait_ms", &self.price_wait_ms)
            .field("consent_attempt_ms", &self.consent_attempt_ms)
            .field("settle_delay_ms", &self.settle_delay_ms)
            .field("container_wait_secs", &self.container_wait_secs)
            .field("relevance_threshold", &self.relevance_threshold)
            .field("max_concurrent_platforms", &self.max_concurrent_platforms)
            .field("suggest_limit", &self.suggest_limit)
            .finish()
    }
}
