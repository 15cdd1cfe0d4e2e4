use std::path::PathBuf;
use std::time::Duration;

use pricematch_core::config::DEFAULT_USER_AGENT;
use pricematch_core::AppConfig;

use crate::relevance::DEFAULT_THRESHOLD;

/// Default time granted past the session timeout for browser shutdown.
pub const CLOSE_GRACE: Duration = Duration::from_secs(5);

/// Bounds applied while scraping one platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrapeTimeouts {
    /// Hard ceiling for one platform's whole extraction.
    pub session: Duration,
    /// Ceiling for extracting one result card.
    pub node: Duration,
    /// Visibility wait per candidate price selector.
    pub price_wait: Duration,
    /// Ceiling per consent-dismissal attempt.
    pub consent_attempt: Duration,
    /// Wait for the result container to become visible.
    pub container: Duration,
    /// Pause after navigation, after consent and after node collection.
    pub settle: Duration,
    /// Extra time past `session` for the browser to shut down.
    pub close_grace: Duration,
}

impl Default for ScrapeTimeouts {
    fn default() -> Self {
        Self {
            session: Duration::from_secs(45),
            node: Duration::from_secs(10),
            price_wait: Duration::from_millis(3000),
            consent_attempt: Duration::from_millis(2000),
            container: Duration::from_secs(15),
            settle: Duration::from_millis(2000),
            close_grace: CLOSE_GRACE,
        }
    }
}

/// Runtime knobs for the scraper side of a search.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionSettings {
    pub timeouts: ScrapeTimeouts,
    pub user_agent: String,
    pub chrome_path: Option<PathBuf>,
    pub relevance_threshold: f64,
    pub max_concurrent_platforms: usize,
    pub suggest_limit: usize,
}

impl Default for ExtractionSettings {
    fn default() -> Self {
        Self {
            timeouts: ScrapeTimeouts::default(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            chrome_path: None,
            relevance_threshold: DEFAULT_THRESHOLD,
            max_concurrent_platforms: 1,
            suggest_limit: 10,
        }
    }
}

impl ExtractionSettings {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            timeouts: ScrapeTimeouts {
                session: Duration::from_secs(config.session_timeout_secs),
                node: Duration::from_secs(config.node_timeout_secs),
                price_wait: Duration::from_millis(config.price_wait_ms),
                consent_attempt: Duration::from_millis(config.consent_attempt_ms),
                container: Duration::from_secs(config.container_wait_secs),
                settle: Duration::from_millis(config.settle_delay_ms),
                close_grace: CLOSE_GRACE,
            },
            user_agent: config.user_agent.clone(),
            chrome_path: config.chrome_path.clone(),
            relevance_threshold: config.relevance_threshold,
            max_concurrent_platforms: config.max_concurrent_platforms.max(1),
            suggest_limit: config.suggest_limit,
        }
    }

    /// Outer bound for one platform call: the session timeout plus time to
    /// close the browser.
    #[must_use]
    pub fn platform_deadline(&self) -> Duration {
        self.timeouts.session + self.timeouts.close_grace
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pricematch_core::Environment;

    fn app_config() -> AppConfig {
        AppConfig {
            database_url: "postgres://localhost/pricematch".to_string(),
            env: Environment::Test,
            log_level: "debug".to_string(),
            platforms_path: PathBuf::from("config/platforms.yaml"),
            db_max_connections: 4,
            db_min_connections: 1,
            db_acquire_timeout_secs: 5,
            chrome_path: Some(PathBuf::from("/usr/bin/chromium")),
            user_agent: "TestAgent/1.0".to_string(),
            session_timeout_secs: 30,
            node_timeout_secs: 7,
            price_wait_ms: 1500,
            consent_attempt_ms: 500,
            settle_delay_ms: 250,
            container_wait_secs: 12,
            relevance_threshold: 0.6,
            max_concurrent_platforms: 0,
            suggest_limit: 5,
        }
    }

    #[test]
    fn settings_mirror_app_config() {
        let settings = ExtractionSettings::from_app_config(&app_config());
        assert_eq!(settings.timeouts.session, Duration::from_secs(30));
        assert_eq!(settings.timeouts.node, Duration::from_secs(7));
        assert_eq!(settings.timeouts.price_wait, Duration::from_millis(1500));
        assert_eq!(settings.timeouts.consent_attempt, Duration::from_millis(500));
        assert_eq!(settings.timeouts.settle, Duration::from_millis(250));
        assert_eq!(settings.timeouts.container, Duration::from_secs(12));
        assert_eq!(settings.user_agent, "TestAgent/1.0");
        assert_eq!(settings.chrome_path, Some(PathBuf::from("/usr/bin/chromium")));
        assert_eq!(settings.suggest_limit, 5);
    }

    #[test]
    fn zero_concurrency_is_treated_as_sequential() {
        let settings = ExtractionSettings::from_app_config(&app_config());
        assert_eq!(settings.max_concurrent_platforms, 1);
    }

    #[test]
    fn platform_deadline_adds_close_grace() {
        let settings = ExtractionSettings::default();
        assert_eq!(settings.platform_deadline(), Duration::from_secs(50));
    }
}
