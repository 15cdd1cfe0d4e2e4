use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Desktop Chrome identity presented to retailer sites.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so it can be tested with a `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        or_default(var, default)
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let database_url = require("DATABASE_URL")?;

    let env = parse_environment(&or_default("PRICEMATCH_ENV", "development"));
    let log_level = or_default("PRICEMATCH_LOG_LEVEL", "info");
    let platforms_path = PathBuf::from(or_default(
        "PRICEMATCH_PLATFORMS_PATH",
        "./config/platforms.yaml",
    ));

    let db_max_connections = parse_u32("PRICEMATCH_DB_MAX_CONNECTIONS", "10")?;
    let db_min_connections = parse_u32("PRICEMATCH_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_u64("PRICEMATCH_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    let chrome_path = lookup("PRICEMATCH_CHROME_PATH")
        .ok()
        .filter(|p| !p.trim().is_empty())
        .map(PathBuf::from);
    let user_agent = or_default("PRICEMATCH_USER_AGENT", DEFAULT_USER_AGENT);

    let session_timeout_secs = parse_u64("PRICEMATCH_SESSION_TIMEOUT_SECS", "45")?;
    if session_timeout_secs == 0 {
        return Err(invalid(
            "PRICEMATCH_SESSION_TIMEOUT_SECS",
            "must be greater than zero".to_string(),
        ));
    }
    let node_timeout_secs = parse_u64("PRICEMATCH_NODE_TIMEOUT_SECS", "10")?;
    let price_wait_ms = parse_u64("PRICEMATCH_PRICE_WAIT_MS", "3000")?;
    let consent_attempt_ms = parse_u64("PRICEMATCH_CONSENT_ATTEMPT_MS", "2000")?;
    let settle_delay_ms = parse_u64("PRICEMATCH_SETTLE_DELAY_MS", "2000")?;
    let container_wait_secs = parse_u64("PRICEMATCH_CONTAINER_WAIT_SECS", "15")?;
    if container_wait_secs == 0 || container_wait_secs >= session_timeout_secs {
        return Err(invalid(
            "PRICEMATCH_CONTAINER_WAIT_SECS",
            format!("must be between 1 and {} (the session timeout)", session_timeout_secs - 1),
        ));
    }

    let relevance_threshold = parse_threshold(&or_default("PRICEMATCH_RELEVANCE_THRESHOLD", "0.8"))
        .map_err(|reason| invalid("PRICEMATCH_RELEVANCE_THRESHOLD", reason))?;

    let max_concurrent_platforms = parse_usize("PRICEMATCH_MAX_CONCURRENT_PLATFORMS", "1")?;
    let suggest_limit = parse_usize("PRICEMATCH_SUGGEST_LIMIT", "10")?;

    Ok(AppConfig {
        database_url,
        env,
        log_level,
        platforms_path,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        chrome_path,
        user_agent,
        session_timeout_secs,
        node_timeout_secs,
        price_wait_ms,
        consent_attempt_ms,
        settle_delay_ms,
        container_wait_secs,
        relevance_threshold,
        max_concurrent_platforms,
        suggest_limit,
    })
}

/// Parse a string into an `Environment` variant.
///
/// Unrecognized values default to `Environment::Development`.
fn parse_environment(s: &str) -> Environment {
    match s {
        "production" => Environment::Production,
        "test" => Environment::Test,
        _ => Environment::Development,
    }
}

fn parse_threshold(raw: &str) -> Result<f64, String> {
    let value = raw.trim().parse::<f64>().map_err(|e| e.to_string())?;
    if value.is_finite() && value > 0.0 && value <= 1.0 {
        Ok(value)
    } else {
        Err(format!("{value} is outside (0, 1]"))
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
