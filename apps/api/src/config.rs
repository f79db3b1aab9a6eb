use anyhow::{Context, Result};

const DEFAULT_MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub rust_log: String,
    /// Lifetime of an issued bearer token.
    pub session_ttl_days: i64,
    /// Request body cap; profile photos travel inline as data URLs.
    pub max_body_bytes: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            session_ttl_days: std::env::var("SESSION_TTL_DAYS")
                .unwrap_or_else(|_| "7".to_string())
                .parse::<i64>()
                .context("SESSION_TTL_DAYS must be a whole number of days")?,
            max_body_bytes: match std::env::var("MAX_BODY_BYTES") {
                Ok(raw) => raw
                    .parse::<usize>()
                    .context("MAX_BODY_BYTES must be a byte count")?,
                Err(_) => DEFAULT_MAX_BODY_BYTES,
            },
        })
    }

    #[cfg(test)]
    pub fn for_tests() -> Self {
        Config {
            database_url: String::new(),
            port: 0,
            rust_log: "debug".to_string(),
            session_ttl_days: 7,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}
