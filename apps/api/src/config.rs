use std::time::Duration;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Postgres connection string. Without one, resumes live in memory.
    pub database_url: Option<String>,
    pub port: u16,
    pub rust_log: String,
    pub autosave_debounce: Duration,
    /// Open sessions untouched for this long are flushed and closed.
    pub session_idle: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: optional_env("DATABASE_URL"),
            port: parse_env("PORT", 8080).context("PORT must be a valid port number")?,
            rust_log: optional_env("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            autosave_debounce: Duration::from_millis(
                parse_env("AUTOSAVE_DEBOUNCE_MS", 1500)
                    .context("AUTOSAVE_DEBOUNCE_MS must be a number of milliseconds")?,
            ),
            session_idle: Duration::from_secs(
                parse_env("SESSION_IDLE_SECS", 900)
                    .context("SESSION_IDLE_SECS must be a number of seconds")?,
            ),
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            database_url: None,
            port: 8080,
            rust_log: "info".to_string(),
            autosave_debounce: Duration::from_millis(1500),
            session_idle: Duration::from_secs(900),
        }
    }
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_env(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Invalid value '{raw}' for '{key}'")),
        None => Ok(default),
    }
}
