//! Central module for client configuration settings.
//!
//! This module loads the backend base URL, transport timeout, token refresh
//! policy and session persistence location from the environment.

use anyhow::{Context, Result, bail};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:8080/api";

/// How concurrent authorization failures share token refreshes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RefreshStrategy {
    /// Every failing request runs its own refresh.
    #[default]
    Independent,
    /// One refresh at a time; waiters reuse a token issued while they queued.
    Shared,
}

impl FromStr for RefreshStrategy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "independent" => Ok(RefreshStrategy::Independent),
            "shared" => Ok(RefreshStrategy::Shared),
            other => bail!("Unknown refresh strategy '{}'", other),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub api_base_url: String,
    pub request_timeout_seconds: u64,
    pub token_refresh_threshold_seconds: u64,
    pub login_path: String,
    pub refresh_strategy: RefreshStrategy,
    pub session_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            request_timeout_seconds: 10,
            token_refresh_threshold_seconds: 300,
            login_path: "/login".to_string(),
            refresh_strategy: RefreshStrategy::Independent,
            session_file: None,
        }
    }
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();

        let api_base_url = lookup("API_BASE_URL").unwrap_or(defaults.api_base_url);

        let request_timeout_seconds = lookup("REQUEST_TIMEOUT_SECONDS")
            .unwrap_or_else(|| "10".to_string())
            .parse::<u64>()
            .context("REQUEST_TIMEOUT_SECONDS must be a valid number")?;

        let token_refresh_threshold_seconds = lookup("TOKEN_REFRESH_THRESHOLD_SECONDS")
            .unwrap_or_else(|| "300".to_string())
            .parse::<u64>()
            .context("TOKEN_REFRESH_THRESHOLD_SECONDS must be a valid number")?;

        let login_path = lookup("LOGIN_PATH").unwrap_or(defaults.login_path);

        let refresh_strategy = lookup("REFRESH_STRATEGY")
            .map(|value| value.parse::<RefreshStrategy>())
            .transpose()
            .context("REFRESH_STRATEGY must be 'independent' or 'shared'")?
            .unwrap_or_default();

        let session_file = lookup("SESSION_FILE")
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from);

        Ok(Config {
            api_base_url,
            request_timeout_seconds,
            token_refresh_threshold_seconds,
            login_path,
            refresh_strategy,
            session_file,
        })
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }

    pub fn refresh_threshold(&self) -> Duration {
        Duration::from_secs(self.token_refresh_threshold_seconds)
    }
}
