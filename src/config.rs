//! Configuration management module
//!
//! Settings come from `AFIP_*` environment variables, optionally seeded from a
//! `.env` file. Any missing or malformed value is fatal and is reported before
//! the first network call.

use crate::error::{CheckerError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub const ENV_USERNAME: &str = "AFIP_USERNAME";
pub const ENV_PASSWORD: &str = "AFIP_PASSWORD";
pub const ENV_BASE_URL: &str = "AFIP_BASE_URL";
pub const ENV_CHUNK_SIZE: &str = "AFIP_CHUNK_SIZE";
pub const ENV_MAX_CALLS: &str = "AFIP_MAX_CALLS";
pub const ENV_PAUSE_DURATION: &str = "AFIP_PAUSE_DURATION";
pub const ENV_MAX_RETRIES: &str = "AFIP_MAX_RETRIES";
pub const ENV_RETRY_DELAY: &str = "AFIP_RETRY_DELAY";
pub const ENV_SERVICES: &str = "AFIP_SERVICES_AVAILABLE";
pub const ENV_REQUEST_TIMEOUT: &str = "AFIP_REQUEST_TIMEOUT";
pub const ENV_INPUT_PATH: &str = "EXCEL_FILE_PATH";

/// Authentication configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    pub username: String,
    pub password: String,
}

impl AuthConfig {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.username.is_empty() {
            return Err(CheckerError::Validation(
                "Username cannot be empty".to_string(),
            ));
        }
        if self.password.is_empty() {
            return Err(CheckerError::Validation(
                "Password cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub auth: AuthConfig,
    pub base_url: String,
    pub chunk_size: usize,
    /// Batch index at which the one-time pause happens
    pub max_calls: usize,
    /// Seconds
    pub pause_duration: u64,
    pub max_retries: u32,
    /// Base backoff in seconds
    pub retry_delay: u64,
    /// Empty means the client's defaults
    pub services: Vec<String>,
    pub request_timeout: Option<u64>,
    pub input_path: Option<PathBuf>,
}

impl AppConfig {
    /// Load `path`, or `./.env` when no path is given.
    ///
    /// A missing default `.env` is fine; a missing explicit file is not.
    pub fn load_env_file(path: Option<&Path>) -> Result<()> {
        match path {
            Some(path) => {
                dotenvy::from_path(path)?;
            }
            None => {
                if let Err(e) = dotenvy::dotenv() {
                    if !e.not_found() {
                        return Err(e.into());
                    }
                }
            }
        }
        Ok(())
    }

    /// Create config from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create config from any key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let services = lookup(ENV_SERVICES)
            .map(|raw| parse_services(&raw))
            .unwrap_or_default();

        let request_timeout = match lookup(ENV_REQUEST_TIMEOUT) {
            Some(raw) if !raw.trim().is_empty() => Some(parse_value(ENV_REQUEST_TIMEOUT, &raw)?),
            _ => None,
        };

        let config = Self {
            auth: AuthConfig::new(
                credential(&lookup, ENV_USERNAME)?,
                credential(&lookup, ENV_PASSWORD)?,
            ),
            base_url: required(&lookup, ENV_BASE_URL)?,
            chunk_size: parse_required(&lookup, ENV_CHUNK_SIZE)?,
            max_calls: parse_required(&lookup, ENV_MAX_CALLS)?,
            pause_duration: parse_required(&lookup, ENV_PAUSE_DURATION)?,
            max_retries: parse_required(&lookup, ENV_MAX_RETRIES)?,
            retry_delay: parse_required(&lookup, ENV_RETRY_DELAY)?,
            services,
            request_timeout,
            input_path: lookup(ENV_INPUT_PATH)
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.auth.validate()?;

        let url = url::Url::parse(&self.base_url)?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(CheckerError::Config(format!(
                "Invalid base URL: {}. Must start with http:// or https://",
                self.base_url
            )));
        }
        if self.chunk_size == 0 {
            return Err(CheckerError::Config(format!(
                "{} must be greater than 0",
                ENV_CHUNK_SIZE
            )));
        }
        if self.max_retries == 0 {
            return Err(CheckerError::Config(format!(
                "{} must be greater than 0",
                ENV_MAX_RETRIES
            )));
        }
        if self.request_timeout == Some(0) {
            return Err(CheckerError::Config(format!(
                "{} must be greater than 0",
                ENV_REQUEST_TIMEOUT
            )));
        }
        Ok(())
    }
}

/// Split a comma-separated service list, dropping blank entries
pub fn parse_services(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

fn required<F>(lookup: &F, key: &str) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| CheckerError::Config(format!("{} is not set", key)))
}

/// Credentials are passed through exactly as given
fn credential<F>(lookup: &F, key: &str) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| CheckerError::Config(format!("{} is not set", key)))
}

fn parse_required<F, T>(lookup: &F, key: &str) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    parse_value(key, &required(lookup, key)?)
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|e| CheckerError::Config(format!("{} has invalid value '{}': {}", key, raw, e)))
}
