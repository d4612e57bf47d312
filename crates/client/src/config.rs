//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `COPPERPOT_API_BASE_URL` - Root URL of the catalog/order service
//!
//! ## Optional
//! - `COPPERPOT_STORAGE_PATH` - Durable client storage document
//!   (default: `.copperpot/state.json`)
//! - `COPPERPOT_HTTP_TIMEOUT_SECS` - Request timeout (default: 30)

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

const DEFAULT_STORAGE_PATH: &str = ".copperpot/state.json";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Client application configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Root URL of the remote service; always ends with a slash.
    pub api_base_url: Url,
    /// Path of the durable client storage document.
    pub storage_path: PathBuf,
    /// HTTP request timeout.
    pub http_timeout: Duration,
}

impl ClientConfig {
    /// Load configuration from the environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a required variable is missing or a
    /// value does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        let base_url = get_required_env("COPPERPOT_API_BASE_URL")?;
        let api_base_url = parse_base_url("COPPERPOT_API_BASE_URL", &base_url)?;

        let storage_path = env::var("COPPERPOT_STORAGE_PATH")
            .map_or_else(|_| PathBuf::from(DEFAULT_STORAGE_PATH), PathBuf::from);

        let http_timeout = match env::var("COPPERPOT_HTTP_TIMEOUT_SECS") {
            Ok(raw) => parse_timeout("COPPERPOT_HTTP_TIMEOUT_SECS", &raw)?,
            Err(_) => Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        };

        Ok(Self {
            api_base_url,
            storage_path,
            http_timeout,
        })
    }
}

fn get_required_env(key: &str) -> Result<String, ConfigError> {
    env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_owned()))
}

/// Parse and normalize a base URL so joining `api/v1/...` onto it works.
fn parse_base_url(key: &str, raw: &str) -> Result<Url, ConfigError> {
    let mut url =
        Url::parse(raw).map_err(|e| ConfigError::InvalidEnvVar(key.to_owned(), e.to_string()))?;
    if url.cannot_be_a_base() {
        return Err(ConfigError::InvalidEnvVar(
            key.to_owned(),
            "URL cannot be a base".to_owned(),
        ));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

fn parse_timeout(key: &str, raw: &str) -> Result<Duration, ConfigError> {
    let secs: u64 = raw
        .parse()
        .map_err(|_| ConfigError::InvalidEnvVar(key.to_owned(), format!("not a number: {raw}")))?;
    if secs == 0 {
        return Err(ConfigError::InvalidEnvVar(
            key.to_owned(),
            "timeout must be positive".to_owned(),
        ));
    }
    Ok(Duration::from_secs(secs))
}
