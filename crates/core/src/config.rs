//! Vendor configuration and credential loading.

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use crate::error::CoreError;

/// Default vendor API base URL.
pub const DEFAULT_API_BASE_URL: &str = "https://api.worldlabs.ai";
/// Default host serving the public world viewer.
pub const DEFAULT_VIEWER_BASE_URL: &str = "https://marble.worldlabs.ai";
/// Default delay between two status queries.
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;
/// Default upper bound on how long a job is polled.
pub const DEFAULT_POLL_TIMEOUT_SECS: u64 = 300;
/// Default timeout for a single vendor HTTP request.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;

/// Primary API key variable.
pub const API_KEY_VAR: &str = "WLT_API_KEY";
/// Accepted alternative name for the API key variable.
pub const API_KEY_FALLBACK_VAR: &str = "WORLDLABS_API_KEY";

/// Vendor connection settings.
///
/// Constructed once per process and shared read-only between workflow
/// runs.
#[derive(Clone)]
pub struct VendorConfig {
    /// API base URL, without a trailing slash.
    pub api_base_url: String,
    /// Secret API key sent with every request.
    pub api_key: String,
    /// Base URL of the public viewer, without a trailing slash.
    pub viewer_base_url: String,
    pub poll_interval: Duration,
    pub poll_timeout: Duration,
    pub request_timeout: Duration,
}

impl VendorConfig {
    /// Config with defaults for everything but the key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            api_key: api_key.into(),
            viewer_base_url: DEFAULT_VIEWER_BASE_URL.to_string(),
            poll_interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
            poll_timeout: Duration::from_secs(DEFAULT_POLL_TIMEOUT_SECS),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }

    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = trim_trailing_slash(url.into());
        self
    }

    pub fn with_viewer_base_url(mut self, url: impl Into<String>) -> Self {
        self.viewer_base_url = trim_trailing_slash(url.into());
        self
    }

    /// Load configuration from the process environment.
    ///
    /// | Env Var                       | Default                        |
    /// |-------------------------------|--------------------------------|
    /// | `WLT_API_KEY`                 | required (`WORLDLABS_API_KEY`) |
    /// | `MARBLE_API_BASE_URL`         | `https://api.worldlabs.ai`     |
    /// | `MARBLE_VIEWER_BASE_URL`      | `https://marble.worldlabs.ai`  |
    /// | `MARBLE_POLL_INTERVAL_SECS`   | `5`                            |
    /// | `MARBLE_POLL_TIMEOUT_SECS`    | `300`                          |
    /// | `MARBLE_REQUEST_TIMEOUT_SECS` | `120`                          |
    pub fn from_env() -> Result<Self, CoreError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read the configuration from a dotenv-style credentials file.
    ///
    /// Variables already set in the environment take precedence over
    /// the file. The process environment is left untouched.
    pub fn from_credentials_file(path: &Path) -> Result<Self, CoreError> {
        let file = read_credentials_file(path)?;
        Self::from_lookup(|key| std::env::var(key).ok().or_else(|| file.get(key).cloned()))
    }

    /// Build the configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, CoreError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup(API_KEY_VAR)
            .or_else(|| lookup(API_KEY_FALLBACK_VAR))
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
            .ok_or_else(|| {
                CoreError::MissingCredentials(format!(
                    "{API_KEY_VAR} is not set (checked {API_KEY_VAR} and {API_KEY_FALLBACK_VAR})"
                ))
            })?;

        let mut config = Self::new(api_key);
        if let Some(url) = lookup("MARBLE_API_BASE_URL") {
            config = config.with_api_base_url(url);
        }
        if let Some(url) = lookup("MARBLE_VIEWER_BASE_URL") {
            config = config.with_viewer_base_url(url);
        }
        config.poll_interval = secs_var(&lookup, "MARBLE_POLL_INTERVAL_SECS", DEFAULT_POLL_INTERVAL_SECS)?;
        config.poll_timeout = secs_var(&lookup, "MARBLE_POLL_TIMEOUT_SECS", DEFAULT_POLL_TIMEOUT_SECS)?;
        config.request_timeout =
            secs_var(&lookup, "MARBLE_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS)?;

        if config.poll_interval.is_zero() {
            return Err(CoreError::Config(
                "MARBLE_POLL_INTERVAL_SECS must be greater than zero".to_string(),
            ));
        }
        Ok(config)
    }
}

// The key never reaches logs.
impl std::fmt::Debug for VendorConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VendorConfig")
            .field("api_base_url", &self.api_base_url)
            .field("api_key", &"<redacted>")
            .field("viewer_base_url", &self.viewer_base_url)
            .field("poll_interval", &self.poll_interval)
            .field("poll_timeout", &self.poll_timeout)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

fn read_credentials_file(path: &Path) -> Result<HashMap<String, String>, CoreError> {
    let unreadable = |e: dotenvy::Error| {
        CoreError::MissingCredentials(format!(
            "Failed to read credentials file {}: {e}",
            path.display()
        ))
    };
    dotenvy::from_path_iter(path)
        .map_err(unreadable)?
        .map(|item| item.map_err(unreadable))
        .collect()
}

fn secs_var<F>(lookup: &F, key: &str, default: u64) -> Result<Duration, CoreError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(Duration::from_secs(default)),
        Some(raw) => raw
            .trim()
            .parse::<u64>()
            .map(Duration::from_secs)
            .map_err(|_| CoreError::Config(format!("{key} must be a whole number of seconds"))),
    }
}

fn trim_trailing_slash(mut url: String) -> String {
    while url.ends_with('/') {
        url.pop();
    }
    url
}
