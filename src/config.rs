//! Client configuration.

use std::time::Duration;

use crate::error::ConfigError;
use crate::sse::DEFAULT_MALFORMED_FRAME_LIMIT;

pub const DEFAULT_API_URL: &str = "http://localhost:5000/api";
pub const DEFAULT_HISTORY_WINDOW: usize = 50;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

pub const ENV_API_URL: &str = "FBOT_API_URL";
pub const ENV_TOKEN: &str = "FBOT_TOKEN";
pub const ENV_USER_NAME: &str = "FBOT_USER_NAME";
pub const ENV_HISTORY_WINDOW: &str = "FBOT_HISTORY_WINDOW";

/// Settings for talking to the chatbot backend.
///
/// Use the builder methods to customize:
///
/// ```ignore
/// use fbot::ClientConfig;
///
/// let config = ClientConfig::default()
///     .with_api_url("https://fbot.example.com/api")
///     .with_access_token("eyJhbGciOi...");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Base URL of the REST API, without a trailing slash
    pub api_url: String,
    /// Bearer token sent with every request
    pub access_token: Option<String>,
    /// Name used in the welcome greeting
    pub user_name: Option<String>,
    /// Messages visible before paging back (default: 50)
    pub history_window: usize,
    /// Consecutive malformed frames tolerated per reply (default: 5)
    pub malformed_frame_limit: usize,
    /// Connect timeout for HTTP requests (default: 30)
    pub request_timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            access_token: None,
            user_name: None,
            history_window: DEFAULT_HISTORY_WINDOW,
            malformed_frame_limit: DEFAULT_MALFORMED_FRAME_LIMIT,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the API base URL. A trailing slash is dropped.
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    pub fn with_user_name(mut self, name: impl Into<String>) -> Self {
        self.user_name = Some(name.into());
        self
    }

    pub fn with_history_window(mut self, window: usize) -> Self {
        self.history_window = window;
        self
    }

    pub fn with_malformed_frame_limit(mut self, limit: usize) -> Self {
        self.malformed_frame_limit = limit;
        self
    }

    pub fn with_request_timeout_secs(mut self, secs: u64) -> Self {
        self.request_timeout_secs = secs;
        self
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Read `FBOT_API_URL`, `FBOT_TOKEN`, `FBOT_USER_NAME` and
    /// `FBOT_HISTORY_WINDOW` on top of the defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`ClientConfig::from_env`] with a custom variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(url) = get(ENV_API_URL) {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(ConfigError::InvalidValue {
                    key: ENV_API_URL.to_string(),
                    value: url,
                    reason: "expected an http:// or https:// URL".to_string(),
                });
            }
            config = config.with_api_url(url);
        }
        if let Some(token) = get(ENV_TOKEN) {
            config = config.with_access_token(token.trim());
        }
        if let Some(name) = get(ENV_USER_NAME) {
            config = config.with_user_name(name.trim());
        }
        if let Some(raw) = get(ENV_HISTORY_WINDOW) {
            let window = parse_positive(ENV_HISTORY_WINDOW, &raw)?;
            config = config.with_history_window(window);
        }

        Ok(config)
    }
}

fn parse_positive(key: &str, raw: &str) -> Result<usize, ConfigError> {
    match raw.trim().parse::<usize>() {
        Ok(0) => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value: raw.to_string(),
            reason: "must be greater than zero".to_string(),
        }),
        Ok(value) => Ok(value),
        Err(e) => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value: raw.to_string(),
            reason: e.to_string(),
        }),
    }
}
