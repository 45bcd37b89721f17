//! Client configuration, read from the environment.

use std::time::Duration;

use thiserror::Error;

pub const DEFAULT_API_URL: &str = "http://localhost:3001";
pub const DEFAULT_FEATURE_ACCESS_PATH: &str = "/feature-access";
pub const DEFAULT_LOGIN_ROUTE: &str = "/login";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} must be a non-negative integer, got '{value}'")]
    InvalidNumber { var: &'static str, value: String },

    #[error("{var} must be at least 1")]
    ZeroNotAllowed { var: &'static str },
}

/// Bounded exponential backoff for feature-access loads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one. Always at least 1.
    pub max_attempts: u32,
    pub initial_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, initial_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            initial_delay,
        }
    }

    /// Single attempt, no waiting.
    pub fn no_retry() -> Self {
        Self::new(1, Duration::ZERO)
    }

    /// Delay before retry number `retry` (1-based): doubles every time.
    pub fn delay_before(&self, retry: u32) -> Duration {
        let factor = 1u32.checked_shl(retry.saturating_sub(1)).unwrap_or(u32::MAX);
        self.initial_delay.saturating_mul(factor)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_millis(500))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_url: String,
    pub feature_access_path: String,
    pub auth_token: Option<String>,
    pub employee_login: bool,
    pub login_route: String,
    pub fetch_timeout: Duration,
    pub retry: RetryPolicy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            feature_access_path: DEFAULT_FEATURE_ACCESS_PATH.to_string(),
            auth_token: None,
            employee_login: false,
            login_route: DEFAULT_LOGIN_ROUTE.to_string(),
            fetch_timeout: Duration::from_secs(15),
            retry: RetryPolicy::default(),
        }
    }
}

impl ClientConfig {
    /// Build from `ORTHODASH_*` environment variables; unset ones keep defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();
        let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());

        if let Some(url) = get("ORTHODASH_API_URL") {
            cfg.api_url = url.trim().to_string();
        }
        if let Some(path) = get("ORTHODASH_FEATURE_ACCESS_PATH") {
            cfg.feature_access_path = path.trim().to_string();
        }
        if let Some(route) = get("ORTHODASH_LOGIN_ROUTE") {
            cfg.login_route = route.trim().to_string();
        }
        cfg.auth_token = get("ORTHODASH_AUTH_TOKEN").map(|t| t.trim().to_string());
        cfg.employee_login = get("ORTHODASH_EMPLOYEE_LOGIN").is_some_and(|v| v.trim() == "true");

        if let Some(raw) = get("ORTHODASH_FETCH_TIMEOUT_SECS") {
            let secs = parse_number("ORTHODASH_FETCH_TIMEOUT_SECS", &raw)?;
            if secs == 0 {
                return Err(ConfigError::ZeroNotAllowed {
                    var: "ORTHODASH_FETCH_TIMEOUT_SECS",
                });
            }
            cfg.fetch_timeout = Duration::from_secs(secs);
        }

        let mut attempts = cfg.retry.max_attempts;
        let mut delay = cfg.retry.initial_delay;
        if let Some(raw) = get("ORTHODASH_RETRY_ATTEMPTS") {
            let n = parse_number("ORTHODASH_RETRY_ATTEMPTS", &raw)?;
            if n == 0 {
                return Err(ConfigError::ZeroNotAllowed {
                    var: "ORTHODASH_RETRY_ATTEMPTS",
                });
            }
            attempts = u32::try_from(n).unwrap_or(u32::MAX);
        }
        if let Some(raw) = get("ORTHODASH_RETRY_DELAY_MS") {
            delay = Duration::from_millis(parse_number("ORTHODASH_RETRY_DELAY_MS", &raw)?);
        }
        cfg.retry = RetryPolicy::new(attempts, delay);

        Ok(cfg)
    }

    /// Absolute URL of the feature-access endpoint.
    pub fn feature_access_url(&self) -> String {
        let base = self.api_url.trim_end_matches('/');
        let path = self.feature_access_path.trim_start_matches('/');
        format!("{base}/{path}")
    }
}

fn parse_number(var: &'static str, raw: &str) -> Result<u64, ConfigError> {
    raw.trim().parse::<u64>().map_err(|_| ConfigError::InvalidNumber {
        var,
        value: raw.to_string(),
    })
}
