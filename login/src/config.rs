//! Configuration module for the login form.
//!
//! This module handles parsing configuration from environment variables.
//! Every variable is optional.
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `LOGIN_AUTH_URL` | - | Base URL of the login endpoint (enables the HTTP authenticator) |
//! | `LOGIN_AUTH_LATENCY_MS` | 2000 | Latency of the simulated authenticator |
//! | `LOGIN_AUTH_TIMEOUT_SECS` | 30 | HTTP request timeout (must be > 0) |
//! | `LOGIN_DEBOUNCE_MS` | 300 | Debounce interval for live email validation |
//! | `LOGIN_SUCCESS_NOTICE_MS` | 2000 | How long a success notice stays visible |
//! | `LOGIN_ERROR_NOTICE_MS` | 3000 | How long an error notice stays visible |
//!
//! # Example
//!
//! ```no_run
//! use login_form::config::Config;
//!
//! let config = Config::from_env().expect("Failed to load configuration");
//! println!("Debounce: {:?}", config.debounce);
//! ```

use std::env;
use std::time::Duration;

use thiserror::Error;

use crate::auth::{DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_SIMULATED_LATENCY_MS};

/// Default debounce interval for live email validation.
pub const DEFAULT_DEBOUNCE_MS: u64 = 300;

/// Default lifetime of a success notice.
pub const DEFAULT_SUCCESS_NOTICE_MS: u64 = 2000;

/// Default lifetime of an error notice.
pub const DEFAULT_ERROR_NOTICE_MS: u64 = 3000;

/// Live validation only starts once the email is longer than this.
pub const DEFAULT_LIVE_MIN_LENGTH: usize = 3;

/// Errors that can occur during configuration parsing.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Environment variable has an invalid value.
    #[error("invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Where submissions are authenticated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthBackend {
    /// Local stand-in with a fixed latency.
    Simulated { latency: Duration },
    /// Remote login endpoint.
    Http { base_url: String, timeout: Duration },
}

/// Configuration for the login form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Authenticator selection.
    pub auth: AuthBackend,

    /// Debounce interval for live email validation.
    pub debounce: Duration,

    /// Live validation is skipped for emails of this length or shorter.
    pub live_min_length: usize,

    /// How long a success notice stays visible.
    pub success_notice: Duration,

    /// How long an error notice stays visible.
    pub error_notice: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            auth: AuthBackend::Simulated {
                latency: Duration::from_millis(DEFAULT_SIMULATED_LATENCY_MS),
            },
            debounce: Duration::from_millis(DEFAULT_DEBOUNCE_MS),
            live_min_length: DEFAULT_LIVE_MIN_LENGTH,
            success_notice: Duration::from_millis(DEFAULT_SUCCESS_NOTICE_MS),
            error_notice: Duration::from_millis(DEFAULT_ERROR_NOTICE_MS),
        }
    }
}

impl Config {
    /// Creates a new `Config` by parsing environment variables.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if any numeric variable is set but cannot be
    /// parsed, or if `LOGIN_AUTH_TIMEOUT_SECS` is zero.
    pub fn from_env() -> Result<Self, ConfigError> {
        let auth = match env::var("LOGIN_AUTH_URL") {
            Ok(base_url) if !base_url.trim().is_empty() => {
                let timeout_secs =
                    parse_u64("LOGIN_AUTH_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS)?;
                if timeout_secs == 0 {
                    return Err(ConfigError::InvalidValue {
                        key: "LOGIN_AUTH_TIMEOUT_SECS".to_string(),
                        message: "timeout must be at least 1 second".to_string(),
                    });
                }
                AuthBackend::Http {
                    base_url: base_url.trim().to_string(),
                    timeout: Duration::from_secs(timeout_secs),
                }
            }
            _ => AuthBackend::Simulated {
                latency: Duration::from_millis(parse_u64(
                    "LOGIN_AUTH_LATENCY_MS",
                    DEFAULT_SIMULATED_LATENCY_MS,
                )?),
            },
        };

        let debounce = Duration::from_millis(parse_u64("LOGIN_DEBOUNCE_MS", DEFAULT_DEBOUNCE_MS)?);
        let success_notice = Duration::from_millis(parse_u64(
            "LOGIN_SUCCESS_NOTICE_MS",
            DEFAULT_SUCCESS_NOTICE_MS,
        )?);
        let error_notice =
            Duration::from_millis(parse_u64("LOGIN_ERROR_NOTICE_MS", DEFAULT_ERROR_NOTICE_MS)?);

        Ok(Self {
            auth,
            debounce,
            live_min_length: DEFAULT_LIVE_MIN_LENGTH,
            success_notice,
            error_notice,
        })
    }
}

/// Reads `key` as a non-negative integer, falling back to `default` when unset.
fn parse_u64(key: &str, default: u64) -> Result<u64, ConfigError> {
    match env::var(key) {
        Ok(val) => val
            .trim()
            .parse::<u64>()
            .map_err(|_| ConfigError::InvalidValue {
                key: key.to_string(),
                message: format!("expected non-negative integer, got '{val}'"),
            }),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    /// Helper to run tests with isolated environment variables.
    /// Clears all LOGIN_* vars before the test and restores them after.
    fn with_clean_env<F, R>(f: F) -> R
    where
        F: FnOnce() -> R,
    {
        let saved_vars: Vec<(String, String)> = env::vars()
            .filter(|(k, _)| k.starts_with("LOGIN_"))
            .collect();

        for (key, _) in &saved_vars {
            env::remove_var(key);
        }

        let result = f();

        let leftover: Vec<String> = env::vars()
            .map(|(k, _)| k)
            .filter(|k| k.starts_with("LOGIN_"))
            .collect();
        for key in leftover {
            env::remove_var(key);
        }
        for (key, value) in saved_vars {
            env::set_var(key, value);
        }

        result
    }

    #[test]
    #[serial]
    fn test_defaults_when_unset() {
        with_clean_env(|| {
            let config = Config::from_env().expect("should parse empty env");
            assert_eq!(config, Config::default());
            assert_eq!(
                config.auth,
                AuthBackend::Simulated {
                    latency: Duration::from_millis(2000)
                }
            );
            assert_eq!(config.debounce, Duration::from_millis(300));
            assert_eq!(config.success_notice, Duration::from_millis(2000));
            assert_eq!(config.error_notice, Duration::from_millis(3000));
            assert_eq!(config.live_min_length, 3);
        });
    }

    #[test]
    #[serial]
    fn test_http_backend() {
        with_clean_env(|| {
            env::set_var("LOGIN_AUTH_URL", " https://auth.example.com ");
            env::set_var("LOGIN_AUTH_TIMEOUT_SECS", "5");

            let config = Config::from_env().expect("should parse http config");
            assert_eq!(
                config.auth,
                AuthBackend::Http {
                    base_url: "https://auth.example.com".to_string(),
                    timeout: Duration::from_secs(5),
                }
            );
        });
    }

    #[test]
    #[serial]
    fn test_blank_auth_url_means_simulated() {
        with_clean_env(|| {
            env::set_var("LOGIN_AUTH_URL", "   ");
            env::set_var("LOGIN_AUTH_LATENCY_MS", "10");

            let config = Config::from_env().expect("should parse");
            assert_eq!(
                config.auth,
                AuthBackend::Simulated {
                    latency: Duration::from_millis(10)
                }
            );
        });
    }

    #[test]
    #[serial]
    fn test_custom_timings() {
        with_clean_env(|| {
            env::set_var("LOGIN_DEBOUNCE_MS", "150");
            env::set_var("LOGIN_SUCCESS_NOTICE_MS", "500");
            env::set_var("LOGIN_ERROR_NOTICE_MS", "750");

            let config = Config::from_env().expect("should parse timings");
            assert_eq!(config.debounce, Duration::from_millis(150));
            assert_eq!(config.success_notice, Duration::from_millis(500));
            assert_eq!(config.error_notice, Duration::from_millis(750));
        });
    }

    #[test]
    #[serial]
    fn test_invalid_debounce() {
        with_clean_env(|| {
            env::set_var("LOGIN_DEBOUNCE_MS", "soon");

            let err = Config::from_env().unwrap_err();
            assert!(matches!(
                err,
                ConfigError::InvalidValue { ref key, ref message }
                    if key == "LOGIN_DEBOUNCE_MS" && message.contains("'soon'")
            ));
        });
    }

    #[test]
    #[serial]
    fn test_negative_latency_rejected() {
        with_clean_env(|| {
            env::set_var("LOGIN_AUTH_LATENCY_MS", "-1");

            let err = Config::from_env().unwrap_err();
            assert!(matches!(
                err,
                ConfigError::InvalidValue { ref key, .. } if key == "LOGIN_AUTH_LATENCY_MS"
            ));
        });
    }

    #[test]
    #[serial]
    fn test_zero_timeout_rejected() {
        with_clean_env(|| {
            env::set_var("LOGIN_AUTH_URL", "https://auth.example.com");
            env::set_var("LOGIN_AUTH_TIMEOUT_SECS", "0");

            let err = Config::from_env().unwrap_err();
            assert!(matches!(
                err,
                ConfigError::InvalidValue { ref key, ref message }
                    if key == "LOGIN_AUTH_TIMEOUT_SECS" && message.contains("at least 1")
            ));
        });
    }

    #[test]
    fn config_error_display() {
        let err = ConfigError::InvalidValue {
            key: "LOGIN_DEBOUNCE_MS".to_string(),
            message: "expected non-negative integer, got 'x'".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "invalid value for LOGIN_DEBOUNCE_MS: expected non-negative integer, got 'x'"
        );
    }
}
