//! Authenticator collaborator for the login form.
//!
//! The controller only knows the [`Authenticator`] trait: it calls
//! `authenticate` exactly once per accepted submission and awaits the result.
//! Cancellation is done by dropping the returned future, so implementations
//! must not rely on running to completion.
//!
//! Two implementations ship with the crate:
//!
//! - [`SimulatedAuthenticator`]: waits for a fixed latency and accepts a single
//!   credential pair. Used by the CLI when no server is configured.
//! - [`HttpAuthenticator`]: posts the credentials as JSON to `{base_url}/login`.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use login_form::auth::{AuthResult, Authenticator, SimulatedAuthenticator};
//!
//! #[tokio::main]
//! async fn main() {
//!     let auth = SimulatedAuthenticator::new(Duration::from_millis(10));
//!     let result = auth.authenticate("admin@example.com", "123456").await.unwrap();
//!     assert_eq!(result, AuthResult::Authenticated);
//! }
//! ```

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderValue, CONTENT_TYPE};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Default latency of the simulated authenticator.
pub const DEFAULT_SIMULATED_LATENCY_MS: u64 = 2000;

/// Email accepted by the simulated authenticator by default.
pub const DEMO_EMAIL: &str = "admin@example.com";

/// Password accepted by the simulated authenticator by default.
pub const DEMO_PASSWORD: &str = "123456";

/// Reason given when credentials are rejected without a server message.
pub const DEFAULT_REJECT_REASON: &str = "login failed, please check your email and password";

/// Default HTTP request timeout.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Outcome of a completed authentication call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthResult {
    /// Credentials accepted.
    Authenticated,
    /// Credentials refused.
    Rejected { reason: String },
}

impl AuthResult {
    /// Shorthand for a rejection with the given reason.
    #[must_use]
    pub fn rejected(reason: impl Into<String>) -> Self {
        Self::Rejected {
            reason: reason.into(),
        }
    }
}

/// Errors that keep an authenticator from producing an [`AuthResult`].
#[derive(Error, Debug)]
pub enum AuthError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with an unexpected status.
    #[error("server error: {status} - {message}")]
    ServerError { status: u16, message: String },

    /// Any other failure, described by the implementation.
    #[error("{0}")]
    Other(String),
}

/// Performs the actual credential check.
///
/// The controller does not care whether this is a network call, a local mock
/// or a stub. It only relies on asynchronous resolution and on the future
/// being safe to drop before completion.
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Checks `email` and `password`.
    ///
    /// # Errors
    ///
    /// Returns `AuthError` when no verdict could be reached (transport
    /// failure, unexpected server response). A verdict of "wrong credentials"
    /// is `Ok(AuthResult::Rejected { .. })`, not an error.
    async fn authenticate(&self, email: &str, password: &str) -> Result<AuthResult, AuthError>;
}

/// Stand-in authenticator that accepts a single credential pair after a delay.
#[derive(Debug, Clone)]
pub struct SimulatedAuthenticator {
    latency: Duration,
    email: String,
    password: String,
}

impl SimulatedAuthenticator {
    /// Creates a simulated authenticator accepting the demo credentials.
    #[must_use]
    pub fn new(latency: Duration) -> Self {
        Self::with_credentials(latency, DEMO_EMAIL, DEMO_PASSWORD)
    }

    /// Creates a simulated authenticator accepting the given credentials.
    #[must_use]
    pub fn with_credentials(
        latency: Duration,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            latency,
            email: email.into(),
            password: password.into(),
        }
    }

    /// Configured latency.
    #[must_use]
    pub fn latency(&self) -> Duration {
        self.latency
    }
}

impl Default for SimulatedAuthenticator {
    fn default() -> Self {
        Self::new(Duration::from_millis(DEFAULT_SIMULATED_LATENCY_MS))
    }
}

#[async_trait]
impl Authenticator for SimulatedAuthenticator {
    async fn authenticate(&self, email: &str, password: &str) -> Result<AuthResult, AuthError> {
        debug!(latency_ms = self.latency.as_millis(), "Simulating authentication");
        tokio::time::sleep(self.latency).await;

        if email == self.email && password == self.password {
            Ok(AuthResult::Authenticated)
        } else {
            Ok(AuthResult::rejected(DEFAULT_REJECT_REASON))
        }
    }
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct RejectionBody {
    message: Option<String>,
}

/// Authenticator backed by an HTTP endpoint.
///
/// Sends `POST {base_url}/login` with `{"email": .., "password": ..}`:
///
/// | Status | Result |
/// |--------|--------|
/// | 2xx | [`AuthResult::Authenticated`] |
/// | 401, 403 | [`AuthResult::Rejected`] with the body's `message`, if any |
/// | other | [`AuthError::ServerError`] |
#[derive(Debug, Clone)]
pub struct HttpAuthenticator {
    base_url: String,
    client: Client,
}

impl HttpAuthenticator {
    /// Creates an authenticator for `base_url` with the given request timeout.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Http` if the HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, AuthError> {
        let client = Client::builder()
            .timeout(timeout)
            .pool_max_idle_per_host(2)
            .build()?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Creates an authenticator with the default request timeout.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Http` if the HTTP client cannot be built.
    pub fn with_defaults(base_url: impl Into<String>) -> Result<Self, AuthError> {
        Self::new(base_url, Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS))
    }

    /// Login endpoint URL.
    #[must_use]
    pub fn login_url(&self) -> String {
        format!("{}/login", self.base_url)
    }
}

#[async_trait]
impl Authenticator for HttpAuthenticator {
    async fn authenticate(&self, email: &str, password: &str) -> Result<AuthResult, AuthError> {
        let url = self.login_url();
        debug!(url = %url, "Sending login request");

        let response = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .json(&LoginRequest { email, password })
            .send()
            .await?;

        let status = response.status();
        match status {
            _ if status.is_success() => {
                info!(status = status.as_u16(), "Login accepted");
                Ok(AuthResult::Authenticated)
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                let reason = response
                    .json::<RejectionBody>()
                    .await
                    .ok()
                    .and_then(|body| body.message)
                    .filter(|message| !message.trim().is_empty())
                    .unwrap_or_else(|| DEFAULT_REJECT_REASON.to_string());
                info!(status = status.as_u16(), "Login rejected");
                Ok(AuthResult::Rejected { reason })
            }
            _ => {
                let message = response.text().await.unwrap_or_default();
                warn!(status = status.as_u16(), message = %message, "Unexpected login response");
                Err(AuthError::ServerError {
                    status: status.as_u16(),
                    message,
                })
            }
        }
    }
}
