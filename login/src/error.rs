//! Error types for the login form.
//!
//! Field-level validation failures, authentication failures and the crate's
//! umbrella error live here. None of them are ever raised as panics: the
//! controller reports them through return values and its state snapshot.

use thiserror::Error;

use crate::auth::AuthError;
use crate::config::ConfigError;
use crate::validation::FieldErrors;

/// Errors that can occur during login operations.
///
/// This is the primary error type for the crate, encompassing all possible
/// failure modes outside of a single submission.
///
/// # Examples
///
/// ```ignore
/// use login_form::error::LoginError;
///
/// fn load() -> Result<(), LoginError> {
///     let config = login_form::Config::from_env()?;
///     Ok(())
/// }
/// ```
#[derive(Error, Debug)]
pub enum LoginError {
    /// Configuration-related error.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Authenticator transport error.
    #[error("authenticator error: {0}")]
    Auth(#[from] AuthError),

    /// A submission did not succeed.
    #[error("submit error: {0}")]
    Submit(#[from] SubmitError),

    /// JSON parsing or serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A single field failed validation.
///
/// These are recovered locally and surfaced as field-level messages.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationError {
    /// Email is empty or whitespace only.
    #[error("email cannot be empty")]
    EmptyEmail,

    /// Email does not look like `local-part@domain.tld`.
    #[error("please enter a valid email address")]
    InvalidEmailFormat,

    /// Password is empty or whitespace only.
    #[error("password cannot be empty")]
    EmptyPassword,

    /// Password has fewer than six characters.
    #[error("password must be at least 6 characters")]
    PasswordTooShort,
}

/// Authentication did not succeed.
///
/// Carries a message meant for a transient notice. Never retried
/// automatically; the user has to submit again.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthFailure {
    /// The authenticator rejected the credentials.
    #[error("{0}")]
    Rejected(String),

    /// The authenticator could not be reached or failed.
    #[error("network error: {0}")]
    Network(String),
}

/// Why a call to `submit()` did not end in success.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubmitError {
    /// One or both fields failed validation; the authenticator was not called.
    #[error("validation failed: {0}")]
    Validation(FieldErrors),

    /// The authenticator was called and did not accept the credentials.
    #[error("authentication failed: {0}")]
    Auth(#[from] AuthFailure),

    /// The controller was disposed before the submission resolved.
    #[error("controller disposed")]
    Disposed,
}

/// A specialized `Result` type for login operations.
pub type Result<T> = std::result::Result<T, LoginError>;
