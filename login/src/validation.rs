//! Validation rules for the login form.
//!
//! Everything in this module is pure: no state, no I/O. The controller calls
//! [`validate_form`] on submit, the live validator calls [`validate_email`]
//! on debounced edits, and presentation code calls [`password_strength`] on
//! every keystroke.
//!
//! # Rules
//!
//! | Field | Blank | Otherwise invalid |
//! |-------|-------|-------------------|
//! | email | [`ValidationError::EmptyEmail`] | [`ValidationError::InvalidEmailFormat`] |
//! | password | [`ValidationError::EmptyPassword`] | [`ValidationError::PasswordTooShort`] (< 6 chars) |
//!
//! # Example
//!
//! ```
//! use login_form::validation::{validate_form, password_strength, PasswordStrength};
//!
//! let errors = validate_form("bad", "123");
//! assert!(errors.email.is_some());
//! assert!(errors.password.is_some());
//!
//! assert_eq!(password_strength("abcdefghij"), PasswordStrength::Strong);
//! ```

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

use crate::error::ValidationError;

/// Minimum number of characters a password must have.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Passwords at or above this length are classified as strong.
const STRONG_PASSWORD_LENGTH: usize = 10;

/// `local-part@domain.tld`, with at least one dot-separated label after the
/// first domain label.
const EMAIL_PATTERN: &str = r"^[a-zA-Z0-9+._%\-]{1,256}@[a-zA-Z0-9][a-zA-Z0-9\-]{0,64}(\.[a-zA-Z0-9][a-zA-Z0-9\-]{0,25})+$";

fn email_regex() -> &'static Regex {
    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    EMAIL_REGEX.get_or_init(|| Regex::new(EMAIL_PATTERN).expect("email pattern is valid"))
}

/// Returns `true` if `value` looks like an email address.
///
/// Blank handling is left to [`validate_email`]; this only checks the shape.
#[must_use]
pub fn is_email_format(value: &str) -> bool {
    email_regex().is_match(value)
}

/// Validates an email address.
///
/// # Errors
///
/// - [`ValidationError::EmptyEmail`] if the value is empty or whitespace only
/// - [`ValidationError::InvalidEmailFormat`] if it is not `local@domain.tld`
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    if email.trim().is_empty() {
        return Err(ValidationError::EmptyEmail);
    }

    if !is_email_format(email) {
        return Err(ValidationError::InvalidEmailFormat);
    }

    Ok(())
}

/// Validates a password.
///
/// Length is counted in characters, not bytes.
///
/// # Errors
///
/// - [`ValidationError::EmptyPassword`] if the value is empty or whitespace only
/// - [`ValidationError::PasswordTooShort`] if it has fewer than
///   [`MIN_PASSWORD_LENGTH`] characters
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.trim().is_empty() {
        return Err(ValidationError::EmptyPassword);
    }

    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ValidationError::PasswordTooShort);
    }

    Ok(())
}

/// Per-field outcome of one validation pass.
///
/// `None` means the field passed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FieldErrors {
    pub email: Option<ValidationError>,
    pub password: Option<ValidationError>,
}

impl FieldErrors {
    /// Returns `true` when neither field has an error.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.email.is_none() && self.password.is_none()
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.email, self.password) {
            (Some(email), Some(password)) => write!(f, "{email}; {password}"),
            (Some(email), None) => write!(f, "{email}"),
            (None, Some(password)) => write!(f, "{password}"),
            (None, None) => write!(f, "no errors"),
        }
    }
}

/// Validates both fields.
///
/// Both rules always run so the caller sees every problem in one round.
#[must_use]
pub fn validate_form(email: &str, password: &str) -> FieldErrors {
    FieldErrors {
        email: validate_email(email).err(),
        password: validate_password(password).err(),
    }
}

/// Coarse strength classification of a password, by length alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PasswordStrength {
    /// No characters.
    Empty,
    /// 1 to 5 characters.
    Weak,
    /// 6 to 9 characters.
    Medium,
    /// 10 or more characters.
    Strong,
}

impl PasswordStrength {
    /// Short label for display next to the password field.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Empty => "",
            Self::Weak => "weak",
            Self::Medium => "medium",
            Self::Strong => "strong",
        }
    }
}

impl fmt::Display for PasswordStrength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Classifies a password by its character count.
///
/// Total over all inputs and deterministic.
#[must_use]
pub fn password_strength(password: &str) -> PasswordStrength {
    match password.chars().count() {
        0 => PasswordStrength::Empty,
        n if n < MIN_PASSWORD_LENGTH => PasswordStrength::Weak,
        n if n < STRONG_PASSWORD_LENGTH => PasswordStrength::Medium,
        _ => PasswordStrength::Strong,
    }
}
