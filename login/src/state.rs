//! Observable form state.
//!
//! [`FormState`] is the snapshot the controller publishes after every
//! mutation. Presentation code subscribes to it and re-renders on change.

use std::fmt;

use serde::Serialize;

use crate::error::ValidationError;
use crate::validation::{password_strength, FieldErrors, PasswordStrength};

/// Externally observable submission phase.
///
/// Validation is synchronous, so it never shows up here.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// No authentication in flight.
    #[default]
    Idle,
    /// Exactly one authentication in flight.
    Loading,
}

/// State of the login form.
///
/// Created empty when the screen opens and discarded when it closes. The
/// password is never serialized.
///
/// # Example
///
/// ```
/// use login_form::state::{FormState, Phase};
///
/// let state = FormState::default();
/// assert!(state.email.is_empty());
/// assert_eq!(state.phase(), Phase::Idle);
/// ```
#[derive(Clone, Default, PartialEq, Eq, Serialize)]
pub struct FormState {
    /// Raw email input.
    pub email: String,

    /// Raw password input.
    #[serde(skip)]
    pub password: String,

    /// Whether the password is shown in clear text. No validation impact.
    pub is_password_visible: bool,

    /// "Remember me" checkbox. No validation impact.
    pub remember_me: bool,

    /// True only while an authentication call is outstanding.
    pub is_loading: bool,

    /// Set by a validation pass that found the email invalid.
    pub email_error: Option<ValidationError>,

    /// Set by a validation pass that found the password invalid.
    pub password_error: Option<ValidationError>,
}

impl fmt::Debug for FormState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormState")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("is_password_visible", &self.is_password_visible)
            .field("remember_me", &self.remember_me)
            .field("is_loading", &self.is_loading)
            .field("email_error", &self.email_error)
            .field("password_error", &self.password_error)
            .finish()
    }
}

impl FormState {
    /// Current submission phase.
    #[must_use]
    pub fn phase(&self) -> Phase {
        if self.is_loading {
            Phase::Loading
        } else {
            Phase::Idle
        }
    }

    /// Strength of the current password.
    #[must_use]
    pub fn password_strength(&self) -> PasswordStrength {
        password_strength(&self.password)
    }

    /// Field errors currently displayed.
    #[must_use]
    pub fn errors(&self) -> FieldErrors {
        FieldErrors {
            email: self.email_error,
            password: self.password_error,
        }
    }

    pub(crate) fn apply_errors(&mut self, errors: FieldErrors) {
        self.email_error = errors.email;
        self.password_error = errors.password;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_state_is_empty_and_idle() {
        let state = FormState::default();
        assert!(state.email.is_empty());
        assert!(state.password.is_empty());
        assert!(!state.is_password_visible);
        assert!(!state.remember_me);
        assert!(!state.is_loading);
        assert!(state.email_error.is_none());
        assert!(state.password_error.is_none());
        assert_eq!(state.phase(), Phase::Idle);
    }

    #[test]
    fn phase_follows_loading_flag() {
        let state = FormState {
            is_loading: true,
            ..FormState::default()
        };
        assert_eq!(state.phase(), Phase::Loading);
    }

    #[test]
    fn errors_round_trip_through_apply() {
        let mut state = FormState::default();
        let errors = FieldErrors {
            email: Some(ValidationError::EmptyEmail),
            password: None,
        };
        state.apply_errors(errors);
        assert_eq!(state.errors(), errors);
        assert_eq!(state.email_error, Some(ValidationError::EmptyEmail));
        assert!(state.password_error.is_none());
    }

    #[test]
    fn password_strength_tracks_password() {
        let state = FormState {
            password: "abcdefg".to_string(),
            ..FormState::default()
        };
        assert_eq!(state.password_strength(), PasswordStrength::Medium);
    }

    #[test]
    fn debug_output_redacts_password() {
        let state = FormState {
            password: "hunter2hunter2".to_string(),
            ..FormState::default()
        };
        let text = format!("{state:?}");
        assert!(text.contains("<redacted>"));
        assert!(!text.contains("hunter2"));
    }

    #[test]
    fn serialized_state_omits_password() {
        let state = FormState {
            email: "admin@example.com".to_string(),
            password: "hunter2hunter2".to_string(),
            email_error: Some(ValidationError::InvalidEmailFormat),
            ..FormState::default()
        };
        let json = serde_json::to_value(&state).unwrap();
        assert!(json.get("password").is_none());
        assert_eq!(json["email"], "admin@example.com");
        assert_eq!(json["email_error"], "invalid_email_format");
        assert_eq!(json["password_error"], serde_json::Value::Null);
        assert!(!json.to_string().contains("hunter2"));
    }
}
