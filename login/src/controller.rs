//! Login form controller.
//!
//! [`LoginFormController`] owns the form state and the submission rules. It is
//! the only writer of [`FormState`]; presentation code reads snapshots through
//! [`LoginFormController::state`] or subscribes to changes with
//! [`LoginFormController::subscribe`].
//!
//! # Submission
//!
//! ```text
//!   idle ──submit()──► validate ──invalid──► idle (errors set)
//!                         │
//!                       valid
//!                         ▼
//!                      loading ──authenticator resolves──► idle
//! ```
//!
//! Validation is synchronous, so only `idle` and `loading` are observable.
//! While loading, `submit()` is a no-op that returns
//! [`SubmitOutcome::AlreadyPending`].
//!
//! # Disposal
//!
//! [`LoginFormController::dispose`] (or dropping the controller) cancels the
//! in-flight authentication by dropping its future. A resolution that races
//! with disposal is discarded; nothing is written to a disposed controller.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use login_form::{LoginFormController, SimulatedAuthenticator, SubmitOutcome};
//!
//! #[tokio::main]
//! async fn main() {
//!     let controller = LoginFormController::with_authenticator(
//!         SimulatedAuthenticator::new(Duration::from_millis(100)),
//!     );
//!     controller.set_email("admin@example.com");
//!     controller.set_password("123456");
//!
//!     assert_eq!(controller.submit().await, Ok(SubmitOutcome::Authenticated));
//!     assert!(!controller.state().is_loading);
//! }
//! ```

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;
use zeroize::{Zeroize, Zeroizing};

use crate::auth::{AuthResult, Authenticator};
use crate::error::{AuthFailure, SubmitError, ValidationError};
use crate::state::FormState;
use crate::validation::{is_email_format, validate_form, FieldErrors};

/// Successful result of [`LoginFormController::submit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The authenticator accepted the credentials.
    Authenticated,
    /// A submission was already in flight; this call did nothing.
    AlreadyPending,
}

/// What the synchronous half of `submit()` decided.
enum Admission {
    AlreadyPending,
    Invalid(FieldErrors),
    Authenticate {
        email: String,
        password: Zeroizing<String>,
    },
}

/// Owns the login form state and business rules.
///
/// All methods take `&self`; the controller can be shared behind an [`Arc`]
/// between the event loop and background tasks.
pub struct LoginFormController {
    authenticator: Arc<dyn Authenticator>,
    state_tx: watch::Sender<FormState>,
    cancel: CancellationToken,
}

impl std::fmt::Debug for LoginFormController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginFormController")
            .field("state", &*self.state_tx.borrow())
            .field("disposed", &self.is_disposed())
            .finish_non_exhaustive()
    }
}

impl LoginFormController {
    /// Creates a controller with empty form state.
    #[must_use]
    pub fn new(authenticator: Arc<dyn Authenticator>) -> Self {
        let (state_tx, _) = watch::channel(FormState::default());
        Self {
            authenticator,
            state_tx,
            cancel: CancellationToken::new(),
        }
    }

    /// Creates a controller that owns `authenticator`.
    #[must_use]
    pub fn with_authenticator<A>(authenticator: A) -> Self
    where
        A: Authenticator + 'static,
    {
        Self::new(Arc::new(authenticator))
    }

    /// Returns a snapshot of the current state.
    #[must_use]
    pub fn state(&self) -> FormState {
        self.state_tx.borrow().clone()
    }

    /// Subscribes to state changes. Every mutation publishes a new snapshot.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<FormState> {
        self.state_tx.subscribe()
    }

    /// Returns `true` once the controller has been disposed.
    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Replaces the email and clears its error.
    pub fn set_email(&self, value: impl Into<String>) {
        let value = value.into();
        self.mutate("set_email", |state| {
            state.email = value;
            state.email_error = None;
        });
    }

    /// Replaces the password and clears its error.
    pub fn set_password(&self, value: impl Into<String>) {
        let value = value.into();
        self.mutate("set_password", |state| {
            state.password.zeroize();
            state.password = value;
            state.password_error = None;
        });
    }

    /// Flips the "remember me" checkbox.
    pub fn toggle_remember_me(&self) {
        self.mutate("toggle_remember_me", |state| {
            state.remember_me = !state.remember_me;
        });
    }

    /// Sets the "remember me" checkbox.
    pub fn set_remember_me(&self, remember_me: bool) {
        self.mutate("set_remember_me", |state| {
            state.remember_me = remember_me;
        });
    }

    /// Flips password visibility.
    pub fn toggle_password_visibility(&self) {
        self.mutate("toggle_password_visibility", |state| {
            state.is_password_visible = !state.is_password_visible;
        });
    }

    /// Validates the form and, if valid, authenticates.
    ///
    /// Both fields are validated on every call and all errors are reported
    /// together. The authenticator is invoked exactly once per accepted call.
    ///
    /// # Errors
    ///
    /// - [`SubmitError::Validation`] if either field is invalid. The
    ///   authenticator is not called.
    /// - [`SubmitError::Auth`] if the authenticator rejected the credentials
    ///   or failed.
    /// - [`SubmitError::Disposed`] if the controller was disposed before or
    ///   during the submission.
    pub async fn submit(&self) -> Result<SubmitOutcome, SubmitError> {
        if self.is_disposed() {
            return Err(SubmitError::Disposed);
        }

        let mut admission = Admission::AlreadyPending;
        self.state_tx.send_if_modified(|state| {
            if state.is_loading {
                return false;
            }

            let errors = validate_form(&state.email, &state.password);
            state.apply_errors(errors);
            admission = if errors.is_empty() {
                state.is_loading = true;
                Admission::Authenticate {
                    email: state.email.clone(),
                    password: Zeroizing::new(state.password.clone()),
                }
            } else {
                Admission::Invalid(errors)
            };
            true
        });

        let (email, password) = match admission {
            Admission::AlreadyPending => {
                debug!("Submission already in flight, ignoring submit");
                return Ok(SubmitOutcome::AlreadyPending);
            }
            Admission::Invalid(errors) => {
                debug!(
                    email_error = ?errors.email,
                    password_error = ?errors.password,
                    "Validation failed"
                );
                return Err(SubmitError::Validation(errors));
            }
            Admission::Authenticate { email, password } => (email, password),
        };

        let attempt_id = Uuid::new_v4();
        info!(attempt_id = %attempt_id, "Authenticating");

        let loading = LoadingGuard {
            state_tx: &self.state_tx,
            cancel: &self.cancel,
        };

        let verdict = tokio::select! {
            biased;
            () = self.cancel.cancelled() => None,
            result = self.authenticator.authenticate(&email, password.as_str()) => Some(result),
        };

        let Some(result) = verdict.filter(|_| !self.is_disposed()) else {
            debug!(attempt_id = %attempt_id, "Controller disposed, discarding authentication");
            return Err(SubmitError::Disposed);
        };

        drop(loading);

        match result {
            Ok(AuthResult::Authenticated) => {
                info!(attempt_id = %attempt_id, "Authentication succeeded");
                Ok(SubmitOutcome::Authenticated)
            }
            Ok(AuthResult::Rejected { reason }) => {
                info!(attempt_id = %attempt_id, reason = %reason, "Authentication rejected");
                Err(AuthFailure::Rejected(reason).into())
            }
            Err(e) => {
                warn!(attempt_id = %attempt_id, error = %e, "Authentication failed");
                Err(AuthFailure::Network(e.to_string()).into())
            }
        }
    }

    /// Runs [`submit`](Self::submit) on a background task.
    ///
    /// For event loops that cannot await. The task holds a clone of the
    /// controller; disposing the controller resolves it with
    /// [`SubmitError::Disposed`].
    pub fn submit_in_background(
        self: &Arc<Self>,
    ) -> JoinHandle<Result<SubmitOutcome, SubmitError>> {
        let controller = Arc::clone(self);
        tokio::spawn(async move { controller.submit().await })
    }

    /// Applies a debounced live check of the email field.
    ///
    /// Ignored if `value` is stale (the email changed since), if a submission
    /// is in flight, or if the controller is disposed. Otherwise sets
    /// [`ValidationError::InvalidEmailFormat`] for a malformed non-empty value
    /// and clears the email error for anything else.
    ///
    /// Returns `true` if the check was applied.
    pub fn apply_live_email_check(&self, value: &str) -> bool {
        if self.is_disposed() {
            return false;
        }

        let mut applied = false;
        self.state_tx.send_if_modified(|state| {
            if state.is_loading || state.email != value {
                return false;
            }
            applied = true;

            let error = (!value.is_empty() && !is_email_format(value))
                .then_some(ValidationError::InvalidEmailFormat);
            if state.email_error == error {
                return false;
            }
            state.email_error = error;
            true
        });
        applied
    }

    /// Tears the controller down.
    ///
    /// Cancels the in-flight authentication, wipes the password and makes
    /// every later mutation a no-op. Idempotent.
    pub fn dispose(&self) {
        if self.is_disposed() {
            return;
        }

        self.cancel.cancel();
        self.state_tx.send_modify(|state| {
            state.password.zeroize();
        });
        debug!("Login form controller disposed");
    }

    fn mutate(&self, operation: &'static str, f: impl FnOnce(&mut FormState)) {
        if self.is_disposed() {
            debug!(operation, "Ignoring mutation on disposed controller");
            return;
        }
        self.state_tx.send_modify(f);
    }
}

impl Drop for LoginFormController {
    fn drop(&mut self) {
        self.dispose();
    }
}

/// Clears `is_loading` when a submission ends, however it ends.
///
/// Covers the caller dropping the `submit()` future mid-flight. Never writes
/// to a disposed controller.
struct LoadingGuard<'a> {
    state_tx: &'a watch::Sender<FormState>,
    cancel: &'a CancellationToken,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        if self.cancel.is_cancelled() {
            return;
        }
        self.state_tx.send_modify(|state| state.is_loading = false);
    }
}
