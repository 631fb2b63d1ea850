//! Debounced live validation of the email field.
//!
//! While the user types, the email format is checked once typing pauses for
//! the debounce interval. Each edit supersedes the pending check, and edits
//! that leave the email at or below the minimum length cancel it.
//!
//! The check runs against the controller only if the email has not changed
//! in the meantime (see [`LoginFormController::apply_live_email_check`]).
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use login_form::{LiveEmailValidation, LoginFormController, SimulatedAuthenticator};
//!
//! #[tokio::main]
//! async fn main() {
//!     let controller = Arc::new(LoginFormController::with_authenticator(
//!         SimulatedAuthenticator::default(),
//!     ));
//!     let live =
//!         LiveEmailValidation::spawn(Arc::clone(&controller), Duration::from_millis(300), 3);
//!
//!     controller.set_email("not-an-email");
//!     live.email_changed("not-an-email");
//! }
//! ```

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, trace};

use crate::config::Config;
use crate::controller::LoginFormController;
use crate::utils::debounce::Debouncer;

/// Debouncer key for the email field.
const EMAIL_KEY: &str = "email";

/// Handle to a running live email validation.
///
/// Dropping the handle stops validation; a pending check is discarded.
#[derive(Debug)]
pub struct LiveEmailValidation {
    debouncer: Debouncer<&'static str, String>,
    min_length: usize,
    task: JoinHandle<()>,
}

impl LiveEmailValidation {
    /// Starts live validation for `controller`.
    ///
    /// The task holds only a weak reference, so it never keeps the controller
    /// alive. Must be called from within a Tokio runtime.
    #[must_use]
    pub fn spawn(
        controller: Arc<LoginFormController>,
        interval: Duration,
        min_length: usize,
    ) -> Self {
        let (output_tx, mut output_rx) = mpsc::channel::<(&'static str, String)>(16);
        let debouncer = Debouncer::new(interval, output_tx);
        let controller = Arc::downgrade(&controller);

        let task = tokio::spawn(async move {
            while let Some((_, value)) = output_rx.recv().await {
                let Some(controller) = controller.upgrade() else {
                    break;
                };
                if controller.is_disposed() {
                    break;
                }
                let applied = controller.apply_live_email_check(&value);
                trace!(applied, "Live email check");
            }
            debug!("Live email validation stopped");
        });

        Self {
            debouncer,
            min_length,
            task,
        }
    }

    /// Starts live validation with the debounce settings from `config`.
    #[must_use]
    pub fn from_config(controller: Arc<LoginFormController>, config: &Config) -> Self {
        Self::spawn(controller, config.debounce, config.live_min_length)
    }

    /// Reports an edit of the email field.
    ///
    /// Schedules a check of `value`, superseding any pending one, when it is
    /// longer than the minimum length; otherwise cancels the pending check.
    /// Returns `true` if a check was scheduled.
    pub fn email_changed(&self, value: &str) -> bool {
        if value.chars().count() > self.min_length {
            self.debouncer.try_send(EMAIL_KEY, value.to_string())
        } else {
            self.debouncer.cancel(EMAIL_KEY);
            false
        }
    }
}

impl Drop for LiveEmailValidation {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::SimulatedAuthenticator;
    use crate::error::ValidationError;
    use tokio::time::sleep;

    const INTERVAL: Duration = Duration::from_millis(300);

    fn setup() -> (Arc<LoginFormController>, LiveEmailValidation) {
        let controller = Arc::new(LoginFormController::with_authenticator(
            SimulatedAuthenticator::default(),
        ));
        let live = LiveEmailValidation::spawn(Arc::clone(&controller), INTERVAL, 3);
        (controller, live)
    }

    fn edit(controller: &LoginFormController, live: &LiveEmailValidation, value: &str) -> bool {
        controller.set_email(value);
        live.email_changed(value)
    }

    #[tokio::test(start_paused = true)]
    async fn malformed_email_flagged_after_pause() {
        let (controller, live) = setup();

        assert!(edit(&controller, &live, "bad-email"));
        assert!(controller.state().email_error.is_none());

        sleep(INTERVAL * 2).await;

        assert_eq!(
            controller.state().email_error,
            Some(ValidationError::InvalidEmailFormat)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn valid_email_leaves_no_error() {
        let (controller, live) = setup();

        edit(&controller, &live, "admin@example.com");
        sleep(INTERVAL * 2).await;

        assert!(controller.state().email_error.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn later_edit_supersedes_pending_check() {
        let (controller, live) = setup();

        edit(&controller, &live, "admin");
        sleep(INTERVAL / 2).await;
        edit(&controller, &live, "admin@example.com");
        sleep(INTERVAL * 2).await;

        assert!(controller.state().email_error.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn short_input_is_not_checked() {
        let (controller, live) = setup();

        assert!(!edit(&controller, &live, "abc"));
        sleep(INTERVAL * 2).await;

        assert!(controller.state().email_error.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn shortening_input_cancels_pending_check() {
        let (controller, live) = setup();

        edit(&controller, &live, "abcd");
        sleep(INTERVAL / 3).await;
        edit(&controller, &live, "ab");
        sleep(INTERVAL * 2).await;

        assert!(controller.state().email_error.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn disposed_controller_is_not_touched() {
        let (controller, live) = setup();

        edit(&controller, &live, "bad-email");
        controller.dispose();
        sleep(INTERVAL * 2).await;

        assert!(controller.state().email_error.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_handle_stops_validation() {
        let (controller, live) = setup();

        edit(&controller, &live, "bad-email");
        drop(live);
        sleep(INTERVAL * 2).await;

        assert!(controller.state().email_error.is_none());
    }
}
