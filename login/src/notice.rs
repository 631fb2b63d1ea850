//! Transient success and error messages.
//!
//! A [`NoticeBoard`] shows at most one [`Notice`] at a time and dismisses it
//! automatically after its time-to-live. Posting a new notice supersedes the
//! current one and its pending dismissal. Dropping the board cancels any
//! pending dismissal.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use login_form::notice::{Notice, NoticeBoard};
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut board = NoticeBoard::new(Duration::from_secs(2), Duration::from_secs(3));
//!     let mut rx = board.subscribe();
//!
//!     board.post(Notice::success("login successful"));
//!     assert!(board.current().is_some());
//!
//!     // Cleared automatically after two seconds
//!     rx.changed().await.unwrap();
//! }
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::trace;

use crate::config::Config;
use crate::controller::SubmitOutcome;
use crate::error::SubmitError;

/// Text of the notice shown after a successful login.
pub const LOGIN_SUCCESS_TEXT: &str = "login successful";

/// Severity of a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeKind {
    Success,
    Error,
}

/// A user-visible message that disappears on its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub text: String,
}

impl Notice {
    #[must_use]
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            text: text.into(),
        }
    }

    #[must_use]
    pub fn error(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            text: text.into(),
        }
    }

    /// Notice to show for the result of a submission, if any.
    ///
    /// Validation failures are shown next to their fields and ignored
    /// submissions show nothing, so both map to `None`.
    #[must_use]
    pub fn from_submit(result: &Result<SubmitOutcome, SubmitError>) -> Option<Self> {
        match result {
            Ok(SubmitOutcome::Authenticated) => Some(Self::success(LOGIN_SUCCESS_TEXT)),
            Err(SubmitError::Auth(failure)) => Some(Self::error(failure.to_string())),
            Ok(SubmitOutcome::AlreadyPending)
            | Err(SubmitError::Validation(_))
            | Err(SubmitError::Disposed) => None,
        }
    }
}

/// Holds the current notice and its pending dismissal.
#[derive(Debug)]
pub struct NoticeBoard {
    notice_tx: Arc<watch::Sender<Option<Notice>>>,
    generation: Arc<AtomicU64>,
    dismissal: Option<CancellationToken>,
    success_ttl: Duration,
    error_ttl: Duration,
}

impl NoticeBoard {
    /// Creates an empty board with per-kind lifetimes.
    #[must_use]
    pub fn new(success_ttl: Duration, error_ttl: Duration) -> Self {
        let (notice_tx, _) = watch::channel(None);
        Self {
            notice_tx: Arc::new(notice_tx),
            generation: Arc::new(AtomicU64::new(0)),
            dismissal: None,
            success_ttl,
            error_ttl,
        }
    }

    /// Creates an empty board with the lifetimes from `config`.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.success_notice, config.error_notice)
    }

    /// Subscribes to notice changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<Notice>> {
        self.notice_tx.subscribe()
    }

    /// The notice currently shown.
    #[must_use]
    pub fn current(&self) -> Option<Notice> {
        self.notice_tx.borrow().clone()
    }

    /// Shows `notice` for the lifetime configured for its kind.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn post(&mut self, notice: Notice) {
        let ttl = match notice.kind {
            NoticeKind::Success => self.success_ttl,
            NoticeKind::Error => self.error_ttl,
        };
        self.show(notice, ttl);
    }

    /// Shows `notice` for `ttl`, superseding the current notice.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn show(&mut self, notice: Notice, ttl: Duration) {
        self.cancel_dismissal();

        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        trace!(generation, kind = ?notice.kind, ttl_ms = ttl.as_millis(), "Showing notice");
        self.notice_tx.send_replace(Some(notice));

        let cancel = CancellationToken::new();
        self.dismissal = Some(cancel.clone());

        let notice_tx = Arc::clone(&self.notice_tx);
        let current = Arc::clone(&self.generation);
        tokio::spawn(async move {
            tokio::select! {
                biased;
                () = cancel.cancelled() => {}
                () = tokio::time::sleep(ttl) => {
                    notice_tx.send_if_modified(|shown| {
                        if current.load(Ordering::SeqCst) != generation || shown.is_none() {
                            return false;
                        }
                        *shown = None;
                        true
                    });
                    trace!(generation, "Notice dismissed");
                }
            }
        });
    }

    /// Clears the current notice immediately.
    pub fn dismiss(&mut self) {
        self.cancel_dismissal();
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.notice_tx.send_if_modified(|shown| shown.take().is_some());
    }

    fn cancel_dismissal(&mut self) {
        if let Some(cancel) = self.dismissal.take() {
            cancel.cancel();
        }
    }
}

impl Drop for NoticeBoard {
    fn drop(&mut self) {
        self.cancel_dismissal();
    }
}
