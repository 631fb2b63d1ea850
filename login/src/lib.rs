//! Login form controller.
//!
//! This crate owns the state and business rules of a login screen, with no
//! dependency on any UI toolkit: field values, validation errors, the loading
//! flag and a single asynchronous submit operation.
//!
//! # Overview
//!
//! A [`LoginFormController`] publishes [`FormState`] snapshots on every
//! mutation. `submit()` validates both fields synchronously and, if they pass,
//! calls the [`Authenticator`] exactly once. While that call is outstanding
//! further submits are ignored.
//!
//! Presentation helpers sit on top: [`LiveEmailValidation`] checks the email
//! format as the user types, and [`NoticeBoard`] shows transient success and
//! error messages.
//!
//! # Modules
//!
//! - [`validation`]: Email/password rules and password strength
//! - [`state`]: Observable form state
//! - [`controller`]: The login form controller
//! - [`auth`]: Authenticator trait and implementations
//! - [`live`]: Debounced live email validation
//! - [`notice`]: Auto-dismissing transient messages
//! - [`config`]: Configuration from environment variables
//! - [`error`]: Error types
//! - [`utils`]: Shared utilities (debouncing)

pub mod auth;
pub mod config;
pub mod controller;
pub mod error;
pub mod live;
pub mod notice;
pub mod state;
pub mod utils;
pub mod validation;

pub use auth::{AuthError, AuthResult, Authenticator, HttpAuthenticator, SimulatedAuthenticator};
pub use config::{AuthBackend, Config, ConfigError};
pub use controller::{LoginFormController, SubmitOutcome};
pub use error::{AuthFailure, LoginError, Result, SubmitError, ValidationError};
pub use live::LiveEmailValidation;
pub use notice::{Notice, NoticeBoard, NoticeKind};
pub use state::{FormState, Phase};
pub use utils::{Debouncer, DebouncerError};
pub use validation::{
    password_strength, validate_email, validate_form, validate_password, FieldErrors,
    PasswordStrength,
};
