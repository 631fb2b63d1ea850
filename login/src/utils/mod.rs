//! Utility modules for the login form.
//!
//! # Modules
//!
//! - [`debounce`]: Keyed debouncer where each new value supersedes the pending one

pub mod debounce;

pub use debounce::{Debouncer, DebouncerError};
