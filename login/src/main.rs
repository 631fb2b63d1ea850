//! login-form - drive the login form controller from a terminal.
//!
//! # Commands
//!
//! - `login-form submit`: Fill in the form and submit it
//! - `login-form strength`: Classify a password
//! - `login-form check-email`: Validate an email address
//!
//! # Environment Variables
//!
//! See the [`config`] module for available configuration options.

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::signal;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use login_form::auth::{Authenticator, HttpAuthenticator, SimulatedAuthenticator};
use login_form::config::{AuthBackend, Config};
use login_form::controller::{LoginFormController, SubmitOutcome};
use login_form::error::SubmitError;
use login_form::notice::{Notice, NoticeBoard};
use login_form::state::FormState;
use login_form::validation::{password_strength, validate_email, PasswordStrength};

/// login-form - login form controller demo.
///
/// Validates credentials the way the login screen does and submits them to
/// the configured authenticator.
#[derive(Parser, Debug)]
#[command(name = "login-form")]
#[command(author, version, about, long_about = None)]
#[command(after_help = "\
ENVIRONMENT VARIABLES:
    LOGIN_AUTH_URL            Login endpoint base URL (default: simulated)
    LOGIN_AUTH_LATENCY_MS     Simulated authenticator latency (default: 2000)
    LOGIN_AUTH_TIMEOUT_SECS   HTTP request timeout (default: 30)
    LOGIN_DEBOUNCE_MS         Live email validation debounce (default: 300)
    LOGIN_SUCCESS_NOTICE_MS   Success notice lifetime (default: 2000)
    LOGIN_ERROR_NOTICE_MS     Error notice lifetime (default: 3000)

EXAMPLES:
    # Submit against the simulated authenticator
    login-form submit --email admin@example.com --password 123456

    # Submit against a real endpoint
    export LOGIN_AUTH_URL=https://auth.example.com
    login-form submit --email me@example.com --password hunter22

    # Check a password's strength
    login-form strength correcthorse
")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

/// CLI subcommands.
#[derive(Subcommand, Debug)]
enum Command {
    /// Fill in the form and submit it.
    ///
    /// Exits 0 on success, 1 if authentication failed, 2 if validation failed.
    Submit {
        /// Email address.
        #[arg(short, long, default_value = "")]
        email: String,

        /// Password.
        #[arg(short, long, default_value = "")]
        password: String,

        /// Tick the "remember me" box.
        #[arg(long)]
        remember_me: bool,

        /// Print the final form state as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Classify a password as empty, weak, medium or strong.
    Strength {
        /// Password to classify.
        password: String,
    },

    /// Validate an email address.
    CheckEmail {
        /// Email address to validate.
        email: String,
    },
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    match cli.command {
        Command::Submit {
            email,
            password,
            remember_me,
            json,
        } => {
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()
                .context("Failed to create tokio runtime")?;

            runtime.block_on(run_submit(email, password, remember_me, json))
        }
        Command::Strength { password } => {
            match password_strength(&password) {
                PasswordStrength::Empty => println!("empty"),
                strength => println!("{strength}"),
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::CheckEmail { email } => match validate_email(&email) {
            Ok(()) => {
                println!("ok");
                Ok(ExitCode::SUCCESS)
            }
            Err(e) => {
                println!("{e}");
                Ok(ExitCode::from(2))
            }
        },
    }
}

/// Fills in the form, submits it and reports the outcome.
async fn run_submit(
    email: String,
    password: String,
    remember_me: bool,
    json: bool,
) -> Result<ExitCode> {
    init_logging();

    let config = Config::from_env().context("Failed to load configuration")?;
    let authenticator = build_authenticator(&config)?;

    let controller = Arc::new(LoginFormController::new(authenticator));
    let mut notices = NoticeBoard::from_config(&config);

    let mut state_rx = controller.subscribe();
    let state_logger = tokio::spawn(async move {
        let mut last_phase = state_rx.borrow().phase();
        while state_rx.changed().await.is_ok() {
            let phase = state_rx.borrow_and_update().phase();
            if phase != last_phase {
                debug!(from = ?last_phase, to = ?phase, "Phase changed");
                last_phase = phase;
            }
        }
    });

    controller.set_email(email);
    controller.set_password(password);
    controller.set_remember_me(remember_me);

    let submission = controller.submit_in_background();
    let result = tokio::select! {
        joined = submission => joined.context("Submission task failed")?,
        () = wait_for_shutdown() => {
            info!("Interrupted, cancelling submission");
            controller.dispose();
            Err(SubmitError::Disposed)
        }
    };

    let exit = match &result {
        Ok(SubmitOutcome::Authenticated) => ExitCode::SUCCESS,
        Ok(SubmitOutcome::AlreadyPending)
        | Err(SubmitError::Auth(_))
        | Err(SubmitError::Disposed) => ExitCode::FAILURE,
        Err(SubmitError::Validation(_)) => ExitCode::from(2),
    };

    let final_state = controller.state();
    if let Err(SubmitError::Validation(_)) = &result {
        print_field_errors(&final_state);
    }

    if let Some(notice) = Notice::from_submit(&result) {
        println!("{}", notice.text);
        notices.post(notice);
        wait_for_dismissal(&notices).await;
    }

    if json {
        let rendered =
            serde_json::to_string_pretty(&final_state).context("Failed to serialize form state")?;
        println!("{rendered}");
    }

    controller.dispose();
    state_logger.abort();

    Ok(exit)
}

/// Picks the authenticator described by `config`.
fn build_authenticator(config: &Config) -> Result<Arc<dyn Authenticator>> {
    match &config.auth {
        AuthBackend::Simulated { latency } => {
            info!(latency_ms = latency.as_millis(), "Using simulated authenticator");
            Ok(Arc::new(SimulatedAuthenticator::new(*latency)))
        }
        AuthBackend::Http { base_url, timeout } => {
            info!(base_url = %base_url, "Using HTTP authenticator");
            let auth = HttpAuthenticator::new(base_url.clone(), *timeout)
                .context("Failed to create HTTP authenticator")?;
            Ok(Arc::new(auth))
        }
    }
}

fn print_field_errors(state: &FormState) {
    if let Some(error) = state.email_error {
        eprintln!("email: {error}");
    }
    if let Some(error) = state.password_error {
        eprintln!("password: {error}");
    }
}

/// Waits until the current notice has been dismissed.
async fn wait_for_dismissal(notices: &NoticeBoard) {
    let mut rx = notices.subscribe();
    if rx.wait_for(Option::is_none).await.is_err() {
        warn!("Notice board closed before dismissal");
    }
}

/// Initializes the logging subsystem.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .with_writer(std::io::stderr)
        .init();
}

/// Waits for a shutdown signal (SIGINT or SIGTERM).
async fn wait_for_shutdown() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
