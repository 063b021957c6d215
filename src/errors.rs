//! Whisker error handling.
//!
//! Every failure the organizer observes is surfaced as a [`WhiskerError`] and
//! recorded on a [`Context`](crate::context::Context). Nothing here is ever
//! retried or swallowed: the coordinator only sequences, the context records.
//!
//! Errors derive both `thiserror::Error` (for the one-line `Display` used in
//! status lines) and `miette::Diagnostic` (for the full rendering used by the
//! `meow` binary).

use miette::Diagnostic;
use std::fmt;
use thiserror::Error;

/// The lifecycle step a test was in when it failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Clearing registered mocks before the test.
    Reset,
    /// Running setup hooks.
    Setup,
    /// Running the test body.
    Body,
    /// Verifying registered mocks after the body.
    Verify,
    /// Running cleanup hooks after the test.
    Cleanup,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Reset => "reset",
            Phase::Setup => "setup",
            Phase::Body => "body",
            Phase::Verify => "verify",
            Phase::Cleanup => "cleanup",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a mock reports when its expectations were not met.
///
/// Produced by [`Mock::verify`](crate::mock::Mock::verify); the coordinator
/// wraps it in [`WhiskerError::Verification`] together with the test name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("mock '{mock}': {}", .problems.join("; "))]
pub struct MockFailure {
    pub mock: String,
    pub problems: Vec<String>,
}

impl MockFailure {
    pub fn new(mock: impl Into<String>, problems: Vec<String>) -> Self {
        Self {
            mock: mock.into(),
            problems,
        }
    }
}

/// All failures recorded during a run.
#[derive(Debug, Clone, PartialEq, Error, Diagnostic)]
pub enum WhiskerError {
    #[error("'{scope}' panicked during {phase}: {message}")]
    #[diagnostic(code(whisker::test::panicked))]
    Panicked {
        scope: String,
        phase: Phase,
        message: String,
    },

    #[error("cleanup hook #{index} panicked after '{test}': {message}")]
    #[diagnostic(
        code(whisker::hook::cleanup),
        help("later cleanup hooks still ran; fix the panicking hook first")
    )]
    CleanupPanicked {
        test: String,
        index: usize,
        message: String,
    },

    #[error("mock verification failed for '{test}': {failure}")]
    #[diagnostic(
        code(whisker::mock::unmet),
        help("mocks are reset before every test, so expectations must be set in a setup hook or in the test body")
    )]
    Verification {
        test: String,
        #[source]
        failure: MockFailure,
    },

    #[error("'{scope}' failed: {message}")]
    #[diagnostic(code(whisker::test::failed))]
    Failed { scope: String, message: String },

    #[error("invalid filter pattern '{pattern}': {reason}")]
    #[diagnostic(code(whisker::config::filter))]
    InvalidFilter { pattern: String, reason: String },

    #[error("invalid value '{value}' for {key}")]
    #[diagnostic(
        code(whisker::config::setting),
        help("verify scope accepts 'suite' or 'test'")
    )]
    InvalidSetting { key: String, value: String },
}

impl WhiskerError {
    /// The phase this failure belongs to, when it is tied to one.
    pub fn phase(&self) -> Option<Phase> {
        match self {
            WhiskerError::Panicked { phase, .. } => Some(*phase),
            WhiskerError::CleanupPanicked { .. } => Some(Phase::Cleanup),
            WhiskerError::Verification { .. } => Some(Phase::Verify),
            WhiskerError::Failed { .. } => Some(Phase::Body),
            WhiskerError::InvalidFilter { .. } | WhiskerError::InvalidSetting { .. } => None,
        }
    }
}

/// Extracts a readable message from a caught panic payload.
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

/// Prints a WhiskerError with full miette diagnostics.
pub fn print_error(error: WhiskerError) {
    let report = miette::Report::new(error);
    eprintln!("{report:?}");
}
