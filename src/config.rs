//! Run configuration.
//!
//! A [`RunConfig`] travels with the root [`Context`](crate::context::Context)
//! and is shared by every child scope. Defaults mirror a plain interactive
//! run: colors when stderr is a terminal, mock failures attributed to the
//! suite, no filter, and a warning when an `only` override is replaced.

use crate::errors::WhiskerError;
use regex::Regex;
use std::env;
use std::fmt;
use std::str::FromStr;

pub const FILTER_VAR: &str = "WHISKER_FILTER";
pub const VERIFY_SCOPE_VAR: &str = "WHISKER_VERIFY_SCOPE";
pub const NO_COLOR_VAR: &str = "NO_COLOR";

/// Which context receives mock verification failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VerifyScope {
    /// Record on the outer suite context, so a mock failure always fails the
    /// run even though the test's own scope reports a pass.
    #[default]
    Suite,
    /// Record on the test's isolated scope.
    Test,
}

impl FromStr for VerifyScope {
    type Err = WhiskerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "suite" => Ok(VerifyScope::Suite),
            "test" => Ok(VerifyScope::Test),
            _ => Err(WhiskerError::InvalidSetting {
                key: "verify scope".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for VerifyScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VerifyScope::Suite => f.write_str("suite"),
            VerifyScope::Test => f.write_str("test"),
        }
    }
}

/// Configuration for test execution and reporting.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub use_colors: bool,
    pub verify_scope: VerifyScope,
    pub filter: Option<Regex>,
    pub warn_on_only_override: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            use_colors: atty::is(atty::Stream::Stderr) && env::var_os(NO_COLOR_VAR).is_none(),
            verify_scope: VerifyScope::default(),
            filter: None,
            warn_on_only_override: true,
        }
    }
}

impl RunConfig {
    /// Builds a configuration from `WHISKER_FILTER`, `WHISKER_VERIFY_SCOPE`
    /// and `NO_COLOR` on top of the defaults.
    pub fn from_env() -> Result<Self, WhiskerError> {
        let mut config = Self::default();
        if let Ok(pattern) = env::var(FILTER_VAR) {
            if !pattern.is_empty() {
                config = config.with_filter(&pattern)?;
            }
        }
        if let Ok(scope) = env::var(VERIFY_SCOPE_VAR) {
            config.verify_scope = scope.parse()?;
        }
        Ok(config)
    }

    /// Like [`RunConfig::from_env`], but falls back to the defaults and hands
    /// back the rejected setting instead of failing.
    pub fn from_env_or_default() -> (Self, Option<WhiskerError>) {
        match Self::from_env() {
            Ok(config) => (config, None),
            Err(e) => (Self::default(), Some(e)),
        }
    }

    pub fn with_colors(mut self, use_colors: bool) -> Self {
        self.use_colors = use_colors;
        self
    }

    pub fn with_verify_scope(mut self, verify_scope: VerifyScope) -> Self {
        self.verify_scope = verify_scope;
        self
    }

    /// Only sub-scopes whose full path matches `pattern` will run.
    pub fn with_filter(mut self, pattern: &str) -> Result<Self, WhiskerError> {
        let regex = Regex::new(pattern).map_err(|e| WhiskerError::InvalidFilter {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?;
        self.filter = Some(regex);
        Ok(self)
    }

    pub fn with_only_warning(mut self, warn: bool) -> Self {
        self.warn_on_only_override = warn;
        self
    }

    /// Whether a sub-scope at `path` is selected by the filter.
    pub fn selects(&self, path: &str) -> bool {
        self.filter
            .as_ref()
            .map_or(true, |filter| filter.is_match(path))
    }
}
