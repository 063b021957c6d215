//! Outcomes, summaries, and rendering of a finished run.

use crate::errors::WhiskerError;
use crate::output::{Level, Sink};
use serde::Serialize;

/// How a single test ended.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Status {
    Passed,
    Failed { errors: Vec<String> },
    Disabled,
}

/// The result of one test scope, or one disabled record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Outcome {
    pub name: String,
    #[serde(flatten)]
    pub status: Status,
}

impl Outcome {
    pub fn passed(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: Status::Passed,
        }
    }

    pub fn failed(name: impl Into<String>, errors: &[WhiskerError]) -> Self {
        Self {
            name: name.into(),
            status: Status::Failed {
                errors: errors.iter().map(ToString::to_string).collect(),
            },
        }
    }

    pub fn disabled(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: Status::Disabled,
        }
    }

    pub fn is_pass(&self) -> bool {
        matches!(self.status, Status::Passed)
    }

    pub fn is_fail(&self) -> bool {
        matches!(self.status, Status::Failed { .. })
    }

    pub fn is_disabled(&self) -> bool {
        matches!(self.status, Status::Disabled)
    }
}

/// Test result summary.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub passed: usize,
    pub failed: usize,
    pub disabled: usize,
    /// Failures recorded directly on the suite context rather than on a test.
    pub suite_failures: usize,
}

impl Summary {
    pub fn from_outcomes(outcomes: &[Outcome], suite_failures: usize) -> Self {
        let mut summary = Summary {
            suite_failures,
            ..Summary::default()
        };
        for outcome in outcomes {
            match outcome.status {
                Status::Passed => summary.passed += 1,
                Status::Failed { .. } => summary.failed += 1,
                Status::Disabled => summary.disabled += 1,
            }
        }
        summary
    }

    pub fn has_failures(&self) -> bool {
        self.failed > 0 || self.suite_failures > 0
    }

    pub fn total_tests(&self) -> usize {
        self.passed + self.failed + self.disabled
    }

    /// Percentage of executed tests that passed; disabled tests are not counted.
    pub fn success_rate(&self) -> f64 {
        let executed = self.passed + self.failed;
        if executed == 0 {
            return 0.0;
        }
        (self.passed as f64 / executed as f64) * 100.0
    }
}

/// Everything a run produced, in execution order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub outcomes: Vec<Outcome>,
    pub suite_failures: Vec<String>,
    pub summary: Summary,
}

impl Report {
    pub fn new(outcomes: Vec<Outcome>, suite_failures: &[WhiskerError]) -> Self {
        let summary = Summary::from_outcomes(&outcomes, suite_failures.len());
        Self {
            outcomes,
            suite_failures: suite_failures.iter().map(ToString::to_string).collect(),
            summary,
        }
    }

    pub fn outcome(&self, name: &str) -> Option<&Outcome> {
        self.outcomes.iter().find(|outcome| outcome.name == name)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Print one line per outcome followed by the summary line.
    pub fn render(&self, sink: &dyn Sink) {
        for outcome in &self.outcomes {
            match &outcome.status {
                Status::Passed => sink.emit(Level::Pass, &format!("PASS: {}", outcome.name)),
                Status::Disabled => sink.emit(Level::Skip, &format!("DISABLED: {}", outcome.name)),
                Status::Failed { errors } => {
                    sink.emit(Level::Fail, &format!("FAIL: {}", outcome.name));
                    for error in errors {
                        sink.emit(Level::Fail, &format!("  Error: {}", error));
                    }
                }
            }
        }
        for failure in &self.suite_failures {
            sink.emit(Level::Fail, &format!("SUITE: {}", failure));
        }

        let summary = &self.summary;
        let level = if summary.has_failures() {
            Level::Fail
        } else {
            Level::Pass
        };
        sink.emit(
            level,
            &format!(
                "Test summary: total {}, passed {}, failed {}, disabled {}, suite failures {}",
                summary.total_tests(),
                summary.passed,
                summary.failed,
                summary.disabled,
                summary.suite_failures,
            ),
        );
    }
}
