//! Mock capability and the registry the organizers keep.
//!
//! The organizer never looks inside a mock. It only needs two things from it:
//! clear all expectations and recorded calls ([`Mock::reset`]) and check that
//! every expected interaction happened ([`Mock::verify`]). Mocks are shared
//! between the registry and test bodies, so both methods take `&self`.

use crate::errors::{MockFailure, WhiskerError};
use std::cell::RefCell;

pub trait Mock {
    /// Name used in verification failures.
    fn name(&self) -> &str {
        "mock"
    }

    /// Forget all expectations and recorded calls.
    fn reset(&self);

    /// Check that all expected interactions occurred.
    fn verify(&self) -> Result<(), MockFailure>;
}

/// Ordered references to the mocks checked around every test.
pub struct MockRegistry<'a> {
    mocks: Vec<&'a dyn Mock>,
}

impl<'a> MockRegistry<'a> {
    pub fn new() -> Self {
        Self { mocks: Vec::new() }
    }

    /// Registering the same mock twice resets and verifies it twice.
    pub fn register(&mut self, mock: &'a dyn Mock) {
        self.mocks.push(mock);
    }

    pub fn len(&self) -> usize {
        self.mocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mocks.is_empty()
    }

    pub fn reset_all(&self) {
        for mock in &self.mocks {
            mock.reset();
        }
    }

    /// Verify every mock in registration order, collecting one error per
    /// failing mock.
    pub fn verify_all(&self, test: &str) -> Vec<WhiskerError> {
        self.mocks
            .iter()
            .filter_map(|mock| mock.verify().err())
            .map(|failure| WhiskerError::Verification {
                test: test.to_string(),
                failure,
            })
            .collect()
    }
}

impl Default for MockRegistry<'_> {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone)]
struct Expectation {
    method: String,
    /// `None` means at least once.
    times: Option<usize>,
}

#[derive(Debug, Default)]
struct CallLog {
    expected: Vec<Expectation>,
    calls: Vec<String>,
}

/// A call-counting mock.
///
/// ```
/// use whisker::mock::{CallMock, Mock};
///
/// let store = CallMock::new("store");
/// store.expect_times("save", 1);
/// store.call("save");
/// assert!(store.verify().is_ok());
/// ```
#[derive(Debug)]
pub struct CallMock {
    name: String,
    log: RefCell<CallLog>,
}

impl CallMock {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            log: RefCell::new(CallLog::default()),
        }
    }

    /// Expect `method` to be called at least once.
    pub fn expect(&self, method: &str) -> &Self {
        self.push_expectation(method, None)
    }

    /// Expect `method` to be called exactly `times` times.
    pub fn expect_times(&self, method: &str, times: usize) -> &Self {
        self.push_expectation(method, Some(times))
    }

    fn push_expectation(&self, method: &str, times: Option<usize>) -> &Self {
        self.log.borrow_mut().expected.push(Expectation {
            method: method.to_string(),
            times,
        });
        self
    }

    /// Record a call to `method`.
    pub fn call(&self, method: &str) {
        self.log.borrow_mut().calls.push(method.to_string());
    }

    /// Calls recorded since the last reset, in order.
    pub fn calls(&self) -> Vec<String> {
        self.log.borrow().calls.clone()
    }

    pub fn expectation_count(&self) -> usize {
        self.log.borrow().expected.len()
    }

    fn count(&self, method: &str) -> usize {
        self.log
            .borrow()
            .calls
            .iter()
            .filter(|call| *call == method)
            .count()
    }
}

impl Mock for CallMock {
    fn name(&self) -> &str {
        &self.name
    }

    fn reset(&self) {
        let mut log = self.log.borrow_mut();
        log.expected.clear();
        log.calls.clear();
    }

    fn verify(&self) -> Result<(), MockFailure> {
        let log = self.log.borrow();
        let mut problems = Vec::new();

        for expectation in &log.expected {
            let actual = self.count(&expectation.method);
            match expectation.times {
                Some(times) if actual != times => problems.push(format!(
                    "expected '{}' {} time(s), got {}",
                    expectation.method, times, actual
                )),
                None if actual == 0 => problems.push(format!(
                    "expected '{}' to be called, it never was",
                    expectation.method
                )),
                _ => {}
            }
        }

        let mut unexpected: Vec<&str> = Vec::new();
        for call in &log.calls {
            let known = log.expected.iter().any(|e| &e.method == call);
            if !known && !unexpected.contains(&call.as_str()) {
                unexpected.push(call);
            }
        }
        for call in unexpected {
            problems.push(format!("unexpected call to '{}'", call));
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(MockFailure::new(self.name.clone(), problems))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_count_is_enforced() {
        let db = CallMock::new("db");
        db.expect_times("foo", 1);
        assert!(db.verify().is_err());
        db.call("foo");
        assert!(db.verify().is_ok());
        db.call("foo");
        let failure = db.verify().unwrap_err();
        assert_eq!(failure.problems, vec!["expected 'foo' 1 time(s), got 2"]);
    }

    #[test]
    fn unexpected_calls_fail_verification() {
        let db = CallMock::new("db");
        db.call("drop_table");
        let failure = db.verify().unwrap_err();
        assert_eq!(failure.mock, "db");
        assert_eq!(failure.problems, vec!["unexpected call to 'drop_table'"]);
    }

    #[test]
    fn reset_clears_expectations_and_calls() {
        let db = CallMock::new("db");
        db.expect("foo").expect("bar");
        db.call("baz");
        db.reset();
        assert_eq!(db.expectation_count(), 0);
        assert!(db.calls().is_empty());
        assert!(db.verify().is_ok());
    }

    #[test]
    fn registry_verifies_in_registration_order() {
        let first = CallMock::new("first");
        let second = CallMock::new("second");
        first.expect("a");
        second.expect("b");

        let mut registry = MockRegistry::new();
        registry.register(&first);
        registry.register(&second);

        let errors = registry.verify_all("t");
        assert_eq!(errors.len(), 2);
        match (&errors[0], &errors[1]) {
            (
                WhiskerError::Verification { failure: a, .. },
                WhiskerError::Verification { failure: b, .. },
            ) => {
                assert_eq!(a.mock, "first");
                assert_eq!(b.mock, "second");
            }
            other => panic!("unexpected errors: {other:?}"),
        }

        registry.reset_all();
        assert!(registry.verify_all("t").is_empty());
    }
}
