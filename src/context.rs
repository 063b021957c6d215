//! The execution and reporting context.
//!
//! A [`Context`] plays the part a host test runner plays for a test function:
//! it takes status lines, records failures without aborting, opens named
//! isolated sub-scopes, and runs deferred actions when a scope ends.
//!
//! The root context is created once per suite. [`Context::run`] opens a child
//! scope named `<parent>/<name>`; a panic inside the child is caught and
//! recorded there, so sibling scopes keep running. A failing child marks every
//! ancestor failed.
//!
//! Dropping a context runs its remaining deferred actions. A root context that
//! is dropped while holding failures nobody looked at (through
//! [`Context::failed`], [`Context::failures`], [`Context::report`] or
//! [`Context::finish`]) panics, so the enclosing `#[test]` fails too.

use crate::config::RunConfig;
use crate::errors::{panic_message, Phase, WhiskerError};
use crate::output::{Level, Sink, TerminalSink};
use crate::report::{Outcome, Report};
use std::cell::{Cell, RefCell};
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;
use std::thread;

type Deferred = Box<dyn FnOnce()>;

pub struct Context {
    path: String,
    config: Rc<RunConfig>,
    sink: Rc<dyn Sink>,
    outcomes: Rc<RefCell<Vec<Outcome>>>,
    failures: RefCell<Vec<WhiskerError>>,
    child_failed: Cell<bool>,
    deferred: RefCell<Vec<Deferred>>,
    phase: Cell<Phase>,
    root: bool,
    /// Cleared whenever a failure is recorded, set when failures are read.
    acknowledged: Cell<bool>,
}

impl Context {
    /// Root context printing to stderr, configured from the environment.
    ///
    /// Falls back to the default configuration (with a warning) when the
    /// environment holds an invalid setting.
    pub fn new(name: impl Into<String>) -> Self {
        let (config, problem) = RunConfig::from_env_or_default();
        let sink = Rc::new(TerminalSink::new(config.use_colors));
        let ctx = Self::with_sink(name, config, sink);
        if let Some(problem) = problem {
            ctx.warn(&format!("ignoring environment configuration: {}", problem));
        }
        ctx
    }

    pub fn with_config(name: impl Into<String>, config: RunConfig) -> Self {
        let sink = Rc::new(TerminalSink::new(config.use_colors));
        Self::with_sink(name, config, sink)
    }

    pub fn with_sink(name: impl Into<String>, config: RunConfig, sink: Rc<dyn Sink>) -> Self {
        Self {
            path: name.into(),
            config: Rc::new(config),
            sink,
            outcomes: Rc::new(RefCell::new(Vec::new())),
            failures: RefCell::new(Vec::new()),
            child_failed: Cell::new(false),
            deferred: RefCell::new(Vec::new()),
            phase: Cell::new(Phase::Body),
            root: true,
            acknowledged: Cell::new(true),
        }
    }

    fn child(&self, path: String) -> Self {
        Self {
            path,
            config: Rc::clone(&self.config),
            sink: Rc::clone(&self.sink),
            outcomes: Rc::clone(&self.outcomes),
            failures: RefCell::new(Vec::new()),
            child_failed: Cell::new(false),
            deferred: RefCell::new(Vec::new()),
            phase: Cell::new(Phase::Body),
            root: false,
            acknowledged: Cell::new(true),
        }
    }

    /// Full name of this scope, e.g. `suite/adds`.
    pub fn name(&self) -> &str {
        &self.path
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    pub fn log(&self, line: &str) {
        self.sink.emit(Level::Info, line);
    }

    pub fn warn(&self, line: &str) {
        self.sink.emit(Level::Warn, &format!("WARNING: {}", line));
    }

    /// Record a failure on this scope and keep going. The failure is printed
    /// right away.
    pub fn error(&self, error: WhiskerError) {
        self.sink.emit(Level::Fail, &format!("    {}", error));
        self.failures.borrow_mut().push(error);
        self.acknowledged.set(false);
    }

    /// Record a plain failure message on this scope and keep going.
    pub fn fail(&self, message: impl Into<String>) {
        self.error(WhiskerError::Failed {
            scope: self.path.clone(),
            message: message.into(),
        });
    }

    /// True if this scope, or any scope opened from it, failed.
    pub fn failed(&self) -> bool {
        self.acknowledged.set(true);
        self.has_failures()
    }

    fn has_failures(&self) -> bool {
        !self.failures.borrow().is_empty() || self.child_failed.get()
    }

    /// Failures recorded directly on this scope.
    pub fn failures(&self) -> Vec<WhiskerError> {
        self.acknowledged.set(true);
        self.failures.borrow().clone()
    }

    /// Register an action to run when this scope ends. Actions run in
    /// reverse registration order.
    ///
    /// Actions outlive the borrow of the scope that registers them, so they
    /// must own what they touch. Share suite state through `Rc`.
    pub fn defer(&self, action: impl FnOnce() + 'static) {
        self.deferred.borrow_mut().push(Box::new(action));
    }

    pub(crate) fn set_phase(&self, phase: Phase) {
        self.phase.set(phase);
    }

    pub(crate) fn disabled(&self, name: &str) {
        self.sink
            .emit(Level::Skip, &format!("==== DISABLED: {} ====", name));
        self.outcomes.borrow_mut().push(Outcome::disabled(name));
    }

    /// Run `f` in a named, isolated child scope and report whether it passed.
    ///
    /// Scopes not selected by the configured filter are not run and count as
    /// passed.
    pub fn run<F>(&self, name: &str, f: F) -> bool
    where
        F: FnOnce(&Context),
    {
        let path = format!("{}/{}", self.path, name);
        if !self.config.selects(&path) {
            return true;
        }

        self.sink.emit(Level::Info, &format!("=== RUN   {}", path));
        let child = self.child(path);

        if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| f(&child))) {
            child.error(WhiskerError::Panicked {
                scope: child.path.clone(),
                phase: child.phase.get(),
                message: panic_message(&*payload),
            });
        }
        child.run_deferred();

        let failures = child.failures.take();
        let passed = failures.is_empty() && !child.child_failed.get();
        if passed {
            self.sink
                .emit(Level::Pass, &format!("--- PASS: {}", child.path));
            self.outcomes
                .borrow_mut()
                .push(Outcome::passed(child.path.clone()));
        } else {
            self.sink
                .emit(Level::Fail, &format!("--- FAIL: {}", child.path));
            self.outcomes
                .borrow_mut()
                .push(Outcome::failed(child.path.clone(), &failures));
            self.child_failed.set(true);
            self.acknowledged.set(false);
        }
        passed
    }

    fn run_deferred(&self) {
        loop {
            let Some(action) = self.deferred.borrow_mut().pop() else {
                break;
            };
            if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(action)) {
                self.error(WhiskerError::Panicked {
                    scope: self.path.clone(),
                    phase: Phase::Cleanup,
                    message: panic_message(&*payload),
                });
            }
        }
    }

    /// Snapshot of everything recorded so far.
    pub fn report(&self) -> Report {
        self.acknowledged.set(true);
        Report::new(self.outcomes.borrow().clone(), &self.failures.borrow())
    }

    /// End the root scope: run its deferred actions and return the report.
    pub fn finish(self) -> Report {
        self.run_deferred();
        self.report()
    }
}

impl Drop for Context {
    fn drop(&mut self) {
        self.run_deferred();
        if self.root && !self.acknowledged.get() && self.has_failures() && !thread::panicking() {
            panic!(
                "suite '{}' ended with failures that were never reported",
                self.path
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::MemorySink;

    fn capture() -> (Rc<MemorySink>, Context) {
        let sink = Rc::new(MemorySink::new());
        let ctx = Context::with_sink("suite", RunConfig::default(), sink.clone());
        (sink, ctx)
    }

    #[test]
    fn panicking_scope_does_not_stop_siblings() {
        let (sink, ctx) = capture();
        let first = ctx.run("boom", |_| panic!("kaboom"));
        let second = ctx.run("fine", |t| t.log("still here"));

        assert!(!first);
        assert!(second);
        assert!(ctx.failed());
        assert!(ctx.failures().is_empty());
        assert!(sink.contains("--- FAIL: suite/boom"));
        assert!(sink.contains("kaboom"));
        assert!(sink.contains("--- PASS: suite/fine"));

        let report = ctx.finish();
        assert!(report.outcome("suite/boom").unwrap().is_fail());
        assert!(report.outcome("suite/fine").unwrap().is_pass());
    }

    #[test]
    fn deferred_actions_run_lifo_even_after_panic() {
        let order = Rc::new(RefCell::new(Vec::new()));
        let (_sink, ctx) = capture();
        ctx.run("deferring", |t| {
            let first = Rc::clone(&order);
            t.defer(move || first.borrow_mut().push(1));
            let second = Rc::clone(&order);
            t.defer(move || second.borrow_mut().push(2));
            panic!("body failed");
        });
        assert_eq!(*order.borrow(), vec![2, 1]);
        assert!(ctx.failed());
    }

    #[test]
    fn explicit_fail_marks_scope_without_unwinding() {
        let (_sink, ctx) = capture();
        let reached = Cell::new(false);
        let passed = ctx.run("soft", |t| {
            t.fail("first problem");
            reached.set(true);
        });
        assert!(!passed);
        assert!(reached.get());
        assert!(ctx.failed());
    }

    #[test]
    fn nested_failure_propagates_to_ancestors() {
        let (_sink, ctx) = capture();
        let outer = ctx.run("outer", |t| {
            t.run("inner", |inner| inner.fail("deep"));
        });
        assert!(!outer);
        assert!(ctx.failed());
    }

    #[test]
    fn filtered_scopes_are_skipped() {
        let sink = Rc::new(MemorySink::new());
        let config = RunConfig::default().with_filter("wanted").unwrap();
        let ctx = Context::with_sink("suite", config, sink.clone());
        let ran = Cell::new(0);
        ctx.run("wanted", |_| ran.set(ran.get() + 1));
        ctx.run("other", |_| ran.set(ran.get() + 10));
        assert_eq!(ran.get(), 1);
        assert!(!sink.contains("suite/other"));
    }

    #[test]
    fn root_deferred_actions_run_on_finish() {
        let flag = Rc::new(Cell::new(false));
        let (_sink, ctx) = capture();
        let seen = Rc::clone(&flag);
        ctx.defer(move || seen.set(true));
        assert!(!flag.get());
        ctx.finish();
        assert!(flag.get());
    }

    #[test]
    fn root_deferred_actions_run_when_dropped() {
        let flag = Rc::new(Cell::new(false));
        {
            let (_sink, ctx) = capture();
            let seen = Rc::clone(&flag);
            ctx.defer(move || seen.set(true));
            ctx.run("quiet", |_| {});
        }
        assert!(flag.get());
    }

    #[test]
    fn root_errors_are_printed_when_recorded() {
        let (sink, ctx) = capture();
        ctx.fail("ledger mismatch");
        assert!(sink.contains("'suite' failed: ledger mismatch"));
        assert!(ctx.failed());
    }

    #[test]
    #[should_panic(expected = "never reported")]
    fn dropping_root_with_unread_failures_panics() {
        let (_sink, ctx) = capture();
        ctx.fail("nobody looks at this");
    }

    #[test]
    #[should_panic(expected = "never reported")]
    fn failures_recorded_after_a_check_still_count() {
        let (_sink, ctx) = capture();
        assert!(!ctx.failed());
        ctx.run("late", |t| t.fail("after the check"));
    }

    #[test]
    fn read_failures_drop_quietly() {
        let (_sink, ctx) = capture();
        ctx.run("broken", |t| t.fail("seen"));
        assert_eq!(ctx.report().summary.failed, 1);
    }
}
