//! Setup and cleanup hook lists.

use crate::context::Context;
use crate::errors::{panic_message, WhiskerError};
use std::panic::{self, AssertUnwindSafe};

pub type Hook<'a> = Box<dyn FnMut() + 'a>;

#[derive(Default)]
pub struct Hooks<'a> {
    setup: Vec<Hook<'a>>,
    cleanup: Vec<Hook<'a>>,
}

impl<'a> Hooks<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_setup(&mut self, hook: impl FnMut() + 'a) {
        self.setup.push(Box::new(hook));
    }

    pub fn add_cleanup(&mut self, hook: impl FnMut() + 'a) {
        self.cleanup.push(Box::new(hook));
    }

    /// Run every setup hook in registration order. A panic propagates.
    pub fn run_setup(&mut self) {
        for hook in self.setup.iter_mut() {
            hook();
        }
    }

    /// Arm the cleanup hooks for `test`. They run when the returned guard
    /// drops, so arm before running setup to cover a failing setup hook too.
    pub fn arm<'h>(&'h mut self, ctx: &'h Context, test: &'h str) -> CleanupGuard<'h, 'a> {
        CleanupGuard {
            hooks: self,
            ctx,
            test,
        }
    }
}

/// Runs the cleanup hooks exactly once when dropped, including while a setup
/// hook or the test body is unwinding.
///
/// Each hook runs under `catch_unwind`: a panicking hook is recorded on the
/// test's context and the remaining hooks still run.
pub struct CleanupGuard<'h, 'a> {
    hooks: &'h mut Hooks<'a>,
    ctx: &'h Context,
    test: &'h str,
}

impl CleanupGuard<'_, '_> {
    pub fn run_setup(&mut self) {
        self.hooks.run_setup();
    }
}

impl Drop for CleanupGuard<'_, '_> {
    fn drop(&mut self) {
        for (index, hook) in self.hooks.cleanup.iter_mut().enumerate() {
            if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| hook())) {
                self.ctx.error(WhiskerError::CleanupPanicked {
                    test: self.test.to_string(),
                    index,
                    message: panic_message(&*payload),
                });
            }
        }
    }
}
