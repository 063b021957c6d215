use crate::context::Context;
use crate::hooks::Hooks;
use crate::mock::{Mock, MockRegistry};
use crate::record::{TestBody, TestRecord};

pub type Body<'a> = Box<dyn FnOnce() + 'a>;

/// Sequential organizer: no per-test isolation.
///
/// ```
/// use std::cell::Cell;
/// use whisker::{Context, Organizer};
///
/// let ctx = Context::new("counter");
/// let counter = Cell::new(0);
/// let mut suite = Organizer::new(&ctx);
/// suite.setup(|| counter.set(counter.get() + 1));
/// suite.it("adds", || assert_eq!(counter.get(), 1));
/// suite.run();
/// assert!(!ctx.failed());
/// ```
pub struct Organizer<'a> {
    ctx: &'a Context,
    mocks: MockRegistry<'a>,
    hooks: Hooks<'a>,
    tests: Vec<TestRecord<Body<'a>>>,
}

impl<'a> Organizer<'a> {
    pub fn new(ctx: &'a Context) -> Self {
        Self {
            ctx,
            mocks: MockRegistry::new(),
            hooks: Hooks::new(),
            tests: Vec::new(),
        }
    }

    /// Track a mock; it is reset before and verified after every test.
    pub fn check_mock(&mut self, mock: &'a dyn Mock) {
        self.mocks.register(mock);
    }

    /// Add some work to be done before each test.
    pub fn setup(&mut self, hook: impl FnMut() + 'a) {
        self.hooks.add_setup(hook);
    }

    pub fn it(&mut self, name: impl Into<String>, body: impl FnOnce() + 'a) {
        self.tests.push(TestRecord::enabled(name, Box::new(body) as Body<'a>));
    }

    /// Disable a test by adding `n` in front of `it`. The name is still
    /// reported; the body is dropped without running.
    pub fn nit(&mut self, name: impl Into<String>, _body: impl FnOnce() + 'a) {
        self.tests.push(TestRecord::disabled(name));
    }

    pub fn len(&self) -> usize {
        self.tests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tests.is_empty()
    }

    /// Run every registered test in order.
    ///
    /// Mock verification failures are recorded on the suite context. A
    /// panicking setup hook or body propagates out of this call.
    pub fn run(self) {
        let Organizer {
            ctx,
            mocks,
            mut hooks,
            tests,
        } = self;

        for record in tests {
            let (name, body) = record.into_parts();
            let TestBody::Enabled(body) = body else {
                ctx.disabled(&name);
                continue;
            };

            ctx.log(&super::running_line(&name));
            mocks.reset_all();
            hooks.run_setup();
            body();
            for failure in mocks.verify_all(&name) {
                ctx.error(failure);
            }
        }
    }

    /// Same as [`run`](Self::run).
    pub fn meow(self) {
        self.run();
    }
}
