use crate::config::VerifyScope;
use crate::context::Context;
use crate::errors::Phase;
use crate::hooks::Hooks;
use crate::mock::{Mock, MockRegistry};
use crate::record::{TestBody, TestRecord};

pub type ScopedBody<'a> = Box<dyn FnOnce(&Context) + 'a>;

/// Organizer that runs every test in its own named scope.
///
/// A failure in one test is attributed to that test and does not stop the
/// tests after it. Cleanup hooks run after every executed test, whether it
/// passed or not.
pub struct ScopedOrganizer<'a> {
    ctx: &'a Context,
    only: Option<TestRecord<ScopedBody<'a>>>,
    mocks: MockRegistry<'a>,
    hooks: Hooks<'a>,
    tests: Vec<TestRecord<ScopedBody<'a>>>,
}

impl<'a> ScopedOrganizer<'a> {
    pub fn new(ctx: &'a Context) -> Self {
        Self {
            ctx,
            only: None,
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

    /// Add some work to be done after each test.
    pub fn cleanup(&mut self, hook: impl FnMut() + 'a) {
        self.hooks.add_cleanup(hook);
    }

    pub fn it(&mut self, name: impl Into<String>, body: impl FnOnce(&Context) + 'a) {
        self.tests.push(TestRecord::enabled(name, Box::new(body) as ScopedBody<'a>));
    }

    /// Disable a test by adding `n` in front of `it`.
    pub fn nit(&mut self, name: impl Into<String>, _body: impl FnOnce(&Context) + 'a) {
        self.tests.push(TestRecord::disabled(name));
    }

    /// Run only this test. A later call replaces an earlier one.
    pub fn only(&mut self, name: impl Into<String>, body: impl FnOnce(&Context) + 'a) {
        let record = TestRecord::enabled(name, Box::new(body) as ScopedBody<'a>);
        if let Some(previous) = self.only.replace(record) {
            if self.ctx.config().warn_on_only_override {
                let current = self.only.as_ref().map_or("", |r| r.name());
                self.ctx.warn(&format!(
                    "only override '{}' replaced by '{}'",
                    previous.name(),
                    current
                ));
            }
        }
    }

    pub fn len(&self) -> usize {
        self.tests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tests.is_empty()
    }

    /// Run the `only` test if one was set, otherwise every test in order.
    pub fn run(self) {
        let ScopedOrganizer {
            ctx,
            only,
            mocks,
            hooks,
            tests,
        } = self;
        let mut runner = Runner { ctx, mocks, hooks };

        if let Some(record) = only {
            runner.run_test(record);
            return;
        }

        for record in tests {
            runner.run_test(record);
        }
    }

    pub fn meow(self) {
        self.ctx.log(&format!(
            "Meow! Whisker is on the case! Running {} tests now!",
            self.tests.len()
        ));
        self.run();
    }
}

struct Runner<'a> {
    ctx: &'a Context,
    mocks: MockRegistry<'a>,
    hooks: Hooks<'a>,
}

impl<'a> Runner<'a> {
    fn run_test(&mut self, record: TestRecord<ScopedBody<'a>>) {
        let (name, body) = record.into_parts();
        let TestBody::Enabled(body) = body else {
            self.ctx.disabled(&name);
            return;
        };

        let suite = self.ctx;
        let mocks = &self.mocks;
        let hooks = &mut self.hooks;

        suite.run(&name, |t| {
            t.set_phase(Phase::Reset);
            mocks.reset_all();

            let mut armed = hooks.arm(t, &name);
            t.set_phase(Phase::Setup);
            armed.run_setup();

            t.set_phase(Phase::Body);
            body(t);

            t.set_phase(Phase::Verify);
            let verify_ctx = match suite.config().verify_scope {
                VerifyScope::Suite => suite,
                VerifyScope::Test => t,
            };
            for failure in mocks.verify_all(&name) {
                verify_ctx.error(failure);
            }
        });
    }
}
