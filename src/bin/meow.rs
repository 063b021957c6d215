//! Runs the bundled demonstration suite through the scoped organizer.
//! Usage: cargo run --bin meow -- [--filter <regex>] [--verify-scope suite|test] [--json]
//!
//! `WHISKER_FILTER` and `WHISKER_VERIFY_SCOPE` are read first; flags win.

use clap::{Parser, ValueEnum};
use std::cell::{Cell, RefCell};
use std::panic;
use std::process;
use std::rc::Rc;
use whisker::errors::print_error;
use whisker::{CallMock, Context, RunConfig, ScopedOrganizer, TerminalSink, VerifyScope};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ScopeArg {
    Suite,
    Test,
}

impl From<ScopeArg> for VerifyScope {
    fn from(arg: ScopeArg) -> Self {
        match arg {
            ScopeArg::Suite => VerifyScope::Suite,
            ScopeArg::Test => VerifyScope::Test,
        }
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "meow",
    version,
    about = "Run the whisker demonstration suite."
)]
struct MeowArgs {
    /// Run only tests whose full name matches this pattern.
    #[arg(short, long)]
    filter: Option<String>,

    /// Where mock verification failures are recorded [default: suite].
    #[arg(long, value_enum)]
    verify_scope: Option<ScopeArg>,

    /// Disable colored output.
    #[arg(long)]
    no_color: bool,

    /// Print the final report as JSON on stdout.
    #[arg(long)]
    json: bool,

    /// Add a deliberately failing test to show failure isolation.
    #[arg(long)]
    with_failure: bool,

    /// Add a test that leaves a payment expectation unmet.
    #[arg(long)]
    with_unmet_mock: bool,
}

fn main() {
    let args = MeowArgs::parse();
    // Caught panics are already reported as failing tests.
    panic::set_hook(Box::new(|_| {}));

    let (base, problem) = RunConfig::from_env_or_default();
    let use_colors = base.use_colors && !args.no_color;
    let mut config = base.with_colors(use_colors);
    if let Some(scope) = args.verify_scope {
        config = config.with_verify_scope(scope.into());
    }
    if let Some(pattern) = args.filter.as_deref() {
        config = match config.with_filter(pattern) {
            Ok(config) => config,
            Err(e) => {
                print_error(e);
                process::exit(2);
            }
        };
    }

    let sink = Rc::new(TerminalSink::new(config.use_colors));
    let ctx = Context::with_sink("cart", config, sink.clone());
    if let Some(problem) = problem {
        ctx.warn(&format!("ignoring environment configuration: {}", problem));
    }
    demo_suite(&ctx, &args);
    for failure in ctx.failures() {
        print_error(failure);
    }
    let report = ctx.finish();

    if args.json {
        match report.to_json() {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("failed to serialize report: {}", e);
                process::exit(2);
            }
        }
    } else {
        report.render(&*sink);
    }

    if report.summary.has_failures() {
        process::exit(1);
    }
}

/// A small shopping cart, its payment gateway mocked.
fn demo_suite(ctx: &Context, args: &MeowArgs) {
    let payments = CallMock::new("payments");
    let items: RefCell<Vec<u32>> = RefCell::new(Vec::new());
    let cleanups = Cell::new(0);
    let receipts = Rc::new(Cell::new(0));

    let mut suite = ScopedOrganizer::new(ctx);
    suite.check_mock(&payments);
    suite.setup(|| items.borrow_mut().clear());
    suite.setup(|| {
        items.borrow_mut().push(250);
    });
    suite.cleanup(|| cleanups.set(cleanups.get() + 1));

    suite.it("starts with the setup item", |t| {
        if items.borrow().len() != 1 {
            t.fail(format!("expected one item, found {}", items.borrow().len()));
        }
    });

    suite.it("charges once on checkout", |t| {
        payments.expect_times("charge", 1);
        let total: u32 = items.borrow().iter().sum();
        t.log(&format!("charging {}", total));
        payments.call("charge");
        let counter = Rc::clone(&receipts);
        t.defer(move || counter.set(counter.get() + 1));
    });

    if args.with_failure {
        suite.it("rejects an empty cart", |_t| {
            items.borrow_mut().clear();
            assert!(!items.borrow().is_empty(), "cart is empty");
        });
    }

    if args.with_unmet_mock {
        suite.it("issues a refund", |t| {
            payments.expect_times("refund", 1);
            t.log("refund queued for later");
        });
    }

    suite.nit("applies loyalty discounts", |_t| {});

    suite.it("counts cleanups so far", |t| {
        t.log(&format!("{} cleanup(s) before this test", cleanups.get()));
    });

    suite.meow();
    ctx.log(&format!(
        "cleanup hooks ran {} time(s), {} receipt(s) issued",
        cleanups.get(),
        receipts.get()
    ));
}
