//! Whisker: a lightweight behavior-driven test organizer.
//!
//! Declare named tests, setup and cleanup hooks, and mocks to verify, then run
//! them with consistent isolation and reporting.
//!
//! ```
//! use std::rc::Rc;
//! use whisker::{CallMock, Context, MemorySink, RunConfig, ScopedOrganizer};
//!
//! let sink = Rc::new(MemorySink::new());
//! let ctx = Context::with_sink("store", RunConfig::default(), sink.clone());
//! let db = CallMock::new("db");
//!
//! let mut suite = ScopedOrganizer::new(&ctx);
//! suite.check_mock(&db);
//! suite.setup(|| {
//!     db.expect_times("save", 1);
//! });
//! suite.it("saves once", |_t| db.call("save"));
//! suite.nit("saves twice", |_t| {});
//! suite.meow();
//!
//! let report = ctx.finish();
//! assert!(!report.summary.has_failures());
//! assert!(sink.contains("==== DISABLED: saves twice ===="));
//! ```

pub mod config;
pub mod context;
pub mod errors;
pub mod hooks;
pub mod mock;
pub mod organizer;
pub mod output;
pub mod record;
pub mod report;

pub use config::{RunConfig, VerifyScope};
pub use context::Context;
pub use errors::{MockFailure, Phase, WhiskerError};
pub use mock::{CallMock, Mock};
pub use organizer::{Organizer, ScopedOrganizer};
pub use output::{Level, MemorySink, Sink, TerminalSink};
pub use report::{Outcome, Report, Status, Summary};
