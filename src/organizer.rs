//! Test-run coordinators.
//!
//! Both organizers collect setup hooks, mock references, and test records
//! during registration, then run them in one consuming call:
//!
//! - [`Organizer`] runs tests one after another directly in the suite
//!   context. A panicking test ends the whole run.
//! - [`ScopedOrganizer`] runs each test in its own named scope, adds cleanup
//!   hooks and an `only` override, and hands each body its scope's context.
//!
//! Around every executed test: mocks are reset, setup hooks run, the body
//! runs, and mocks are verified. Disabled tests are reported and nothing else
//! happens for them.

pub mod scoped;
pub mod sequential;

pub use scoped::ScopedOrganizer;
pub use sequential::Organizer;

pub(crate) fn running_line(name: &str) -> String {
    format!("==== {} ====", name)
}
