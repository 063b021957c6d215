//! Shared helpers for the whisker integration tests.

#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;
use whisker::{Context, MemorySink, RunConfig};

/// A suite context whose output is captured in memory.
pub fn capture() -> (Rc<MemorySink>, Context) {
    capture_with(RunConfig::default().with_colors(false))
}

pub fn capture_with(config: RunConfig) -> (Rc<MemorySink>, Context) {
    let sink = Rc::new(MemorySink::new());
    let ctx = Context::with_sink("suite", config, sink.clone());
    (sink, ctx)
}

/// Ordered record of lifecycle events, shared between hooks and bodies.
#[derive(Default)]
pub struct Trace {
    events: RefCell<Vec<String>>,
}

impl Trace {
    pub fn push(&self, event: impl Into<String>) {
        self.events.borrow_mut().push(event.into());
    }

    pub fn events(&self) -> Vec<String> {
        self.events.borrow().clone()
    }

    pub fn count(&self, event: &str) -> usize {
        self.events.borrow().iter().filter(|e| *e == event).count()
    }
}
