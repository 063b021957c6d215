//! Output sinks for status lines.
//!
//! Everything the organizer and its contexts print goes through a [`Sink`].
//! [`TerminalSink`] colors lines on stderr; [`MemorySink`] collects them for
//! tests or programmatic capture.

use std::cell::RefCell;
use std::io::Write;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

/// Severity of a status line, used to pick a color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Pass,
    Fail,
    Warn,
    Skip,
}

impl Level {
    fn color(&self) -> Option<Color> {
        match self {
            Level::Info => None,
            Level::Pass => Some(Color::Green),
            Level::Fail => Some(Color::Red),
            Level::Warn | Level::Skip => Some(Color::Yellow),
        }
    }
}

/// Anything that can receive formatted status lines.
pub trait Sink {
    fn emit(&self, level: Level, text: &str);
}

/// TerminalSink: writes colored lines to stderr.
pub struct TerminalSink {
    choice: ColorChoice,
}

impl TerminalSink {
    pub fn new(use_colors: bool) -> Self {
        let choice = if use_colors {
            ColorChoice::Auto
        } else {
            ColorChoice::Never
        };
        Self { choice }
    }
}

impl Sink for TerminalSink {
    fn emit(&self, level: Level, text: &str) {
        let mut stderr = StandardStream::stderr(self.choice);
        if let Some(color) = level.color() {
            let _ = stderr.set_color(ColorSpec::new().set_fg(Some(color)));
        }
        let _ = writeln!(stderr, "{}", text);
        let _ = stderr.reset();
    }
}

/// MemorySink: collects lines in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    lines: RefCell<Vec<String>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.borrow().clone()
    }

    /// True if any captured line contains `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        self.lines.borrow().iter().any(|line| line.contains(needle))
    }

    /// Index of the first captured line containing `needle`.
    pub fn position(&self, needle: &str) -> Option<usize> {
        self.lines.borrow().iter().position(|line| line.contains(needle))
    }
}

impl Sink for MemorySink {
    fn emit(&self, _level: Level, text: &str) {
        self.lines.borrow_mut().push(text.to_string());
    }
}
