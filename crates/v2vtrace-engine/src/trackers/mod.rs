//! Stateful extractors fed one line at a time by the parse context.

pub mod calls;
pub mod components;
pub mod errors;
pub mod file_copy;
pub mod guest;
pub mod hivex;
pub mod nbdkit;
pub mod stages;

use crate::trace::TraceEvent;
use v2vtrace_types::LineCategory;

/// A preprocessed line as seen by the trackers.
#[derive(Debug, Clone, Copy)]
pub struct LineView<'a> {
    /// Absolute 0-based line number.
    pub number: usize,
    /// Line with surrounding whitespace removed.
    pub text: &'a str,
    /// Line as produced by the preprocessor, leading indentation intact.
    pub raw: &'a str,
    pub category: LineCategory,
    /// Parsed trace record for `libguestfs: trace:` lines.
    pub trace: Option<&'a TraceEvent>,
}

impl<'a> LineView<'a> {
    pub fn new(number: usize, raw: &'a str, category: LineCategory, trace: Option<&'a TraceEvent>) -> Self {
        Self {
            number,
            text: raw.trim(),
            raw,
            category,
            trace,
        }
    }

    pub fn is_indented(&self) -> bool {
        self.raw.starts_with([' ', '\t'])
    }
}

/// Common interface of every line-driven extractor.
pub trait Tracker {
    fn observe(&mut self, line: &LineView<'_>);
}
