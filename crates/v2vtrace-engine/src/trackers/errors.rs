use super::{LineView, Tracker};
use crate::detect::{attribute_source, extract_message};
use v2vtrace_types::{ErrorLevel, LineCategory, V2VError};

/// Records every line the classifier labelled as a warning or an error.
#[derive(Debug, Default)]
pub struct ErrorTracker {
    errors: Vec<V2VError>,
}

impl ErrorTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_error(&self) -> bool {
        self.errors.iter().any(V2VError::is_error)
    }

    pub fn finish(self) -> Vec<V2VError> {
        self.errors
    }
}

impl Tracker for ErrorTracker {
    fn observe(&mut self, line: &LineView<'_>) {
        let level = match line.category {
            LineCategory::Error => ErrorLevel::Error,
            LineCategory::Warning => ErrorLevel::Warning,
            _ => return,
        };
        self.errors.push(V2VError {
            level,
            source: attribute_source(line.text).to_string(),
            message: extract_message(line.text),
            line: line.number,
        });
    }
}
