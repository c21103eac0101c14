use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorLevel {
    Error,
    Warning,
}

impl fmt::Display for ErrorLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorLevel::Error => write!(f, "error"),
            ErrorLevel::Warning => write!(f, "warning"),
        }
    }
}

/// An error or warning line reported by one of the toolchain's subsystems
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct V2VError {
    pub level: ErrorLevel,
    /// Subsystem that printed the line (`virt-v2v`, `libguestfs`, `nbdkit`, ... or `unknown`)
    pub source: String,
    pub message: String,
    pub line: usize,
}

impl V2VError {
    pub fn is_error(&self) -> bool {
        self.level == ErrorLevel::Error
    }
}
