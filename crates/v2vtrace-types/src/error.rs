use std::fmt;

/// Result type for v2vtrace-types operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur in the types layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Name does not denote a known tool identity
    UnknownTool(String),

    /// Name does not denote a line category
    UnknownCategory(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::UnknownTool(name) => write!(f, "Unknown tool: {}", name),
            Error::UnknownCategory(name) => write!(f, "Unknown line category: {}", name),
        }
    }
}

impl std::error::Error for Error {}
