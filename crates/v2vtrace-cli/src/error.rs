use std::fmt;
use std::path::PathBuf;

/// Result type for v2vtrace CLI operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types raised outside the (infallible) engine
#[derive(Debug)]
pub enum Error {
    /// Reading an input or config file failed
    Io { path: PathBuf, source: std::io::Error },

    /// Walking an input directory failed
    Walk(walkdir::Error),

    /// Configuration error
    Config(String),

    /// No log file found under the given paths
    NoInput(String),

    /// JSON serialization failed
    Json(serde_json::Error),
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io { path, source } => write!(f, "IO error on {}: {}", path.display(), source),
            Error::Walk(err) => write!(f, "Directory walk error: {}", err),
            Error::Config(msg) => write!(f, "Configuration error: {}", msg),
            Error::NoInput(msg) => write!(f, "No log files found: {}", msg),
            Error::Json(err) => write!(f, "JSON error: {}", err),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io { source, .. } => Some(source),
            Error::Walk(err) => Some(err),
            Error::Json(err) => Some(err),
            Error::Config(_) | Error::NoInput(_) => None,
        }
    }
}

impl From<walkdir::Error> for Error {
    fn from(err: walkdir::Error) -> Self {
        Error::Walk(err)
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json(err)
    }
}
