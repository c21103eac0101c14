use crate::types::LogLevel;
use tracing_subscriber::{EnvFilter, fmt};

/// Initialise the tracing subscriber on stderr.
///
/// `RUST_LOG` takes precedence over `--log-level`. Calling this twice is harmless.
pub fn init(level: LogLevel) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("v2vtrace={level},v2vtrace_engine={level},warn")));

    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .try_init();
}
