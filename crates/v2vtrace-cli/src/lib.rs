// NOTE: v2vtrace CLI layering
//
// The engine is a pure function over an in-memory buffer, so everything fallible lives here:
// - input.rs resolves paths (files or walked directories) and reads them
// - config.rs resolves and loads config.toml into ParseOptions + output preferences
// - handlers/ run the engine once per file and hand results to render.rs
//
// Rendering returns Strings instead of printing so that views can be snapshot-tested without
// spawning the binary.

mod args;
mod commands;
pub mod config;
pub mod error;
mod handlers;
pub mod input;
pub mod logging;
pub mod render;
pub mod types;

pub use args::{Cli, Commands};
pub use commands::run;
pub use error::{Error, Result};
