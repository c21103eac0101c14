//! Testing infrastructure for v2vtrace tests.
//!
//! - `LogBuilder`: fluent construction of synthetic console logs
//! - `fixtures`: complete sample logs covering the supported tools
//! - `TestWorld`: isolated directory with log files and a config, for driving the CLI
//! - `assertions`: checks over the CLI's JSON output

pub mod assertions;
pub mod builder;
pub mod fixtures;
pub mod world;

pub use builder::LogBuilder;
pub use world::{CliResult, TestWorld};
