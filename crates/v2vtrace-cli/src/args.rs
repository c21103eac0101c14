use crate::types::{ColorMode, LogLevel, OutputFormat};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "v2vtrace")]
#[command(about = "Structured analysis of virt-v2v conversion logs", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Config file (defaults to $V2VTRACE_CONFIG, then the user config directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format for summary, errors and categories (overrides the config file)
    #[arg(long, global = true)]
    pub format: Option<OutputFormat>,

    /// Color plain output (overrides the config file)
    #[arg(long, global = true)]
    pub color: Option<ColorMode>,

    #[arg(long, default_value = "warn", global = true)]
    pub log_level: LogLevel,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Emit the full parse result of each log as JSON
    Parse {
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        #[arg(long)]
        pretty: bool,
    },

    /// Per-run overview: tool, status, stages, guest, disks
    Summary {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },

    /// Errors and warnings found in each run
    Errors {
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Leave warnings out
        #[arg(long)]
        errors_only: bool,
    },

    /// Line counts per category for each run
    Categories {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
}
