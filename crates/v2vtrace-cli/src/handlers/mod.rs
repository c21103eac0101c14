pub mod categories;
pub mod errors;
pub mod parse;
pub mod summary;

use crate::input::{collect_inputs, read_log};
use anyhow::Result;
use serde::Serialize;
use std::path::PathBuf;
use v2vtrace_engine::parse_log_with;
use v2vtrace_types::{ParseOptions, ParseOutput};

/// A parsed input file
pub struct ParsedLog {
    pub label: String,
    pub output: ParseOutput,
}

pub fn parse_inputs(paths: &[PathBuf], options: &ParseOptions) -> Result<Vec<ParsedLog>> {
    let files = collect_inputs(paths)?;

    let mut parsed = Vec::with_capacity(files.len());
    for path in files {
        let text = read_log(&path)?;
        let output = parse_log_with(&text, options);
        tracing::info!(
            path = %path.display(),
            runs = output.tool_runs.len(),
            lines = output.total_lines,
            "parsed log"
        );
        parsed.push(ParsedLog {
            label: path.display().to_string(),
            output,
        });
    }
    Ok(parsed)
}

/// One JSON document per file; compact documents go one per line.
pub(crate) fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    let text = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{}", text);
    Ok(())
}
