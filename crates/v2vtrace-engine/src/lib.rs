// Engine crate - turns a raw virt-v2v console log into structured tool runs
// Pipeline: preprocess -> segment -> one ParseContext scan per section

pub mod classify;
pub mod context;
pub mod detect;
pub mod escape;
pub mod preprocess;
pub mod section;
pub mod segment;
pub mod trace;
pub mod trackers;

pub use classify::classify;
pub use preprocess::{LogLine, preprocess};
pub use segment::{Section, classify_tool, segment};

use std::panic::{AssertUnwindSafe, catch_unwind};
use v2vtrace_types::{ParseOptions, ParseOutput, ToolRun};

// Façade API - the CLI and tests go through these

/// Parse a complete log buffer with default options.
pub fn parse_log(text: &str) -> ParseOutput {
    parse_log_with(text, &ParseOptions::default())
}

/// Parse a complete log buffer.
///
/// Never panics: a section that fails is replaced by an empty run covering its lines, and a
/// failure of the whole pass yields an output with no runs.
pub fn parse_log_with(text: &str, options: &ParseOptions) -> ParseOutput {
    match catch_unwind(AssertUnwindSafe(|| parse_all(text, options))) {
        Ok(output) => output,
        Err(panic) => {
            tracing::error!(reason = panic_message(&*panic), "log parsing aborted");
            ParseOutput {
                tool_runs: Vec::new(),
                total_lines: text.split('\n').count(),
            }
        }
    }
}

fn parse_all(text: &str, options: &ParseOptions) -> ParseOutput {
    let lines = preprocess(text);
    let sections = segment(&lines, options.implicit_probe_lines);
    tracing::debug!(lines = lines.len(), sections = sections.len(), "segmented log");

    let tool_runs = sections
        .iter()
        .map(|section| parse_section_guarded(&lines, section, options))
        .collect();

    ParseOutput {
        tool_runs,
        total_lines: lines.len(),
    }
}

fn parse_section_guarded(lines: &[LogLine], section: &Section, options: &ParseOptions) -> ToolRun {
    catch_unwind(AssertUnwindSafe(|| section::parse_section(lines, section, options))).unwrap_or_else(
        |panic| {
            tracing::error!(
                tool = %section.tool,
                start = section.start,
                end = section.end,
                reason = panic_message(&*panic),
                "section parsing failed"
            );
            ToolRun::empty(
                section.tool,
                section.args.clone(),
                section.start,
                section.end,
                section.invocation_line,
            )
        },
    )
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> &str {
    panic
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| panic.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}
