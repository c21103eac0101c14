use crate::context::ParseContext;
use crate::preprocess::LogLine;
use crate::segment::Section;
use v2vtrace_types::{ParseOptions, ToolRun};

/// Run one section through a fresh context.
pub fn parse_section(lines: &[LogLine], section: &Section, options: &ParseOptions) -> ToolRun {
    let mut ctx = ParseContext::new(options);
    let end = section.end.min(lines.len().saturating_sub(1));

    if let Some(slice) = lines.get(section.start..=end) {
        for (offset, line) in slice.iter().enumerate() {
            ctx.observe(section.start + offset, line);
        }
    }

    let run = ctx.finish(section);
    tracing::debug!(
        tool = %run.tool,
        start = run.start_line,
        end = run.end_line,
        stages = run.stages.len(),
        calls = run.api_calls.len(),
        status = %run.exit_status,
        "parsed tool run"
    );
    run
}
