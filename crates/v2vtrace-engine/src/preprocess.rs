//! Line normalization applied before segmentation.
//!
//! Three passes run on every raw line, each idempotent:
//! 1. strip a leading absolute timestamp (kept alongside the line)
//! 2. split lines carrying several `Building command:` markers
//! 3. split lines where a `libguestfs: trace:` record was fused onto other text

use chrono::{DateTime, FixedOffset, NaiveDateTime};
use regex::Regex;
use std::sync::LazyLock;

pub const INVOCATION_MARKER: &str = "Building command:";
pub const TRACE_MARKER: &str = "libguestfs: trace: ";

/// Example: "2024-03-05T10:11:12.345678Z " or "2024-03-05 10:11:12+0100 "
static TIMESTAMP_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{4}-\d{2}-\d{2}[T ]\d{2}:\d{2}:\d{2}(?:[.,]\d+)?(?:Z|[+-]\d{2}:?\d{2}))(?:\s|$)")
        .unwrap()
});

/// A normalized line and the timestamp stripped from its source line
#[derive(Debug, Clone, PartialEq)]
pub struct LogLine {
    pub text: String,
    pub timestamp: Option<DateTime<FixedOffset>>,
}

/// Normalize a complete log buffer into lines.
///
/// An empty buffer yields a single empty line so that every input maps to at least one line.
pub fn preprocess(input: &str) -> Vec<LogLine> {
    let mut lines = Vec::new();

    for raw in input.split('\n') {
        let raw = raw.strip_suffix('\r').unwrap_or(raw);
        let (timestamp, rest) = strip_timestamp(raw);

        for piece in split_invocations(rest) {
            for fragment in split_fused_traces(piece) {
                lines.push(LogLine {
                    text: fragment.to_string(),
                    timestamp,
                });
            }
        }
    }

    lines
}

/// Remove a leading timestamp token, returning the parsed instant when it is well-formed
pub fn strip_timestamp(line: &str) -> (Option<DateTime<FixedOffset>>, &str) {
    let Some(caps) = TIMESTAMP_PREFIX.captures(line) else {
        return (None, line);
    };
    let whole = caps.get(0).map_or(0, |m| m.end());
    let timestamp = caps.get(1).and_then(|m| parse_timestamp(m.as_str()));
    (timestamp, &line[whole..])
}

fn parse_timestamp(token: &str) -> Option<DateTime<FixedOffset>> {
    let mut normalized = token.replacen(' ', "T", 1).replace(',', ".");
    if let Ok(ts) = DateTime::parse_from_rfc3339(&normalized) {
        return Some(ts);
    }
    if let Ok(ts) = DateTime::parse_from_str(&normalized, "%Y-%m-%dT%H:%M:%S%.f%z") {
        return Some(ts);
    }
    // "Z" is not accepted by %z
    if let Some(stripped) = normalized.strip_suffix('Z') {
        normalized = stripped.to_string();
        return NaiveDateTime::parse_from_str(&normalized, "%Y-%m-%dT%H:%M:%S%.f")
            .ok()
            .map(|naive| naive.and_utc().fixed_offset());
    }
    None
}

/// Split a line holding more than one invocation marker into one line per marker.
///
/// A non-blank fragment before the first marker is kept as its own line.
pub fn split_invocations(line: &str) -> Vec<&str> {
    let starts: Vec<usize> = line
        .match_indices(INVOCATION_MARKER)
        .map(|(idx, _)| idx)
        .collect();

    if starts.len() <= 1 {
        return vec![line];
    }

    split_at_starts(line, &starts)
}

/// Split at every trace marker that does not begin the line.
///
/// Covers a trace record printed after a garbled prefix as well as two records fused together.
pub fn split_fused_traces(line: &str) -> Vec<&str> {
    let starts: Vec<usize> = line
        .match_indices(TRACE_MARKER)
        .map(|(idx, _)| idx)
        .filter(|idx| *idx > 0)
        .collect();

    if starts.is_empty() {
        return vec![line];
    }

    split_at_starts(line, &starts)
}

fn split_at_starts<'a>(line: &'a str, starts: &[usize]) -> Vec<&'a str> {
    let mut pieces = Vec::with_capacity(starts.len() + 1);

    let prefix = &line[..starts[0]];
    if !prefix.trim().is_empty() {
        pieces.push(prefix.trim_end());
    }

    for (i, start) in starts.iter().enumerate() {
        let end = starts.get(i + 1).copied().unwrap_or(line.len());
        pieces.push(line[*start..end].trim_end());
    }

    pieces
}
