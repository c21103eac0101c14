//! Partition normalized lines into per-tool-run sections.

use regex::Regex;
use std::sync::LazyLock;
use v2vtrace_types::ToolKind;

use crate::preprocess::LogLine;

/// Example: "Building command: virt-v2v [-i libvirt ...]" or "Building command:virt-customize[-a d]"
static INVOCATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Building command:\s?([A-Za-z0-9_.+-]+)(?:\s*\[(.*)\])?").unwrap()
});

/// Base token shared by every tool of the toolchain
const BASE_TOKEN: &str = "virt-v2v";

/// Map an invoked program name to a tool identity; `None` for non-run markers
pub fn classify_tool(name: &str) -> Option<ToolKind> {
    match name {
        "virt-v2v" => Some(ToolKind::VirtV2v),
        "virt-v2v-in-place" => Some(ToolKind::InPlace),
        "virt-v2v-inspector" => Some(ToolKind::Inspector),
        "virt-customize" | "virt-v2v-customize" => Some(ToolKind::Customize),
        _ if name.contains("monitor") => None,
        _ if name.contains(BASE_TOKEN) => Some(ToolKind::VirtV2v),
        _ => None,
    }
}

/// Accepted invocation marker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Boundary {
    pub tool: ToolKind,
    pub args: String,
    pub line: usize,
}

/// Contiguous range of lines fed through one parse context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub tool: ToolKind,
    pub args: String,
    /// Inclusive range of absolute line numbers
    pub start: usize,
    pub end: usize,
    pub invocation_line: Option<usize>,
}

pub fn parse_invocation(line: &str) -> Option<(ToolKind, String)> {
    let caps = INVOCATION.captures(line)?;
    let tool = classify_tool(caps.get(1)?.as_str())?;
    let args = caps.get(2).map(|m| m.as_str().to_string()).unwrap_or_default();
    Some((tool, args))
}

pub fn find_boundaries(lines: &[LogLine]) -> Vec<Boundary> {
    lines
        .iter()
        .enumerate()
        .filter(|(_, line)| line.text.contains("Building command:"))
        .filter_map(|(idx, line)| {
            parse_invocation(&line.text).map(|(tool, args)| Boundary {
                tool,
                args,
                line: idx,
            })
        })
        .collect()
}

/// Split lines into sections, one per accepted invocation marker.
///
/// Lines before the first marker belong to the first section. Without any marker the whole
/// input is one implicit section whose tool is guessed from its first `probe_lines` lines.
pub fn segment(lines: &[LogLine], probe_lines: usize) -> Vec<Section> {
    let last = lines.len().saturating_sub(1);
    let boundaries = find_boundaries(lines);

    if boundaries.is_empty() {
        return vec![Section {
            tool: guess_tool(lines, probe_lines),
            args: String::new(),
            start: 0,
            end: last,
            invocation_line: None,
        }];
    }

    boundaries
        .iter()
        .enumerate()
        .map(|(i, boundary)| {
            let start = if i == 0 { 0 } else { boundary.line };
            let end = boundaries
                .get(i + 1)
                .map(|next| next.line - 1)
                .unwrap_or(last);
            Section {
                tool: boundary.tool,
                args: boundary.args.clone(),
                start,
                end,
                invocation_line: Some(boundary.line),
            }
        })
        .collect()
}

fn guess_tool(lines: &[LogLine], probe_lines: usize) -> ToolKind {
    lines
        .iter()
        .take(probe_lines)
        .flat_map(|line| line.text.split(is_token_separator))
        .find_map(classify_tool)
        .unwrap_or_default()
}

fn is_token_separator(c: char) -> bool {
    c.is_whitespace()
        || matches!(c, ':' | '[' | ']' | '(' | ')' | '\'' | '"' | ',' | '=' | '/')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preprocess::preprocess;

    #[test]
    fn test_classify_tool_names() {
        assert_eq!(classify_tool("virt-v2v"), Some(ToolKind::VirtV2v));
        assert_eq!(classify_tool("virt-v2v-in-place"), Some(ToolKind::InPlace));
        assert_eq!(classify_tool("virt-v2v-inspector"), Some(ToolKind::Inspector));
        assert_eq!(classify_tool("virt-customize"), Some(ToolKind::Customize));
        assert_eq!(classify_tool("virt-v2v-monitor"), None);
        assert_eq!(classify_tool("virt-v2v-wrapper"), Some(ToolKind::VirtV2v));
        assert_eq!(classify_tool("qemu-img"), None);
    }

    #[test]
    fn test_parse_invocation_shapes() {
        assert_eq!(
            parse_invocation("Building command: virt-v2v [-i libvirt -o local]"),
            Some((ToolKind::VirtV2v, "-i libvirt -o local".to_string()))
        );
        assert_eq!(
            parse_invocation("Building command:virt-customize[-a /d.img]"),
            Some((ToolKind::Customize, "-a /d.img".to_string()))
        );
        assert_eq!(parse_invocation("Building command: virt-v2v-monitor [x]"), None);
    }

    #[test]
    fn test_sections_cover_all_lines() {
        let lines = preprocess(
            "preamble\n\
             Building command: virt-v2v-in-place [-v]\n\
             a\n\
             Building command: virt-customize [-a x]\n\
             b\n\
             c",
        );
        let sections = segment(&lines, 20);
        assert_eq!(sections.len(), 2);
        assert_eq!((sections[0].start, sections[0].end), (0, 2));
        assert_eq!(sections[0].invocation_line, Some(1));
        assert_eq!(sections[0].tool, ToolKind::InPlace);
        assert_eq!((sections[1].start, sections[1].end), (3, 5));
        assert_eq!(sections[1].tool, ToolKind::Customize);
        assert_eq!(sections[1].args, "-a x");
    }

    #[test]
    fn test_monitor_marker_is_not_a_boundary() {
        let lines = preprocess("Building command: virt-v2v-monitor []\nx");
        let sections = segment(&lines, 20);
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].invocation_line, None);
    }

    #[test]
    fn test_implicit_run_guesses_tool() {
        let lines = preprocess("hello\n/usr/bin/virt-customize -a disk.img\n");
        let sections = segment(&lines, 20);
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].tool, ToolKind::Customize);
        assert_eq!((sections[0].start, sections[0].end), (0, 2));

        let lines = preprocess("nothing to see");
        assert_eq!(segment(&lines, 20)[0].tool, ToolKind::VirtV2v);
    }

    #[test]
    fn test_implicit_probe_depth_is_bounded() {
        let mut text = "x\n".repeat(25);
        text.push_str("virt-v2v-inspector");
        let lines = preprocess(&text);
        assert_eq!(segment(&lines, 20)[0].tool, ToolKind::VirtV2v);
        assert_eq!(segment(&lines, 30)[0].tool, ToolKind::Inspector);
    }
}
