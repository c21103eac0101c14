//! Error and warning recognition with false-positive suppression.

use regex::Regex;
use std::sync::LazyLock;
use v2vtrace_types::ErrorLevel;

/// `get_backend_setting = NULL (error)`, `hivex_node_get_child = -1 (error)`
static ERROR_RETURN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:NULL|-\d+)\s*\(error\)\s*$").unwrap());

static WARNING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(?:^|[\s:])warning:").unwrap());

static ERROR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i:(?:^|[\s:])(?:error|fatal):)|\bERROR\b").unwrap());

/// `nbdkit: error: ...`, `libguestfs: warning: ...`, `nbdkit: vddk[1]: error: ...`
static LEVEL_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[\w.-]+(?:\[\d+\])?:(?:\s+[\w.-]+(?:\[\d+\])?:)?\s+(?i:error|warning|fatal):")
        .unwrap()
});

static MESSAGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(?:error|warning|fatal):\s*(.*)$").unwrap());

const SOURCES: &[&str] = &[
    "virt-v2v-in-place",
    "virt-v2v-inspector",
    "virt-customize",
    "virt-v2v",
    "libguestfs",
    "guestfsd",
    "nbdkit",
    "libnbd",
    "qemu",
    "libvirt",
    "supermin",
    "hivex",
];

/// Lines that look like failures but are routine.
pub fn is_false_positive(line: &str) -> bool {
    ERROR_RETURN.is_match(line) || line.starts_with("libnbd: debug:") || line.contains("No error")
}

/// Severity of a trimmed line, if any.
pub fn detect_level(line: &str) -> Option<ErrorLevel> {
    if is_false_positive(line) {
        return None;
    }
    if WARNING.is_match(line) {
        Some(ErrorLevel::Warning)
    } else if ERROR.is_match(line) {
        Some(ErrorLevel::Error)
    } else {
        None
    }
}

/// A subsystem line whose payload is an error or warning report.
pub fn is_level_line(line: &str) -> bool {
    LEVEL_LINE.is_match(line) && detect_level(line).is_some()
}

pub fn attribute_source(line: &str) -> &'static str {
    SOURCES
        .iter()
        .find(|source| line.starts_with(*source))
        .copied()
        .unwrap_or("unknown")
}

pub fn extract_message(line: &str) -> String {
    MESSAGE
        .captures(line)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|message| !message.is_empty())
        .unwrap_or_else(|| line.trim().to_string())
}
