//! Line classification.
//!
//! Every line receives exactly one [`LineCategory`]. Rules are evaluated in order and the first
//! match wins; subsystem rules step aside for `error:`/`warning:` reports so those land in the
//! diagnostic categories instead.

use crate::detect::{detect_level, is_level_line};
use regex::Regex;
use std::sync::LazyLock;
use v2vtrace_types::{ErrorLevel, LineCategory};

/// `[    1.234567] Linux version ...`
static KERNEL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\[\s*\d+\.\d{6}\]").unwrap());

/// `[   5.3] Opening the source`
static STAGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\[\s*\d+(?:\.\d+)?\s*\]\s+\S").unwrap());

static QEMU: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^qemu[\w.-]*:").unwrap());

static MONITOR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[\w-]+ monitoring:").unwrap());

/// `virt-v2v: virt-v2v 2.4.0rhel=9,release=...`
static BANNER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^virt-[\w-]+: virt-[\w-]+ \d").unwrap());

static RUNNING: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^running [\w.-]+:").unwrap());

static STRUCTURED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:apiVersion|kind|metadata|spec):(?:\s|$)").unwrap());

struct Rule {
    category: LineCategory,
    matches: fn(&str) -> bool,
}

fn subsystem(line: &str, prefix: &str) -> bool {
    line.starts_with(prefix) && !is_level_line(line)
}

static RULES: &[Rule] = &[
    Rule {
        category: LineCategory::Kernel,
        matches: |l| KERNEL.is_match(l),
    },
    Rule {
        category: LineCategory::Stage,
        matches: |l| STAGE.is_match(l),
    },
    Rule {
        category: LineCategory::Libguestfs,
        matches: |l| subsystem(l, "libguestfs:"),
    },
    Rule {
        category: LineCategory::Guestfsd,
        matches: |l| subsystem(l, "guestfsd:"),
    },
    Rule {
        category: LineCategory::Nbdkit,
        matches: |l| subsystem(l, "nbdkit:"),
    },
    Rule {
        category: LineCategory::Libnbd,
        matches: |l| subsystem(l, "libnbd:"),
    },
    Rule {
        category: LineCategory::Qemu,
        matches: |l| QEMU.is_match(l) && !is_level_line(l),
    },
    Rule {
        category: LineCategory::Supermin,
        matches: |l| subsystem(l, "supermin:"),
    },
    Rule {
        category: LineCategory::Libvirt,
        matches: |l| subsystem(l, "libvirt:"),
    },
    Rule {
        category: LineCategory::Hivex,
        matches: |l| subsystem(l, "hivex:"),
    },
    Rule {
        category: LineCategory::Monitor,
        matches: |l| MONITOR.is_match(l),
    },
    Rule {
        category: LineCategory::Info,
        matches: |l| l.starts_with("info:") || BANNER.is_match(l) || l.starts_with("libvirt version:"),
    },
    Rule {
        category: LineCategory::Command,
        matches: |l| {
            ["Building command:", "command:", "commandrvf:", "chroot:", "exec:"]
                .iter()
                .any(|p| l.starts_with(p))
                || RUNNING.is_match(l)
        },
    },
    Rule {
        category: LineCategory::StructuredData,
        matches: |l| STRUCTURED.is_match(l) || l.starts_with("<domain") || l.starts_with("<?xml"),
    },
    Rule {
        category: LineCategory::Warning,
        matches: |l| detect_level(l) == Some(ErrorLevel::Warning),
    },
    Rule {
        category: LineCategory::Error,
        matches: |l| detect_level(l) == Some(ErrorLevel::Error),
    },
];

/// Classify a single line. Leading and trailing whitespace is ignored.
pub fn classify(line: &str) -> LineCategory {
    let line = line.trim();
    RULES
        .iter()
        .find(|rule| (rule.matches)(line))
        .map(|rule| rule.category)
        .unwrap_or(LineCategory::Other)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kernel_before_stage() {
        assert_eq!(classify("[    1.234567] Linux version 5.14"), LineCategory::Kernel);
        assert_eq!(classify("[   5.3] Opening the source"), LineCategory::Stage);
        assert_eq!(classify("[  12.0] Finishing off"), LineCategory::Stage);
    }

    #[test]
    fn test_subsystems() {
        assert_eq!(classify("libguestfs: trace: v2v: launch"), LineCategory::Libguestfs);
        assert_eq!(classify("guestfsd: <= mount (0x1) request length 60 bytes"), LineCategory::Guestfsd);
        assert_eq!(classify("nbdkit: debug: registered plugin"), LineCategory::Nbdkit);
        assert_eq!(classify("libnbd: debug: nbd1: opt_go"), LineCategory::Libnbd);
        assert_eq!(classify("qemu-img: info"), LineCategory::Qemu);
        assert_eq!(classify("supermin: mounting /proc"), LineCategory::Supermin);
        assert_eq!(classify("libvirt: XML-RPC"), LineCategory::Libvirt);
        assert_eq!(classify("hivex: opened"), LineCategory::Hivex);
    }

    #[test]
    fn test_subsystem_reports_fall_through() {
        assert_eq!(classify("nbdkit: error: could not connect"), LineCategory::Error);
        assert_eq!(classify("libguestfs: warning: appliance is old"), LineCategory::Warning);
    }

    #[test]
    fn test_null_error_is_not_an_error() {
        assert_eq!(
            classify("libguestfs: trace: v2v: get_backend_setting = NULL (error)"),
            LineCategory::Libguestfs
        );
        assert_eq!(classify("get_backend_setting = NULL (error)"), LineCategory::Other);
    }

    #[test]
    fn test_monitor_info_command_structured() {
        assert_eq!(classify("virt-v2v monitoring: Finished"), LineCategory::Monitor);
        assert_eq!(classify("info: virt-v2v: starting"), LineCategory::Info);
        assert_eq!(classify("virt-v2v: virt-v2v 2.4.0rhel=9"), LineCategory::Info);
        assert_eq!(classify("libvirt version: 9.0.0"), LineCategory::Info);
        assert_eq!(classify("Building command: virt-v2v [-v]"), LineCategory::Command);
        assert_eq!(classify("running nbdkit:"), LineCategory::Command);
        assert_eq!(classify("commandrvf: udevadm --debug settle"), LineCategory::Command);
        assert_eq!(classify("apiVersion: v1"), LineCategory::StructuredData);
        assert_eq!(classify("<domain type='kvm'>"), LineCategory::StructuredData);
    }

    #[test]
    fn test_fallbacks() {
        assert_eq!(classify("virt-v2v: error: inspection failed"), LineCategory::Error);
        assert_eq!(classify("   "), LineCategory::Other);
        assert_eq!(classify("hello world"), LineCategory::Other);
    }
}
