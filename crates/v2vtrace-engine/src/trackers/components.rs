//! Versions announced by the tools and libraries in the log.

use super::{LineView, Tracker};
use crate::trace::TraceEvent;
use regex::Regex;
use std::sync::LazyLock;
use v2vtrace_types::{ComponentVersion, LineCategory};

/// `virt-v2v: virt-v2v 2.4.0rhel=9,release=5.el9 (x86_64)`
static BANNER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(virt-[\w-]+): virt-[\w-]+ (\d+(?:\.\d+)+)").unwrap());

static LIBVIRT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^libvirt version: (\S+)").unwrap());

static NBDKIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bnbdkit (\d+\.\d+\.\d+)\b").unwrap());

static GUESTFS_VERSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"major: (\d+), minor: (\d+), release: (\d+)").unwrap());

static QEMU: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)qemu.*?version.*?\((\d+\.\d+(?:\.\d+)?)").unwrap());

#[derive(Debug, Default)]
pub struct ComponentTracker {
    components: Vec<ComponentVersion>,
}

impl ComponentTracker {
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&mut self, component: &str, version: String, line: usize) {
        if self.components.iter().any(|c| c.component == component) {
            return;
        }
        self.components.push(ComponentVersion {
            component: component.to_string(),
            version,
            line,
        });
    }

    pub fn finish(self) -> Vec<ComponentVersion> {
        self.components
    }
}

impl Tracker for ComponentTracker {
    fn observe(&mut self, line: &LineView<'_>) {
        let text = line.text;

        if let Some(TraceEvent::Return { name, result, .. }) = line.trace
            && name == "version"
            && let Some(caps) = GUESTFS_VERSION.captures(result)
        {
            let version = format!("{}.{}.{}", &caps[1], &caps[2], &caps[3]);
            self.record("libguestfs", version, line.number);
            return;
        }

        if let Some(caps) = BANNER.captures(text) {
            let component = caps[1].to_string();
            self.record(&component, caps[2].to_string(), line.number);
        } else if let Some(caps) = LIBVIRT.captures(text) {
            self.record("libvirt", caps[1].to_string(), line.number);
        } else if line.category == LineCategory::Nbdkit
            && let Some(caps) = NBDKIT.captures(text)
        {
            self.record("nbdkit", caps[1].to_string(), line.number);
        } else if let Some(caps) = QEMU.captures(text) {
            self.record("qemu", caps[1].to_string(), line.number);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::classify;
    use crate::trace::parse_trace;

    #[test]
    fn test_first_sighting_wins() {
        let lines = [
            "virt-v2v: virt-v2v 2.4.0rhel=9,release=5.el9 (x86_64)",
            "libvirt version: 9.0.0",
            "nbdkit: debug: nbdkit 1.36.1 (nbdkit-1.36.1-1.el9)",
            "libguestfs: trace: v2v: version = <struct guestfs_version = major: 1, minor: 50, release: 1, extra: rhel=9, >",
            "libguestfs: qemu version (reported by libvirt) = 8002000 (8.2.0)",
            "virt-v2v: virt-v2v 9.9.9",
        ];
        let mut tracker = ComponentTracker::new();
        for (number, raw) in lines.iter().enumerate() {
            let category = classify(raw);
            let trace = parse_trace(raw);
            tracker.observe(&LineView::new(number, raw, category, trace.as_ref()));
        }
        let found: Vec<_> = tracker
            .finish()
            .into_iter()
            .map(|c| (c.component, c.version))
            .collect();
        assert_eq!(
            found,
            vec![
                ("virt-v2v".to_string(), "2.4.0".to_string()),
                ("libvirt".to_string(), "9.0.0".to_string()),
                ("nbdkit".to_string(), "1.36.1".to_string()),
                ("libguestfs".to_string(), "1.50.1".to_string()),
                ("qemu".to_string(), "8.2.0".to_string()),
            ]
        );
    }
}
