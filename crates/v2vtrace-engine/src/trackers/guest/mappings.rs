//! Pair lists such as drive-letter mappings and fstab entries.
//!
//! Two notations occur: tuple lists `[(C, /dev/sda2), (D, /dev/sdb1)]` and arrow lists
//! `C => /dev/sda2, D => /dev/sdb1`.

use regex::Regex;
use std::sync::LazyLock;
use v2vtrace_types::{DriveMapping, FstabEntry};

static TUPLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(\s*([^,()]+?)\s*,\s*([^()]*?)\s*\)").unwrap());

static ARROW: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([^\s,;\[\]]+)\s*(?:=>|->)\s*([^\s,;\[\]]+)").unwrap());

pub fn parse_pairs(text: &str) -> Vec<(String, String)> {
    let tuples: Vec<_> = TUPLE
        .captures_iter(text)
        .map(|caps| (clean(&caps[1]), clean(&caps[2])))
        .collect();
    if !tuples.is_empty() {
        return tuples;
    }

    ARROW
        .captures_iter(text)
        .map(|caps| (clean(&caps[1]), clean(&caps[2])))
        .collect()
}

fn clean(item: &str) -> String {
    item.trim().trim_matches(|c| c == '"' || c == '\'').to_string()
}

/// Drive mappings sorted by letter.
pub fn drive_mappings(text: &str) -> Vec<DriveMapping> {
    let mut mappings: Vec<_> = parse_pairs(text)
        .into_iter()
        .filter(|(letter, device)| !letter.is_empty() && !device.is_empty())
        .map(|(letter, device)| DriveMapping { letter, device })
        .collect();
    mappings.sort_by(|a, b| a.letter.cmp(&b.letter));
    mappings
}

/// fstab entries in source order. `device_first` selects the tuple orientation.
pub fn fstab(text: &str, device_first: bool) -> Vec<FstabEntry> {
    parse_pairs(text)
        .into_iter()
        .map(|(a, b)| if device_first { (a, b) } else { (b, a) })
        .filter(|(device, mountpoint)| !device.is_empty() && !mountpoint.is_empty())
        .map(|(device, mountpoint)| FstabEntry { device, mountpoint })
        .collect()
}
