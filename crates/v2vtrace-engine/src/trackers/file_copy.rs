//! Files written into the guest, paired with the read of their previous contents.

use super::{LineView, Tracker};
use crate::escape::{starts_with_binary_escapes, tokenize, truncated_size, unescape, unescape_lossy};
use crate::trace::TraceEvent;
use std::collections::{HashMap, VecDeque};
use std::path::Path;
use v2vtrace_types::{CopyOrigin, FileCopy};

const TEXT_EXTENSIONS: &[&str] = &[
    "txt", "cfg", "conf", "ini", "xml", "json", "ps1", "bat", "cmd", "reg", "sh", "service", "rules",
    "repo", "inf", "log",
];

const BINARY_EXTENSIONS: &[&str] = &[
    "exe", "dll", "sys", "msi", "cat", "pdb", "cab", "iso", "img", "qcow2", "vmdk", "vhd", "vhdx",
    "raw",
];

const READ_CALLS: &[&str] = &["read_file", "cat"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ContentKind {
    Text,
    Binary,
    Opaque,
}

fn content_kind(path: &str) -> ContentKind {
    let extension = Path::new(path)
        .extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase());
    match extension.as_deref() {
        None => ContentKind::Text,
        Some(ext) if BINARY_EXTENSIONS.contains(&ext) => ContentKind::Binary,
        Some(ext) if TEXT_EXTENSIONS.contains(&ext) => ContentKind::Text,
        Some(_) => ContentKind::Opaque,
    }
}

#[derive(Debug)]
struct PendingRead {
    line: usize,
    size: Option<u64>,
}

#[derive(Debug)]
pub struct FileCopyTracker {
    reads: HashMap<String, PendingRead>,
    /// Reads still waiting for their result, oldest first, as (call name, path).
    awaiting: VecDeque<(String, String)>,
    copies: Vec<FileCopy>,
    decode_content: bool,
}

impl FileCopyTracker {
    pub fn new(decode_content: bool) -> Self {
        Self {
            reads: HashMap::new(),
            awaiting: VecDeque::new(),
            copies: Vec::new(),
            decode_content,
        }
    }

    pub fn finish(self) -> Vec<FileCopy> {
        self.copies
    }

    fn on_read(&mut self, name: &str, args: &str, line: usize) {
        let Some(path) = tokenize(args).first().map(|p| unescape_lossy(p)) else {
            return;
        };
        self.reads.insert(path.clone(), PendingRead { line, size: None });
        self.awaiting.push_back((name.to_string(), path));
    }

    fn on_read_result(&mut self, name: &str, result: &str) {
        let Some(pos) = self.awaiting.iter().position(|(n, _)| n == name) else {
            return;
        };
        let Some((_, path)) = self.awaiting.remove(pos) else {
            return;
        };
        let size = truncated_size(result).or_else(|| {
            tokenize(result)
                .first()
                .map(|content| unescape(content).len() as u64)
        });
        if let Some(read) = self.reads.get_mut(&path) {
            read.size = size;
        }
    }

    fn on_write(&mut self, name: &str, args: &str, line: usize) {
        let tokens = tokenize(args);
        let Some(path) = tokens.first().map(|p| unescape_lossy(p)) else {
            return;
        };
        let raw = tokens.get(1).copied().unwrap_or_default();
        let kind = content_kind(&path);
        let binary = kind == ContentKind::Binary || starts_with_binary_escapes(raw);
        let content = (self.decode_content && kind == ContentKind::Text && !binary)
            .then(|| unescape_lossy(raw));
        let written = truncated_size(args).unwrap_or(unescape(raw).len() as u64);

        if name == "write_append"
            && let Some(copy) = self.copies.iter_mut().rev().find(|c| c.path == path)
        {
            copy.binary |= binary;
            if copy.binary {
                copy.content = None;
            } else if let (Some(existing), Some(more)) = (copy.content.as_mut(), content) {
                existing.push_str(&more);
            }
            return;
        }

        let read = self.reads.remove(&path);
        let (origin, read_line, original_size) = match read {
            Some(read) => (CopyOrigin::Modified, Some(read.line), read.size.or(Some(written))),
            None => (CopyOrigin::Generated, None, Some(written)),
        };

        self.copies.push(FileCopy {
            path,
            origin,
            read_line,
            write_line: line,
            original_size,
            content,
            binary,
        });
    }
}

impl Tracker for FileCopyTracker {
    fn observe(&mut self, line: &LineView<'_>) {
        match line.trace {
            Some(TraceEvent::Call { name, args, .. }) => match name.as_str() {
                n if READ_CALLS.contains(&n) => self.on_read(n, args, line.number),
                "write" | "write_append" => self.on_write(name, args, line.number),
                _ => {}
            },
            Some(TraceEvent::Return { name, result, .. }) if READ_CALLS.contains(&name.as_str()) => {
                self.on_read_result(name, result);
            }
            _ => {}
        }
    }
}
