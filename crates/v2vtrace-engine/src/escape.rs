//! Decoding of the C-style escaped strings libguestfs prints in trace lines.

use regex::Regex;
use std::sync::LazyLock;

/// Example: `"abc"<truncated, original size 4096 bytes>`
static TRUNCATED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<truncated, original size (\d+) bytes>").unwrap());

/// Resolve `\n \r \t \\ \"` and `\xHH` escapes into raw bytes.
///
/// Unknown escapes are kept verbatim.
pub fn unescape(raw: &str) -> Vec<u8> {
    let bytes = raw.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b'\\' || i + 1 >= bytes.len() {
            out.push(bytes[i]);
            i += 1;
            continue;
        }

        match bytes[i + 1] {
            b'n' => out.push(b'\n'),
            b'r' => out.push(b'\r'),
            b't' => out.push(b'\t'),
            b'\\' => out.push(b'\\'),
            b'"' => out.push(b'"'),
            b'x' => {
                if let Some(byte) = hex_byte(bytes, i + 2) {
                    out.push(byte);
                    i += 4;
                    continue;
                }
                out.extend_from_slice(b"\\x");
            }
            other => {
                out.push(b'\\');
                out.push(other);
            }
        }
        i += 2;
    }

    out
}

pub fn unescape_lossy(raw: &str) -> String {
    String::from_utf8_lossy(&unescape(raw)).into_owned()
}

fn hex_byte(bytes: &[u8], at: usize) -> Option<u8> {
    let digits = bytes.get(at..at + 2)?;
    let text = std::str::from_utf8(digits).ok()?;
    u8::from_str_radix(text, 16).ok()
}

/// Content whose first bytes are two or more `\xHH` escapes (other than CR/LF) is binary
pub fn starts_with_binary_escapes(raw: &str) -> bool {
    let bytes = raw.as_bytes();
    let mut count = 0;
    let mut i = 0;

    while i + 3 < bytes.len() && bytes[i] == b'\\' && bytes[i + 1] == b'x' {
        match hex_byte(bytes, i + 2) {
            Some(b'\n') | Some(b'\r') | None => break,
            Some(_) => {
                count += 1;
                i += 4;
            }
        }
    }

    count >= 2
}

/// Size announced by a `<truncated, original size N bytes>` suffix
pub fn truncated_size(text: &str) -> Option<u64> {
    TRUNCATED
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Split trace arguments into tokens. Quoted tokens are returned without their quotes and
/// still escaped; bare tokens are split on whitespace.
pub fn tokenize(args: &str) -> Vec<&str> {
    let bytes = args.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b' ' | b'\t' => i += 1,
            b'"' => {
                let start = i + 1;
                let mut j = start;
                let mut escaped = false;
                while j < bytes.len() {
                    match bytes[j] {
                        _ if escaped => escaped = false,
                        b'\\' => escaped = true,
                        b'"' => break,
                        _ => {}
                    }
                    j += 1;
                }
                let end = j;
                tokens.push(&args[start..end]);
                i = end + 1;
                // skip a trailing "<truncated, ...>" annotation glued to the quote
                if args[i.min(args.len())..].starts_with("<truncated") {
                    i = args[i..].find('>').map_or(bytes.len(), |p| i + p + 1);
                }
            }
            _ => {
                let start = i;
                while i < bytes.len() && bytes[i] != b' ' && bytes[i] != b'\t' {
                    i += 1;
                }
                tokens.push(&args[start..i]);
            }
        }
    }

    tokens
}
