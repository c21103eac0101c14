//! Recognition of `libguestfs: trace:` records.

use regex::Regex;
use std::sync::LazyLock;

static TRACE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^libguestfs: trace: (?:(?P<handle>[\w.-]+): )?(?P<name>[A-Za-z_]\w*)(?P<rest>.*)$")
        .unwrap()
});

/// A single trace record: either an API invocation or its completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraceEvent {
    Call {
        handle: String,
        name: String,
        args: String,
    },
    Return {
        handle: Option<String>,
        name: String,
        result: String,
    },
}

impl TraceEvent {
    pub fn name(&self) -> &str {
        match self {
            TraceEvent::Call { name, .. } | TraceEvent::Return { name, .. } => name,
        }
    }
}

/// Parse a trimmed line. Returns `None` for anything that is not a call or return record.
pub fn parse_trace(line: &str) -> Option<TraceEvent> {
    let caps = TRACE.captures(line)?;
    let handle = caps.name("handle").map(|m| m.as_str().to_string());
    let name = caps["name"].to_string();
    let rest = &caps["rest"];

    if let Some(result) = rest.strip_prefix(" = ") {
        return Some(TraceEvent::Return {
            handle,
            name,
            result: result.to_string(),
        });
    }
    if rest == " =" {
        return Some(TraceEvent::Return {
            handle,
            name,
            result: String::new(),
        });
    }

    if rest.is_empty() || rest.starts_with(' ') {
        return Some(TraceEvent::Call {
            handle: handle.unwrap_or_default(),
            name,
            args: rest.trim().to_string(),
        });
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_call_with_handle() {
        let event = parse_trace(r#"libguestfs: trace: v2v: hivex_open "/tmp/SOFTWARE" "write:true""#);
        assert_eq!(
            event,
            Some(TraceEvent::Call {
                handle: "v2v".to_string(),
                name: "hivex_open".to_string(),
                args: r#""/tmp/SOFTWARE" "write:true""#.to_string(),
            })
        );
    }

    #[test]
    fn test_call_without_args() {
        let event = parse_trace("libguestfs: trace: v2v: hivex_root").unwrap();
        assert!(matches!(event, TraceEvent::Call { ref args, .. } if args.is_empty()));
        assert_eq!(event.name(), "hivex_root");
    }

    #[test]
    fn test_return_with_and_without_handle() {
        assert_eq!(
            parse_trace("libguestfs: trace: v2v: hivex_root = 4096"),
            Some(TraceEvent::Return {
                handle: Some("v2v".to_string()),
                name: "hivex_root".to_string(),
                result: "4096".to_string(),
            })
        );
        assert_eq!(
            parse_trace("libguestfs: trace: get_backend_setting = NULL (error)"),
            Some(TraceEvent::Return {
                handle: None,
                name: "get_backend_setting".to_string(),
                result: "NULL (error)".to_string(),
            })
        );
    }

    #[test]
    fn test_not_a_record() {
        assert_eq!(parse_trace("libguestfs: launch: backend=direct"), None);
        assert_eq!(parse_trace("guestfsd: trace: x"), None);
    }
}
