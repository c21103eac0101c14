//! Registry-hive sessions reconstructed from hivex trace records.

pub mod machine;
pub mod value;

use super::{LineView, Tracker};
use crate::escape::{tokenize, unescape, unescape_lossy};
use crate::trace::TraceEvent;
use machine::{HiveEvent, HiveState, transition};
use v2vtrace_types::HivexAccess;

/// Translate a trace record into a hive event.
pub fn hive_event(event: &TraceEvent) -> Option<HiveEvent> {
    match event {
        TraceEvent::Call { name, args, .. } => {
            let tokens = tokenize(args);
            match name.as_str() {
                "hivex_open" => Some(HiveEvent::Open {
                    path: unescape_lossy(tokens.first()?),
                    write: args.contains("write:true"),
                }),
                "hivex_node_get_child" => Some(HiveEvent::ChildRequest {
                    parent: tokens.first()?.parse().ok()?,
                    name: unescape_lossy(tokens.get(1)?),
                }),
                "hivex_node_add_child" => Some(HiveEvent::AddChild {
                    parent: tokens.first()?.parse().ok()?,
                    name: unescape_lossy(tokens.get(1)?),
                }),
                "hivex_node_set_value" => {
                    let kind: u32 = tokens.get(2)?.parse().ok()?;
                    let bytes = unescape(tokens.get(3).copied().unwrap_or_default());
                    Some(HiveEvent::SetValue {
                        name: unescape_lossy(tokens.get(1)?),
                        value: value::decode_value(kind, &bytes),
                    })
                }
                "hivex_node_get_value" => Some(HiveEvent::ValueRequest(unescape_lossy(tokens.get(1)?))),
                "hivex_commit" => Some(HiveEvent::Commit),
                "hivex_close" => Some(HiveEvent::Close),
                _ => None,
            }
        }
        TraceEvent::Return { name, result, .. } => match name.as_str() {
            "hivex_root" => Some(HiveEvent::Root(leading_int(result)?)),
            "hivex_node_get_child" => Some(HiveEvent::ChildResult(leading_int(result).unwrap_or(0))),
            "hivex_value_type" => Some(HiveEvent::ValueType(u32::try_from(leading_int(result)?).ok()?)),
            "hivex_value_string" | "hivex_value_utf8" => {
                let quoted = tokenize(result);
                Some(HiveEvent::ValueData(unescape_lossy(quoted.first()?)))
            }
            "hivex_value_dword" | "hivex_value_qword" => {
                Some(HiveEvent::ValueData(leading_int(result)?.to_string()))
            }
            "hivex_value_value" => {
                let quoted = tokenize(result);
                Some(HiveEvent::ValueRaw(unescape(quoted.first()?)))
            }
            _ => None,
        },
    }
}

fn leading_int(text: &str) -> Option<i64> {
    text.split_whitespace().next()?.parse().ok()
}

/// Drives the hive state machine and merges back-to-back accesses to the same key.
#[derive(Debug, Default)]
pub struct HivexTracker {
    state: HiveState,
    accesses: Vec<HivexAccess>,
}

impl HivexTracker {
    pub fn new() -> Self {
        Self::default()
    }

    fn apply(&mut self, event: HiveEvent, line: usize) {
        let state = std::mem::take(&mut self.state);
        let (next, emitted) = transition(state, event, line);
        self.state = next;
        if let Some(access) = emitted {
            self.push(access);
        }
    }

    fn push(&mut self, access: HivexAccess) {
        match self.accesses.last_mut() {
            Some(last) if last.same_target(&access) => last.values.extend(access.values),
            _ => self.accesses.push(access),
        }
    }

    /// Close any session left open at the end of the section.
    pub fn finish(mut self, last_line: usize) -> Vec<HivexAccess> {
        if self.state != HiveState::Closed {
            self.apply(HiveEvent::Close, last_line);
        }
        self.accesses
    }
}

impl Tracker for HivexTracker {
    fn observe(&mut self, line: &LineView<'_>) {
        if let Some(event) = line.trace.and_then(hive_event) {
            self.apply(event, line.number);
        }
    }
}
