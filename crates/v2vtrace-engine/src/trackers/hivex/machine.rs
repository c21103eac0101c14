//! Hive session state machine.
//!
//! A session runs from `hivex_open` to `hivex_close`. Within it, each walk from the root handle
//! down to a key, together with the values read or written there, becomes one [`HivexAccess`].

use v2vtrace_types::{HivexAccess, HivexMode, HivexValue};

use super::value::{REG_BINARY, decode_value};

#[derive(Debug, Clone, PartialEq)]
pub enum HiveEvent {
    Open { path: String, write: bool },
    Root(i64),
    ChildRequest { parent: i64, name: String },
    ChildResult(i64),
    AddChild { parent: i64, name: String },
    SetValue { name: String, value: String },
    Commit,
    ValueRequest(String),
    ValueType(u32),
    ValueData(String),
    ValueRaw(Vec<u8>),
    Close,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    pub hive_path: String,
    pub declared_write: bool,
    pub open_line: usize,
    pub root: Option<i64>,
    pub path: Vec<String>,
    pub path_line: Option<usize>,
    pub values: Vec<HivexValue>,
    pub pending_child: Option<String>,
    pub failed_children: Vec<String>,
    pub pending_value: Option<String>,
    pub pending_type: Option<u32>,
    pub has_write_op: bool,
    pub first_write_line: Option<usize>,
}

impl Session {
    fn new(hive_path: String, declared_write: bool, open_line: usize) -> Self {
        Self {
            hive_path,
            declared_write,
            open_line,
            ..Self::default()
        }
    }

    fn is_accumulating(&self) -> bool {
        !self.path.is_empty() || !self.values.is_empty()
    }

    fn mark_write(&mut self, line: usize) {
        self.has_write_op = true;
        self.first_write_line.get_or_insert(line);
    }

    fn begin_navigation(&mut self, line: usize) {
        self.path_line.get_or_insert(line);
    }

    /// A new descent from the root ends the access built so far.
    fn detect_root(&mut self, parent: i64) -> Option<HivexAccess> {
        if self.root == Some(parent) && self.is_accumulating() {
            self.flush()
        } else {
            None
        }
    }

    fn push_value(&mut self, value: String, line: usize) {
        if let Some(name) = self.pending_value.take() {
            self.values.push(HivexValue { name, value, line });
        }
        self.pending_type = None;
    }

    /// Emit the current access, if anything was navigated or collected, and reset the path and
    /// value accumulators. The write marker belongs to the session and survives.
    pub fn flush(&mut self) -> Option<HivexAccess> {
        let path = std::mem::take(&mut self.path);
        let values = std::mem::take(&mut self.values);
        let path_line = self.path_line.take();
        self.pending_child = None;

        if !self.failed_children.is_empty() {
            tracing::debug!(
                hive = %self.hive_path,
                missing = ?self.failed_children,
                "hive keys not found"
            );
            self.failed_children.clear();
        }

        if path.is_empty() && values.is_empty() {
            return None;
        }

        let (mode, line) = match (self.has_write_op, self.first_write_line) {
            (true, Some(line)) => (HivexMode::Write, line),
            _ => (HivexMode::Read, path_line.unwrap_or(self.open_line)),
        };

        Some(HivexAccess {
            hive_path: self.hive_path.clone(),
            mode,
            key_path: path.join("."),
            values,
            line,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum HiveState {
    #[default]
    Closed,
    /// Open, root handle not yet known.
    Opened(Session),
    Rooted(Session),
    Navigating(Session),
}

impl HiveState {
    fn into_session(self) -> Option<Session> {
        match self {
            HiveState::Closed => None,
            HiveState::Opened(s) | HiveState::Rooted(s) | HiveState::Navigating(s) => Some(s),
        }
    }
}

/// Advance the machine by one event.
pub fn transition(state: HiveState, event: HiveEvent, line: usize) -> (HiveState, Option<HivexAccess>) {
    let same_phase: fn(Session) -> HiveState = match &state {
        HiveState::Opened(_) => HiveState::Opened,
        HiveState::Rooted(_) => HiveState::Rooted,
        _ => HiveState::Navigating,
    };

    let Some(mut session) = state.into_session() else {
        return match event {
            HiveEvent::Open { path, write } => (HiveState::Opened(Session::new(path, write, line)), None),
            _ => (HiveState::Closed, None),
        };
    };

    let mut emitted = None;
    let next = match event {
        HiveEvent::Open { path, write } => {
            emitted = session.flush();
            HiveState::Opened(Session::new(path, write, line))
        }
        HiveEvent::Root(handle) => {
            if session.root.is_none() {
                session.root = Some(handle);
            }
            if session.is_accumulating() {
                emitted = session.flush();
            }
            HiveState::Rooted(session)
        }
        HiveEvent::ChildRequest { parent, name } => {
            emitted = session.detect_root(parent);
            session.begin_navigation(line);
            session.pending_child = Some(name);
            HiveState::Navigating(session)
        }
        HiveEvent::ChildResult(handle) => {
            if let Some(name) = session.pending_child.take() {
                if handle > 0 {
                    session.path.push(name);
                } else {
                    session.failed_children.push(name);
                    if !session.is_accumulating() {
                        session.path_line = None;
                    }
                }
            }
            HiveState::Navigating(session)
        }
        HiveEvent::AddChild { parent, name } => {
            emitted = session.detect_root(parent);
            session.begin_navigation(line);
            session.mark_write(line);
            session.path.push(name);
            HiveState::Navigating(session)
        }
        HiveEvent::SetValue { name, value } => {
            session.mark_write(line);
            session.values.push(HivexValue { name, value, line });
            HiveState::Navigating(session)
        }
        HiveEvent::Commit => {
            session.mark_write(line);
            same_phase(session)
        }
        HiveEvent::ValueRequest(name) => {
            session.begin_navigation(line);
            session.pending_value = Some(name);
            session.pending_type = None;
            HiveState::Navigating(session)
        }
        HiveEvent::ValueType(kind) => {
            session.pending_type = Some(kind);
            HiveState::Navigating(session)
        }
        HiveEvent::ValueData(value) => {
            session.push_value(value, line);
            HiveState::Navigating(session)
        }
        HiveEvent::ValueRaw(bytes) => {
            let kind = session.pending_type.unwrap_or(REG_BINARY);
            session.push_value(decode_value(kind, &bytes), line);
            HiveState::Navigating(session)
        }
        HiveEvent::Close => {
            emitted = session.flush();
            HiveState::Closed
        }
    };

    (next, emitted)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drive(events: Vec<HiveEvent>) -> Vec<HivexAccess> {
        let mut state = HiveState::Closed;
        let mut out = Vec::new();
        for (line, event) in events.into_iter().enumerate() {
            let (next, emitted) = transition(state, event, line);
            state = next;
            out.extend(emitted);
        }
        out
    }

    fn open(write: bool) -> HiveEvent {
        HiveEvent::Open {
            path: "/tmp/SYSTEM".to_string(),
            write,
        }
    }

    fn child(parent: i64, name: &str) -> HiveEvent {
        HiveEvent::ChildRequest {
            parent,
            name: name.to_string(),
        }
    }

    #[test]
    fn test_open_root_close_emits_nothing() {
        let out = drive(vec![open(false), HiveEvent::Root(4096), HiveEvent::Close]);
        assert!(out.is_empty());
    }

    #[test]
    fn test_events_while_closed_are_ignored() {
        let (state, emitted) = transition(HiveState::Closed, HiveEvent::Commit, 0);
        assert_eq!(state, HiveState::Closed);
        assert!(emitted.is_none());
    }

    #[test]
    fn test_two_descents_from_root_are_two_accesses() {
        let out = drive(vec![
            open(false),
            HiveEvent::Root(4096),
            child(4096, "ControlSet001"),
            HiveEvent::ChildResult(8192),
            child(8192, "Services"),
            HiveEvent::ChildResult(9000),
            child(4096, "Select"),
            HiveEvent::ChildResult(7000),
            HiveEvent::Close,
        ]);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].key_path, "ControlSet001.Services");
        assert_eq!(out[0].line, 2);
        assert_eq!(out[1].key_path, "Select");
        assert_eq!(out[1].line, 6);
        assert!(out.iter().all(|a| a.mode == HivexMode::Read));
    }

    #[test]
    fn test_declared_write_without_write_op_is_read() {
        let out = drive(vec![
            open(true),
            HiveEvent::Root(1),
            child(1, "Select"),
            HiveEvent::ChildResult(2),
            HiveEvent::Close,
        ]);
        assert_eq!(out[0].mode, HivexMode::Read);
    }

    #[test]
    fn test_write_op_sets_mode_and_line() {
        let out = drive(vec![
            open(true),
            HiveEvent::Root(1),
            child(1, "Services"),
            HiveEvent::ChildResult(2),
            HiveEvent::SetValue {
                name: "Start".to_string(),
                value: "0".to_string(),
            },
            HiveEvent::Commit,
            HiveEvent::Close,
        ]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].mode, HivexMode::Write);
        assert_eq!(out[0].line, 4);
        assert_eq!(out[0].values[0].name, "Start");
    }

    #[test]
    fn test_failed_child_is_not_in_path() {
        let out = drive(vec![
            open(false),
            HiveEvent::Root(1),
            child(1, "Missing"),
            HiveEvent::ChildResult(0),
            HiveEvent::Close,
        ]);
        assert!(out.is_empty());
    }

    #[test]
    fn test_value_read_decodes_with_type() {
        let out = drive(vec![
            open(false),
            HiveEvent::Root(1),
            child(1, "Select"),
            HiveEvent::ChildResult(2),
            HiveEvent::ValueRequest("Current".to_string()),
            HiveEvent::ValueType(4),
            HiveEvent::ValueRaw(vec![1, 0, 0, 0]),
            HiveEvent::Close,
        ]);
        assert_eq!(out[0].values[0].value, "1");
        assert_eq!(out[0].values[0].line, 6);
    }

    #[test]
    fn test_reopen_flushes_previous_session() {
        let out = drive(vec![
            open(false),
            HiveEvent::Root(1),
            child(1, "Select"),
            HiveEvent::ChildResult(2),
            open(false),
        ]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].key_path, "Select");
    }

    fn set(name: &str, value: &str) -> HiveEvent {
        HiveEvent::SetValue {
            name: name.to_string(),
            value: value.to_string(),
        }
    }

    #[test]
    fn test_write_marker_outlives_the_access_that_set_it() {
        let out = drive(vec![
            open(true),
            HiveEvent::Root(4096),
            child(4096, "A"),
            HiveEvent::ChildResult(5000),
            set("Start", "3"),
            child(4096, "B"),
            HiveEvent::ChildResult(6000),
            HiveEvent::Close,
        ]);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].key_path, "A");
        assert_eq!(out[0].mode, HivexMode::Write);
        assert_eq!(out[0].line, 4);
        assert_eq!(out[1].key_path, "B");
        assert_eq!(out[1].mode, HivexMode::Write);
        assert_eq!(out[1].line, 4);
    }

    #[test]
    fn test_write_marker_cleared_by_new_session() {
        let out = drive(vec![
            open(true),
            HiveEvent::Root(1),
            child(1, "A"),
            HiveEvent::ChildResult(2),
            set("Start", "3"),
            HiveEvent::Close,
            open(true),
            HiveEvent::Root(1),
            child(1, "B"),
            HiveEvent::ChildResult(2),
            HiveEvent::Close,
        ]);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].mode, HivexMode::Write);
        assert_eq!(out[1].mode, HivexMode::Read);
        assert_eq!(out[1].line, 8);
    }

    #[test]
    fn test_root_query_mid_path_flushes_and_keeps_session() {
        let mut state = HiveState::Closed;
        for (line, event) in [
            open(true),
            HiveEvent::Root(4096),
            child(4096, "ControlSet001"),
            HiveEvent::ChildResult(5000),
        ]
        .into_iter()
        .enumerate()
        {
            let (next, emitted) = transition(state, event, line);
            assert!(emitted.is_none());
            state = next;
        }

        let (state, emitted) = transition(state, HiveEvent::Root(4096), 4);
        let access = emitted.unwrap();
        assert_eq!(access.key_path, "ControlSet001");
        assert_eq!(access.line, 2);

        let HiveState::Rooted(session) = state else {
            panic!("expected rooted state, got {:?}", state);
        };
        assert_eq!(session.hive_path, "/tmp/SYSTEM");
        assert!(session.declared_write);
        assert_eq!(session.root, Some(4096));
        assert!(session.path.is_empty());
        assert!(session.values.is_empty());
    }

    #[test]
    fn test_root_query_without_accumulation_emits_nothing() {
        let out = drive(vec![
            open(false),
            HiveEvent::Root(1),
            HiveEvent::Root(1),
            child(1, "Select"),
            HiveEvent::ChildResult(2),
            HiveEvent::Close,
        ]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].line, 3);
    }

    #[test]
    fn test_failed_lookup_does_not_anchor_next_descent() {
        let out = drive(vec![
            open(false),
            HiveEvent::Root(1),
            child(1, "Missing"),
            HiveEvent::ChildResult(0),
            child(1, "Select"),
            HiveEvent::ChildResult(2),
            HiveEvent::Close,
        ]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].key_path, "Select");
        assert_eq!(out[0].line, 4);
    }
}
