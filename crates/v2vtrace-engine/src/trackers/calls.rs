//! Reconstruction of the libguestfs call tree.
//!
//! API invocations are matched to their completions through per-(handle, name) FIFO queues. The
//! guestfsd daemon brackets the low-level work of a request between `<=` and `=>` markers; guest
//! commands seen inside that scope belong to the call of the same name.

use super::{LineView, Tracker};
use crate::trace::TraceEvent;
use regex::Regex;
use std::collections::{HashMap, VecDeque};
use std::sync::LazyLock;
use v2vtrace_types::{ApiCall, GuestCommand, GuestCommandKind, LineCategory};

/// `guestfsd: <= mount_ro (0x49) request length 64 bytes`
static SCOPE_START: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^guestfsd: <= (\w+) \(0x[0-9a-fA-F]+\) request length \d+ bytes").unwrap()
});

/// `guestfsd: => mount_ro (0x49) took 0.02 secs`
static SCOPE_END: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^guestfsd: => (\w+) \(0x[0-9a-fA-F]+\) took (\d+(?:\.\d+)?) secs").unwrap()
});

static RETURN_CODE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:commandrvf|command): .*?\b(?:returned|exit status)\s+(-?\d+)\s*$").unwrap()
});

/// `chroot: /sysroot: running 'rpm' '-q' 'kernel'`
static CHROOT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^chroot: (\S+): running ('.+')\s*$").unwrap());

type CallKey = (String, String);

/// FIFO queues of open call ids keyed by (handle, name).
#[derive(Debug, Default)]
pub struct CallQueues {
    queues: HashMap<CallKey, VecDeque<usize>>,
}

impl CallQueues {
    pub fn push(&mut self, handle: &str, name: &str, id: usize) {
        self.queues
            .entry((handle.to_string(), name.to_string()))
            .or_default()
            .push_back(id);
    }

    pub fn pop_oldest(&mut self, handle: &str, name: &str) -> Option<usize> {
        self.queues
            .get_mut(&(handle.to_string(), name.to_string()))
            .and_then(VecDeque::pop_front)
    }

    /// Oldest open call with this name on any handle.
    pub fn pop_oldest_by_name(&mut self, name: &str) -> Option<usize> {
        let key = self
            .queues
            .iter()
            .filter(|((_, n), q)| n == name && !q.is_empty())
            .min_by_key(|(_, q)| q.front().copied().unwrap_or(usize::MAX))
            .map(|(key, _)| key.clone())?;
        self.queues.get_mut(&key).and_then(VecDeque::pop_front)
    }
}

#[derive(Debug)]
struct Scope {
    name: String,
    commands: Vec<GuestCommand>,
}

/// Where the most recently recorded guest command lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Scope,
    Call(usize),
    Orphan,
}

#[derive(Debug)]
pub struct CallOutput {
    pub calls: Vec<ApiCall>,
    pub orphans: Vec<GuestCommand>,
}

pub struct CallTracker {
    calls: Vec<ApiCall>,
    queues: CallQueues,
    open: Vec<usize>,
    scope: Option<Scope>,
    orphans: Vec<GuestCommand>,
    last: Option<Slot>,
    capturing: bool,
    max_stdout_lines: usize,
}

impl CallTracker {
    pub fn new(max_stdout_lines: usize) -> Self {
        Self {
            calls: Vec::new(),
            queues: CallQueues::default(),
            open: Vec::new(),
            scope: None,
            orphans: Vec::new(),
            last: None,
            capturing: false,
            max_stdout_lines,
        }
    }

    pub fn finish(mut self) -> CallOutput {
        self.close_scope(None);
        let mut calls = self.calls;
        calls.sort_by_key(|call| call.line);
        CallOutput {
            calls,
            orphans: self.orphans,
        }
    }

    fn on_trace(&mut self, event: &TraceEvent, line: usize) {
        match event {
            TraceEvent::Call { handle, name, args } => {
                let id = self.calls.len();
                self.calls.push(ApiCall::new(handle.as_str(), name.as_str(), args.as_str(), line));
                self.queues.push(handle, name, id);
                self.open.push(id);
            }
            TraceEvent::Return {
                handle,
                name,
                result,
            } => {
                let id = match handle {
                    Some(handle) => self.queues.pop_oldest(handle, name),
                    None => self.queues.pop_oldest_by_name(name),
                };
                if let Some(id) = id {
                    let call = &mut self.calls[id];
                    call.result = Some(result.clone());
                    call.result_line = Some(line);
                    self.open.retain(|&open| open != id);
                }
            }
        }
    }

    fn open_scope(&mut self, name: &str) {
        self.close_scope(None);
        self.scope = Some(Scope {
            name: name.to_string(),
            commands: Vec::new(),
        });
    }

    fn close_scope(&mut self, duration_secs: Option<f64>) {
        let Some(scope) = self.scope.take() else {
            return;
        };
        if self.last == Some(Slot::Scope) {
            self.last = None;
        }

        let owner = self
            .open
            .iter()
            .rev()
            .copied()
            .find(|&id| self.calls[id].name == scope.name)
            .or_else(|| self.calls.iter().rposition(|call| call.name == scope.name));

        match owner {
            Some(id) => {
                let call = &mut self.calls[id];
                call.guest_commands.extend(scope.commands);
                if duration_secs.is_some() {
                    call.duration_secs = duration_secs;
                }
            }
            None => self.orphans.extend(scope.commands),
        }
    }

    fn record_command(&mut self, command: GuestCommand) {
        let slot = if let Some(scope) = self.scope.as_mut() {
            scope.commands.push(command);
            Slot::Scope
        } else if let Some(&id) = self.open.last() {
            self.calls[id].guest_commands.push(command);
            Slot::Call(id)
        } else {
            self.orphans.push(command);
            Slot::Orphan
        };
        self.last = Some(slot);
        self.capturing = true;
    }

    fn last_command_mut(&mut self) -> Option<&mut GuestCommand> {
        match self.last? {
            Slot::Scope => self.scope.as_mut()?.commands.last_mut(),
            Slot::Call(id) => self.calls.get_mut(id)?.guest_commands.last_mut(),
            Slot::Orphan => self.orphans.last_mut(),
        }
    }

    fn on_command_line(&mut self, text: &str, number: usize) -> bool {
        if let Some(caps) = RETURN_CODE.captures(text) {
            if let Ok(code) = caps[1].parse::<i32>()
                && let Some(command) = self.last_command_mut()
            {
                command.return_code = Some(code);
            }
            return true;
        }

        if let Some(rest) = text.strip_prefix("command: run: ") {
            let continuation = rest.strip_prefix("\\ ");
            if let Some(more) = continuation
                && let Some(command) = self.last_command_mut()
                && command.kind == GuestCommandKind::Filtered
            {
                command.command.push(' ');
                command.command.push_str(more.trim());
                return true;
            }
            let command = continuation.unwrap_or(rest).trim();
            if !command.is_empty() {
                self.record_command(GuestCommand::new(GuestCommandKind::Filtered, command, number));
            }
            return true;
        }

        if let Some(rest) = text.strip_prefix("commandrvf: ") {
            if !rest.starts_with("stdout=") {
                let command = rest.trim();
                if !command.is_empty() {
                    self.record_command(GuestCommand::new(GuestCommandKind::Direct, command, number));
                }
            }
            return true;
        }

        if let Some(caps) = CHROOT.captures(text) {
            let mut command = GuestCommand::new(GuestCommandKind::Chroot, &caps[2], number);
            command.root = Some(caps[1].to_string());
            self.record_command(command);
            return true;
        }

        false
    }
}

impl Tracker for CallTracker {
    fn observe(&mut self, line: &LineView<'_>) {
        if line.category == LineCategory::Other && self.capturing {
            let limit = self.max_stdout_lines;
            if !line.text.is_empty()
                && let Some(command) = self.last_command_mut()
                && command.stdout.len() < limit
            {
                command.stdout.push(line.text.to_string());
            }
            return;
        }
        self.capturing = false;

        if let Some(event) = line.trace {
            self.on_trace(event, line.number);
            return;
        }

        match line.category {
            LineCategory::Guestfsd => {
                if let Some(caps) = SCOPE_START.captures(line.text) {
                    self.open_scope(&caps[1]);
                } else if let Some(caps) = SCOPE_END.captures(line.text)
                    && self.scope.as_ref().is_some_and(|scope| scope.name == caps[1])
                {
                    self.close_scope(caps[2].parse().ok());
                }
            }
            LineCategory::Command => {
                self.on_command_line(line.text, line.number);
            }
            _ => {}
        }
    }
}
