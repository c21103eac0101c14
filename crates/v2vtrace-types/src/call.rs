use serde::{Deserialize, Serialize};

/// Textual shape in which a guest-side command was logged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GuestCommandKind {
    /// `commandrvf: <cmd>`
    Direct,
    /// `command: run: <cmd>`
    Filtered,
    /// `chroot: <root>: running '<cmd>'`
    Chroot,
}

/// Shell-level command executed inside the appliance on behalf of an API call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuestCommand {
    pub kind: GuestCommandKind,
    pub command: String,
    /// Chroot directory for [`GuestCommandKind::Chroot`] commands
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub stdout: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_code: Option<i32>,
    pub line: usize,
}

impl GuestCommand {
    pub fn new(kind: GuestCommandKind, command: impl Into<String>, line: usize) -> Self {
        Self {
            kind,
            command: command.into(),
            root: None,
            stdout: Vec::new(),
            return_code: None,
            line,
        }
    }
}

/// libguestfs API call reconstructed from `libguestfs: trace:` lines
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiCall {
    pub name: String,
    pub args: String,
    /// Result text; `None` while the call is still open or when the log ended first
    pub result: Option<String>,
    /// Trace handle tag (e.g. `v2v`); empty when the log line carried none
    pub handle: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub guest_commands: Vec<GuestCommand>,
    /// Daemon-side execution time reported by `guestfsd: => name ... took N secs`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_secs: Option<f64>,
    pub line: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result_line: Option<usize>,
}

impl ApiCall {
    pub fn new(handle: impl Into<String>, name: impl Into<String>, args: impl Into<String>, line: usize) -> Self {
        Self {
            name: name.into(),
            args: args.into(),
            result: None,
            handle: handle.into(),
            guest_commands: Vec::new(),
            duration_secs: None,
            line,
            result_line: None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.result.is_some()
    }

    /// True when the call returned the libguestfs error convention (`-1` or `NULL`)
    pub fn is_error(&self) -> bool {
        match self.result.as_deref() {
            Some(r) => r.ends_with("(error)") || r == "-1" || r == "NULL",
            None => false,
        }
    }
}
