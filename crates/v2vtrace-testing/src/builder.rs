//! Synthetic log construction.

/// Builds a console log line by line.
///
/// # Example
/// ```
/// use v2vtrace_testing::LogBuilder;
///
/// let log = LogBuilder::new()
///     .invocation("virt-v2v-in-place", "-v -x")
///     .stage(0.0, "Setting up the source")
///     .stage(12.5, "Finishing off")
///     .build();
/// assert!(log.starts_with("Building command: virt-v2v-in-place [-v -x]"));
/// ```
#[derive(Debug, Clone)]
pub struct LogBuilder {
    lines: Vec<String>,
    handle: String,
}

impl Default for LogBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl LogBuilder {
    pub fn new() -> Self {
        Self {
            lines: Vec::new(),
            handle: "v2v".to_string(),
        }
    }

    /// Handle used by subsequent trace records.
    pub fn handle(mut self, handle: &str) -> Self {
        self.handle = handle.to_string();
        self
    }

    pub fn line(mut self, text: impl Into<String>) -> Self {
        self.lines.push(text.into());
        self
    }

    pub fn lines<I, S>(mut self, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.lines.extend(lines.into_iter().map(Into::into));
        self
    }

    pub fn invocation(self, tool: &str, args: &str) -> Self {
        self.line(format!("Building command: {tool} [{args}]"))
    }

    pub fn banner(self, tool: &str, version: &str) -> Self {
        self.line(format!("{tool}: {tool} {version}"))
    }

    pub fn stage(self, elapsed_secs: f64, name: &str) -> Self {
        self.line(format!("[{elapsed_secs:>6.1}] {name}"))
    }

    /// `libguestfs: trace: <handle>: <name> <args>`
    pub fn call(self, name: &str, args: &str) -> Self {
        let text = if args.is_empty() {
            format!("libguestfs: trace: {}: {name}", self.handle)
        } else {
            format!("libguestfs: trace: {}: {name} {args}", self.handle)
        };
        self.line(text)
    }

    /// `libguestfs: trace: <handle>: <name> = <result>`
    pub fn ret(self, name: &str, result: &str) -> Self {
        let text = format!("libguestfs: trace: {}: {name} = {result}", self.handle);
        self.line(text)
    }

    /// Call immediately followed by its result.
    pub fn call_ret(self, name: &str, args: &str, result: &str) -> Self {
        self.call(name, args).ret(name, result)
    }

    pub fn hive_open(self, path: &str, write: bool) -> Self {
        let flags = if write { " \"write:true\"" } else { "" };
        self.call("hivex_open", &format!("\"{path}\"{flags}"))
    }

    pub fn hive_root(self, node: i64) -> Self {
        self.call("hivex_root", "").ret("hivex_root", &node.to_string())
    }

    /// Descend from `parent` to the child `name`, which resolves to `node` (0 when missing).
    pub fn hive_child(self, parent: i64, name: &str, node: i64) -> Self {
        self.call("hivex_node_get_child", &format!("{parent} \"{name}\""))
            .ret("hivex_node_get_child", &node.to_string())
    }

    /// Read a string value.
    pub fn hive_string(self, node: i64, key: &str, value: &str) -> Self {
        self.call("hivex_node_get_value", &format!("{node} \"{key}\""))
            .ret("hivex_node_get_value", "1")
            .ret("hivex_value_type", "1")
            .ret("hivex_value_string", &format!("\"{value}\""))
    }

    /// Write a DWORD value.
    pub fn hive_set_dword(self, node: i64, key: &str, value: u32) -> Self {
        let bytes: String = value.to_le_bytes().iter().map(|b| format!("\\x{b:02x}")).collect();
        self.call("hivex_node_set_value", &format!("{node} \"{key}\" 4 \"{bytes}\""))
    }

    pub fn hive_close(self) -> Self {
        self.call("hivex_close", "")
    }

    /// guestfsd request bracket around the given lines.
    pub fn daemon_request(mut self, name: &str, serial: u32, body: &[&str], secs: f64) -> Self {
        self.lines
            .push(format!("guestfsd: <= {name} (0x{serial:x}) request length 64 bytes"));
        self.lines.extend(body.iter().map(|l| l.to_string()));
        self.lines
            .push(format!("guestfsd: => {name} (0x{serial:x}) took {secs:.2} secs"));
        self
    }

    pub fn build(&self) -> String {
        self.lines.join("\n")
    }
}
