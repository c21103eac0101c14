//! nbdkit connection metadata.
//!
//! A connection is announced by `running nbdkit:` followed by its command line, possibly spread
//! over several indented or quoted lines. Its socket path is its identity; until the socket is
//! known the connection is pending and only gets a placeholder id if it never learns one.

use super::{LineView, Tracker};
use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;
use v2vtrace_types::{LineCategory, NbdkitConnection};

const START: &str = "running nbdkit:";

/// `registered plugin /usr/lib64/nbdkit/plugins/nbdkit-vddk-plugin.so (name vddk)`
static REGISTERED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"registered (plugin|filter) \S+ \(name ([\w-]+)\)").unwrap()
});

static CONFIG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"config key=(\w+), value=(.*)$").unwrap());

static URI: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"nbd(?:\+unix|\+tcp|s|s\+unix)?://[^\s'"]*"#).unwrap());

static SOCKET_PARAM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[?&]socket=([^&\s'"]+)"#).unwrap());

static TRANSPORT_MODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)transport mode:?\s+(\w+)").unwrap());

static GET_SIZE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"get_size(?::\s*size)?\s*=\s*(\d+)").unwrap());

/// Options whose value is the following token.
const VALUE_OPTIONS: &[&str] = &[
    "-D", "--debug", "-P", "--pidfile", "-t", "--threads", "--selinux-label", "-p", "--port",
    "-i", "--ipaddr", "-u", "--user", "-g", "--group", "--run", "--tls", "--tls-certificates",
    "--tls-psk", "--export-name", "-e", "--log", "--timeout",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Expect {
    Socket,
    Filter,
    Skip,
}

#[derive(Debug, Default)]
enum Current {
    #[default]
    None,
    Pending(Box<NbdkitConnection>),
    Finalized(usize),
}

#[derive(Debug)]
pub struct ConnectionTracker {
    connections: Vec<NbdkitConnection>,
    by_id: HashMap<String, usize>,
    current: Current,
    in_command: bool,
    expect: Option<Expect>,
    placeholders: usize,
    max_log_lines: usize,
}

impl ConnectionTracker {
    pub fn new(max_log_lines: usize) -> Self {
        Self {
            connections: Vec::new(),
            by_id: HashMap::new(),
            current: Current::None,
            in_command: false,
            expect: None,
            placeholders: 0,
            max_log_lines,
        }
    }

    pub fn finish(mut self) -> Vec<NbdkitConnection> {
        self.finalize_pending();
        self.connections
    }

    fn current_mut(&mut self) -> Option<&mut NbdkitConnection> {
        match &mut self.current {
            Current::None => None,
            Current::Pending(conn) => Some(conn.as_mut()),
            Current::Finalized(idx) => self.connections.get_mut(*idx),
        }
    }

    fn start(&mut self, line: usize) {
        self.finalize_pending();
        self.current = Current::Pending(Box::new(NbdkitConnection {
            start_line: line,
            end_line: line,
            ..NbdkitConnection::default()
        }));
        self.in_command = true;
        self.expect = None;
    }

    fn finalize_pending(&mut self) {
        if let Current::Pending(conn) = std::mem::take(&mut self.current) {
            self.placeholders += 1;
            let id = format!("nbdkit-{}", self.placeholders);
            self.register(*conn, id);
        }
    }

    /// Promote a pending connection once its socket is known.
    fn settle(&mut self) {
        let socket = match &self.current {
            Current::Pending(conn) => conn.socket.clone(),
            _ => None,
        };
        if let Some(socket) = socket
            && let Current::Pending(conn) = std::mem::take(&mut self.current)
        {
            self.register(*conn, socket);
        }
    }

    fn register(&mut self, mut conn: NbdkitConnection, id: String) {
        if let Some(&idx) = self.by_id.get(&id) {
            merge(&mut self.connections[idx], conn);
            self.current = Current::Finalized(idx);
            return;
        }
        conn.id = id.clone();
        let idx = self.connections.len();
        self.connections.push(conn);
        self.by_id.insert(id, idx);
        self.current = Current::Finalized(idx);
    }

    fn switch_to_socket(&mut self, socket: &str) -> bool {
        let Some(&idx) = self.by_id.get(socket) else {
            return false;
        };
        if let Current::Pending(conn) = std::mem::take(&mut self.current) {
            merge(&mut self.connections[idx], *conn);
        }
        self.current = Current::Finalized(idx);
        true
    }

    fn touch(&mut self, line: &LineView<'_>, log: bool) {
        let limit = self.max_log_lines;
        if let Some(conn) = self.current_mut() {
            conn.end_line = conn.end_line.max(line.number);
            if log && conn.log_lines.len() < limit {
                conn.log_lines.push(line.text.to_string());
            }
        }
    }

    fn apply_tokens(&mut self, text: &str) {
        for token in shell_words(text) {
            self.apply_token(&token);
        }
        self.settle();
    }

    fn apply_token(&mut self, token: &str) {
        if let Some(expect) = self.expect.take() {
            match expect {
                Expect::Socket => self.with_current(|c| set_once(&mut c.socket, token)),
                Expect::Filter => self.with_current(|c| c.add_filter(token)),
                Expect::Skip => {}
            }
            return;
        }

        match token {
            "--unix" | "-U" => self.expect = Some(Expect::Socket),
            "--filter" => self.expect = Some(Expect::Filter),
            t if VALUE_OPTIONS.contains(&t) => self.expect = Some(Expect::Skip),
            t if t.starts_with("--filter=") => {
                let filter = &t["--filter=".len()..];
                self.with_current(|c| c.add_filter(filter));
            }
            t if t.starts_with("--unix=") => {
                let socket = &t["--unix=".len()..];
                self.with_current(|c| set_once(&mut c.socket, socket));
            }
            t if t.starts_with('-') => {}
            t => match t.split_once('=') {
                Some((key, value)) => self.with_current(|c| apply_key(c, key, value)),
                None => {
                    let plugin = plugin_name(t);
                    if plugin != "nbdkit" {
                        self.with_current(|c| set_once(&mut c.plugin, &plugin));
                    }
                }
            },
        }
    }

    fn with_current(&mut self, f: impl FnOnce(&mut NbdkitConnection)) {
        if let Some(conn) = self.current_mut() {
            f(conn);
        }
    }

    fn apply_debug(&mut self, text: &str) {
        if let Some(caps) = REGISTERED.captures(text) {
            let name = caps[2].to_string();
            if &caps[1] == "plugin" {
                self.with_current(|c| set_once(&mut c.plugin, &name));
            } else {
                self.with_current(|c| c.add_filter(&name));
            }
        }
        if let Some(caps) = CONFIG.captures(text) {
            let (key, value) = (caps[1].to_string(), caps[2].trim().to_string());
            self.with_current(|c| apply_key(c, &key, &value));
        }
        if let Some(caps) = GET_SIZE.captures(text)
            && let Ok(size) = caps[1].parse::<u64>()
        {
            self.with_current(|c| {
                c.size.get_or_insert(size);
            });
        }
    }

    fn apply_uri(&mut self, text: &str) {
        let Some(uri) = URI.find(text).map(|m| m.as_str().to_string()) else {
            return;
        };
        let socket = SOCKET_PARAM.captures(&uri).map(|caps| caps[1].to_string());

        let Some(socket) = socket else {
            self.with_current(|c| set_once(&mut c.uri, &uri));
            return;
        };

        if self.switch_to_socket(&socket) {
            self.with_current(|c| set_once(&mut c.uri, &uri));
            return;
        }

        // an unknown socket only names a connection still waiting for its identity
        match &mut self.current {
            Current::Pending(conn) if conn.socket.is_none() => {
                conn.socket = Some(socket);
                set_once(&mut conn.uri, &uri);
            }
            _ => {
                tracing::debug!(%uri, "nbd uri names no known nbdkit socket");
                return;
            }
        }
        self.settle();
    }

    fn apply_transport_mode(&mut self, text: &str) {
        if let Some(caps) = TRANSPORT_MODE.captures(text) {
            let mode = caps[1].to_string();
            self.with_current(|c| {
                // a value taken from the `transports=` preference list yields to the negotiated mode
                if c.transport.as_deref().is_none_or(|t| t.contains(':')) {
                    c.transport = Some(mode);
                }
            });
        }
    }
}

impl Tracker for ConnectionTracker {
    fn observe(&mut self, line: &LineView<'_>) {
        if let Some(rest) = line.text.strip_prefix(START) {
            self.start(line.number);
            self.apply_tokens(rest);
            return;
        }

        if self.in_command {
            let continues = line.is_indented() || line.text.starts_with('\'') || line.text.starts_with("LANG=");
            if continues && !line.text.is_empty() {
                self.apply_tokens(line.text);
                self.touch(line, false);
                return;
            }
            self.in_command = false;
            self.expect = None;
        }

        if line.category == LineCategory::Nbdkit {
            if matches!(self.current, Current::None) {
                self.start(line.number);
                self.in_command = false;
            }
            self.apply_debug(line.text);
            self.touch(line, true);
        }

        if line.text.contains("nbd") && URI.is_match(line.text) {
            self.apply_uri(line.text);
        }
        if TRANSPORT_MODE.is_match(line.text) {
            self.apply_transport_mode(line.text);
        }
    }
}

fn set_once(slot: &mut Option<String>, value: &str) {
    if slot.is_none() && !value.is_empty() {
        *slot = Some(value.to_string());
    }
}

fn apply_key(conn: &mut NbdkitConnection, key: &str, value: &str) {
    match key {
        "file" => set_once(&mut conn.backing_file, value),
        "server" => set_once(&mut conn.server, value),
        "vm" => set_once(&mut conn.vm, value.strip_prefix("moref=").unwrap_or(value)),
        "transports" => set_once(&mut conn.transport, value),
        "size" => {
            if conn.size.is_none() {
                conn.size = value.parse().ok();
            }
        }
        _ => {}
    }
}

fn merge(into: &mut NbdkitConnection, from: NbdkitConnection) {
    for (slot, value) in [
        (&mut into.socket, from.socket),
        (&mut into.uri, from.uri),
        (&mut into.plugin, from.plugin),
        (&mut into.backing_file, from.backing_file),
        (&mut into.server, from.server),
        (&mut into.vm, from.vm),
        (&mut into.transport, from.transport),
    ] {
        if slot.is_none() {
            *slot = value;
        }
    }
    if into.size.is_none() {
        into.size = from.size;
    }
    for filter in &from.filters {
        into.add_filter(filter);
    }
    into.start_line = into.start_line.min(from.start_line);
    into.end_line = into.end_line.max(from.end_line);
    into.log_lines.extend(from.log_lines);
}

/// `/usr/lib64/nbdkit/plugins/nbdkit-vddk-plugin.so` → `vddk`
fn plugin_name(token: &str) -> String {
    let base = token.rsplit('/').next().unwrap_or(token);
    let base = base.strip_suffix(".so").unwrap_or(base);
    let base = base.strip_prefix("nbdkit-").unwrap_or(base);
    let base = base
        .strip_suffix("-plugin")
        .or_else(|| base.strip_suffix("-filter"))
        .unwrap_or(base);
    base.to_string()
}

/// Split a command line into words, honouring single and double quotes.
fn shell_words(text: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut word = String::new();
    let mut in_word = false;
    let mut quote: Option<char> = None;
    let mut chars = text.chars();

    while let Some(ch) = chars.next() {
        match (quote, ch) {
            (Some(q), c) if c == q => quote = None,
            (Some('"'), '\\') => {
                if let Some(next) = chars.next() {
                    word.push(next);
                }
            }
            (Some(_), c) => word.push(c),
            (None, '\'' | '"') => {
                quote = Some(ch);
                in_word = true;
            }
            (None, '\\') => {
                if let Some(next) = chars.next() {
                    word.push(next);
                    in_word = true;
                }
            }
            (None, c) if c.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut word));
                    in_word = false;
                }
            }
            (None, c) => {
                word.push(c);
                in_word = true;
            }
        }
    }
    if in_word {
        words.push(word);
    }
    words
}
