use serde::{Deserialize, Serialize};

/// nbdkit instance exposing a source or destination disk over NBD
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NbdkitConnection {
    /// Socket path, or a `nbdkit-<seq>` placeholder when no socket was logged
    pub id: String,
    pub socket: Option<String>,
    pub uri: Option<String>,
    pub plugin: Option<String>,
    #[serde(default)]
    pub filters: Vec<String>,
    pub backing_file: Option<String>,
    pub server: Option<String>,
    pub vm: Option<String>,
    pub transport: Option<String>,
    /// Size in bytes reported by the plugin
    pub size: Option<u64>,
    pub start_line: usize,
    pub end_line: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub log_lines: Vec<String>,
}

impl NbdkitConnection {
    pub fn add_filter(&mut self, filter: &str) {
        if !self.filters.iter().any(|f| f == filter) {
            self.filters.push(filter.to_string());
        }
    }
}

/// Per-disk view derived from a connection, in discovery order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiskSummary {
    pub index: usize,
    pub connection_id: String,
    pub socket: Option<String>,
    pub plugin: Option<String>,
    pub backing_file: Option<String>,
    pub size: Option<u64>,
    pub transport: Option<String>,
}

impl From<(usize, &NbdkitConnection)> for DiskSummary {
    fn from((index, conn): (usize, &NbdkitConnection)) -> Self {
        Self {
            index,
            connection_id: conn.id.clone(),
            socket: conn.socket.clone(),
            plugin: conn.plugin.clone(),
            backing_file: conn.backing_file.clone(),
            size: conn.size,
            transport: conn.transport.clone(),
        }
    }
}
