use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CopyOrigin {
    /// The file was read first and written back (possibly edited)
    Modified,
    /// The file was written without a preceding read
    Generated,
}

/// File written into the guest, paired with the read that preceded it when there was one
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileCopy {
    pub path: String,
    pub origin: CopyOrigin,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_line: Option<usize>,
    pub write_line: usize,
    /// Size before the trace truncated the payload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_size: Option<u64>,
    /// Decoded content (text-like destinations only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Content was recognised as binary and discarded
    #[serde(default)]
    pub binary: bool,
}
