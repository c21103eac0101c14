use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HivexMode {
    Read,
    Write,
}

impl fmt::Display for HivexMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HivexMode::Read => write!(f, "read"),
            HivexMode::Write => write!(f, "write"),
        }
    }
}

/// Registry value observed while a key was navigated
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HivexValue {
    pub name: String,
    pub value: String,
    pub line: usize,
}

/// One navigation path through a registry hive within a single open/close session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HivexAccess {
    pub hive_path: String,
    pub mode: HivexMode,
    /// Dot-delimited key path, e.g. `Microsoft.Windows NT.CurrentVersion`
    pub key_path: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<HivexValue>,
    /// First write-class line for write accesses, navigation start otherwise
    pub line: usize,
}

impl HivexAccess {
    /// Whether `other` describes the same access (used to fold repeated flushes)
    pub fn same_target(&self, other: &HivexAccess) -> bool {
        self.hive_path == other.hive_path
            && self.key_path == other.key_path
            && self.mode == other.mode
            && self.line == other.line
    }
}
