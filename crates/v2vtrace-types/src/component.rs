use serde::{Deserialize, Serialize};

/// Version announced by one component of the toolchain (virt-v2v, libguestfs, nbdkit, ...)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentVersion {
    pub component: String,
    pub version: String,
    pub line: usize,
}
