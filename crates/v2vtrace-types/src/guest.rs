use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Windows drive letter assignment (`C => /dev/sda2`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriveMapping {
    pub letter: String,
    pub device: String,
}

/// Linux `/etc/fstab` entry as reported by inspection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FstabEntry {
    pub device: String,
    pub mountpoint: String,
}

/// Filesystem found by inspection (`fs: /dev/sda1 (xfs) role: root`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilesystemEntry {
    pub device: String,
    pub fs_type: String,
    pub role: String,
}

/// Device line of the shape `/dev/sda1: UUID="..." TYPE="xfs"`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockDevice {
    pub device: String,
    pub attributes: BTreeMap<String, String>,
}

impl BlockDevice {
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }
}

/// Installed application (one `app2_*` record)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arch: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub install_path: Option<String>,
    /// Remaining `app2_*` fields, keyed without the prefix
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowsInfo {
    pub system_root: Option<String>,
    pub current_control_set: Option<String>,
    #[serde(default)]
    pub drive_mappings: Vec<DriveMapping>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinuxInfo {
    pub package_format: Option<String>,
    pub package_management: Option<String>,
    #[serde(default)]
    pub fstab: Vec<FstabEntry>,
}

/// Source VM hardware as printed by `--print-source`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VmMetadata {
    pub name: Option<String>,
    pub hypervisor: Option<String>,
    pub genid: Option<String>,
    pub memory_bytes: Option<u64>,
    pub vcpus: Option<u32>,
    pub cpu_vendor: Option<String>,
    pub cpu_model: Option<String>,
    pub cpu_topology: Option<String>,
    pub firmware: Option<String>,
}

impl VmMetadata {
    pub fn is_empty(&self) -> bool {
        *self == VmMetadata::default()
    }
}

/// Everything learned about the guest operating system and its disks
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuestInfo {
    pub root_device: Option<String>,
    pub os_type: Option<String>,
    pub distro: Option<String>,
    pub major_version: Option<u32>,
    pub minor_version: Option<u32>,
    pub arch: Option<String>,
    pub hostname: Option<String>,
    pub product_name: Option<String>,
    pub product_variant: Option<String>,
    pub osinfo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub windows: Option<WindowsInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linux: Option<LinuxInfo>,
    #[serde(default)]
    pub filesystems: Vec<FilesystemEntry>,
    #[serde(default)]
    pub block_devices: Vec<BlockDevice>,
    #[serde(default)]
    pub applications: Vec<Application>,
    #[serde(default, skip_serializing_if = "VmMetadata::is_empty")]
    pub vm: VmMetadata,
}

impl GuestInfo {
    /// `major.minor` when a major version is known
    pub fn version_string(&self) -> Option<String> {
        self.major_version
            .map(|major| format!("{}.{}", major, self.minor_version.unwrap_or(0)))
    }

    pub fn is_windows(&self) -> bool {
        self.os_type.as_deref() == Some("windows")
    }
}
