//! Guest operating-system facts from inspection output.

pub mod apps;
pub mod mappings;
pub mod version;

use super::{LineView, Tracker};
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;
use v2vtrace_types::{
    BlockDevice, FilesystemEntry, GuestInfo, LineCategory, LinuxInfo, VmMetadata, WindowsInfo,
};

/// `i_root = /dev/sda2`
static FLAT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^i_(\w+) = ?(.*)$").unwrap());

/// `fs: /dev/sda2 (xfs) role: root`
static FS_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^fs: (\S+) \(([^)]*)\) role: (\S+)").unwrap());

static FS_FIELD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\w+): ?(.*)$").unwrap());

/// `/dev/sda1: UUID="..." TYPE="xfs" PARTUUID="..."`
static BLKID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^(/dev/[\w/.-]+): ((?:\s*[A-Z_]+="[^"]*")+)\s*$"#).unwrap()
});

static BLKID_ATTR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"([A-Z_]+)="([^"]*)""#).unwrap());

static VM_FIELD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(source name|hypervisor type|VM genid|memory|nr vCPUs|CPU vendor|CPU model|CPU topology|firmware):\s*(.*)$",
    )
    .unwrap()
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Block {
    None,
    Filesystem { root: bool },
    Apps,
}

#[derive(Debug)]
pub struct GuestTracker {
    fields: BTreeMap<String, String>,
    filesystems: Vec<FilesystemEntry>,
    block_devices: Vec<BlockDevice>,
    apps_text: String,
    vm: VmMetadata,
    block: Block,
}

impl Default for GuestTracker {
    fn default() -> Self {
        Self {
            fields: BTreeMap::new(),
            filesystems: Vec::new(),
            block_devices: Vec::new(),
            apps_text: String::new(),
            vm: VmMetadata::default(),
            block: Block::None,
        }
    }
}

impl GuestTracker {
    pub fn new() -> Self {
        Self::default()
    }

    fn set_field(&mut self, key: &str, value: &str) {
        let value = value.trim();
        if value.is_empty() {
            return;
        }
        let key = match key {
            "systemroot" => "windows_systemroot",
            "current_control_set" => "windows_current_control_set",
            k => k,
        };
        self.fields
            .entry(key.to_string())
            .or_insert_with(|| value.to_string());
    }

    fn field(&self, key: &str) -> Option<String> {
        self.fields.get(key).cloned()
    }

    fn add_block_device(&mut self, device: &str, attrs: &str) {
        let idx = match self.block_devices.iter().position(|d| d.device == device) {
            Some(idx) => idx,
            None => {
                self.block_devices.push(BlockDevice {
                    device: device.to_string(),
                    attributes: BTreeMap::new(),
                });
                self.block_devices.len() - 1
            }
        };
        let attributes = &mut self.block_devices[idx].attributes;
        for caps in BLKID_ATTR.captures_iter(attrs) {
            attributes
                .entry(caps[1].to_string())
                .or_insert_with(|| caps[2].to_string());
        }
    }

    fn set_vm_field(&mut self, key: &str, value: &str) {
        let value = value.trim();
        if value.is_empty() {
            return;
        }
        let vm = &mut self.vm;
        let text = || Some(value.to_string());
        match key {
            "source name" => vm.name = vm.name.take().or_else(text),
            "hypervisor type" => vm.hypervisor = vm.hypervisor.take().or_else(text),
            "VM genid" => vm.genid = vm.genid.take().or_else(text),
            "memory" => {
                if vm.memory_bytes.is_none() {
                    vm.memory_bytes = leading_digits(value).and_then(|d| d.parse().ok());
                }
            }
            "nr vCPUs" => {
                if vm.vcpus.is_none() {
                    vm.vcpus = leading_digits(value).and_then(|d| d.parse().ok());
                }
            }
            "CPU vendor" => vm.cpu_vendor = vm.cpu_vendor.take().or_else(text),
            "CPU model" => vm.cpu_model = vm.cpu_model.take().or_else(text),
            "CPU topology" => vm.cpu_topology = vm.cpu_topology.take().or_else(text),
            "firmware" => vm.firmware = vm.firmware.take().or_else(text),
            _ => {}
        }
    }

    /// Lines that continue a multi-line `i_apps` value.
    fn continues_apps(line: &LineView<'_>) -> bool {
        let text = line.text;
        !text.is_empty()
            && !text.starts_with("i_")
            && (line.is_indented()
                || text.starts_with(['[', ']', '{', '}'])
                || text.starts_with("app2_"))
    }

    pub fn finish(self) -> Option<GuestInfo> {
        let nothing_seen = self.fields.is_empty()
            && self.filesystems.is_empty()
            && self.block_devices.is_empty()
            && self.apps_text.is_empty()
            && self.vm.is_empty();
        if nothing_seen {
            return None;
        }

        let (major_version, minor_version) = version::resolve_version(
            self.fields.get("major_version").map(String::as_str),
            self.fields.get("minor_version").map(String::as_str),
            self.fields.get("cpe").map(String::as_str),
            self.fields.get("version").map(String::as_str),
        );

        let os_type = self.field("type");

        let drive_mappings = self
            .fields
            .get("drive_mappings")
            .map(|text| mappings::drive_mappings(text))
            .unwrap_or_default();
        let windows = WindowsInfo {
            system_root: self.field("windows_systemroot"),
            current_control_set: self.field("windows_current_control_set"),
            drive_mappings,
        };
        let has_windows = os_type.as_deref() == Some("windows")
            || windows != WindowsInfo::default();

        let fstab = match (self.fields.get("fstab"), self.fields.get("mountpoints")) {
            (Some(text), _) => mappings::fstab(text, true),
            (None, Some(text)) => mappings::fstab(text, false),
            (None, None) => Vec::new(),
        };
        let linux = LinuxInfo {
            package_format: self.field("package_format"),
            package_management: self.field("package_management"),
            fstab,
        };
        let has_linux = os_type.as_deref() == Some("linux") || linux != LinuxInfo::default();

        Some(GuestInfo {
            root_device: self.field("root"),
            distro: self.field("distro"),
            major_version,
            minor_version,
            arch: self.field("arch"),
            hostname: self.field("hostname"),
            product_name: self.field("product_name"),
            product_variant: self.field("product_variant"),
            osinfo: self.field("osinfo"),
            windows: has_windows.then_some(windows),
            linux: has_linux.then_some(linux),
            filesystems: self.filesystems,
            block_devices: self.block_devices,
            applications: apps::parse_apps(&self.apps_text),
            vm: self.vm,
            os_type,
        })
    }
}

impl Tracker for GuestTracker {
    fn observe(&mut self, line: &LineView<'_>) {
        let text = line.text;

        match self.block {
            Block::Apps if Self::continues_apps(line) => {
                self.apps_text.push('\n');
                self.apps_text.push_str(text);
                return;
            }
            Block::Filesystem { root } if line.is_indented() && !text.is_empty() => {
                if root && let Some(caps) = FS_FIELD.captures(text) {
                    self.set_field(&caps[1], &caps[2]);
                }
                return;
            }
            _ => self.block = Block::None,
        }

        if !matches!(line.category, LineCategory::Other | LineCategory::Info) {
            return;
        }

        if let Some(caps) = FLAT.captures(text) {
            let (key, value) = (&caps[1], &caps[2]);
            if key == "apps" {
                self.block = Block::Apps;
                self.apps_text.push_str(value);
            } else {
                self.set_field(key, value);
            }
        } else if let Some(caps) = FS_HEADER.captures(text) {
            let role = caps[3].to_string();
            let root = role == "root";
            if root {
                self.set_field("root", &caps[1]);
            }
            self.filesystems.push(FilesystemEntry {
                device: caps[1].to_string(),
                fs_type: caps[2].to_string(),
                role,
            });
            self.block = Block::Filesystem { root };
        } else if let Some(caps) = BLKID.captures(text) {
            self.add_block_device(&caps[1], &caps[2]);
        } else if let Some(caps) = VM_FIELD.captures(text) {
            self.set_vm_field(&caps[1], &caps[2]);
        }
    }
}

fn leading_digits(text: &str) -> Option<&str> {
    let end = text.find(|c: char| !c.is_ascii_digit()).unwrap_or(text.len());
    (end > 0).then(|| &text[..end])
}
