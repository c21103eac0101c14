use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::Error;

/// Label assigned to every normalized log line
///
/// Subsystem variants (`Kernel` .. `Hivex`) mark lines emitted by one layer of the
/// toolchain; the remaining variants describe the shape of the line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineCategory {
    Stage,
    Kernel,
    Libguestfs,
    Guestfsd,
    Nbdkit,
    Libnbd,
    Qemu,
    Supermin,
    Libvirt,
    Hivex,
    Monitor,
    Info,
    Command,
    StructuredData,
    Warning,
    Error,
    Other,
}

impl LineCategory {
    pub const ALL: [LineCategory; 17] = [
        LineCategory::Stage,
        LineCategory::Kernel,
        LineCategory::Libguestfs,
        LineCategory::Guestfsd,
        LineCategory::Nbdkit,
        LineCategory::Libnbd,
        LineCategory::Qemu,
        LineCategory::Supermin,
        LineCategory::Libvirt,
        LineCategory::Hivex,
        LineCategory::Monitor,
        LineCategory::Info,
        LineCategory::Command,
        LineCategory::StructuredData,
        LineCategory::Warning,
        LineCategory::Error,
        LineCategory::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LineCategory::Stage => "stage",
            LineCategory::Kernel => "kernel",
            LineCategory::Libguestfs => "libguestfs",
            LineCategory::Guestfsd => "guestfsd",
            LineCategory::Nbdkit => "nbdkit",
            LineCategory::Libnbd => "libnbd",
            LineCategory::Qemu => "qemu",
            LineCategory::Supermin => "supermin",
            LineCategory::Libvirt => "libvirt",
            LineCategory::Hivex => "hivex",
            LineCategory::Monitor => "monitor",
            LineCategory::Info => "info",
            LineCategory::Command => "command",
            LineCategory::StructuredData => "structured_data",
            LineCategory::Warning => "warning",
            LineCategory::Error => "error",
            LineCategory::Other => "other",
        }
    }

    /// True for labels naming the toolchain layer that printed the line
    pub fn is_subsystem(&self) -> bool {
        matches!(
            self,
            LineCategory::Kernel
                | LineCategory::Libguestfs
                | LineCategory::Guestfsd
                | LineCategory::Nbdkit
                | LineCategory::Libnbd
                | LineCategory::Qemu
                | LineCategory::Supermin
                | LineCategory::Libvirt
                | LineCategory::Hivex
        )
    }

    pub fn is_diagnostic(&self) -> bool {
        matches!(self, LineCategory::Warning | LineCategory::Error)
    }
}

impl fmt::Display for LineCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LineCategory {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LineCategory::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| Error::UnknownCategory(s.to_string()))
    }
}
