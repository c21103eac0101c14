use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::{
    ApiCall, ComponentVersion, DiskSummary, Error, FileCopy, GuestCommand, GuestInfo,
    HivexAccess, LineCategory, NbdkitConnection, PipelineStage, V2VError,
};

/// Identity of the tool that produced a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ToolKind {
    #[serde(rename = "virt-v2v")]
    VirtV2v,
    #[serde(rename = "virt-v2v-in-place")]
    InPlace,
    #[serde(rename = "virt-v2v-inspector")]
    Inspector,
    #[serde(rename = "virt-v2v-customize")]
    Customize,
}

impl ToolKind {
    pub const ALL: [ToolKind; 4] = [
        ToolKind::VirtV2v,
        ToolKind::InPlace,
        ToolKind::Inspector,
        ToolKind::Customize,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ToolKind::VirtV2v => "virt-v2v",
            ToolKind::InPlace => "virt-v2v-in-place",
            ToolKind::Inspector => "virt-v2v-inspector",
            ToolKind::Customize => "virt-v2v-customize",
        }
    }
}

impl Default for ToolKind {
    fn default() -> Self {
        Self::VirtV2v
    }
}

impl fmt::Display for ToolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ToolKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ToolKind::ALL
            .iter()
            .copied()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| Error::UnknownTool(s.to_string()))
    }
}

/// Final status inferred for a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitStatus {
    Success,
    Error,
    InProgress,
    Unknown,
}

impl fmt::Display for ExitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitStatus::Success => write!(f, "success"),
            ExitStatus::Error => write!(f, "error"),
            ExitStatus::InProgress => write!(f, "in_progress"),
            ExitStatus::Unknown => write!(f, "unknown"),
        }
    }
}

/// One invocation of one tool and everything extracted from its section of the log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolRun {
    pub tool: ToolKind,
    /// Raw text between the brackets of the invocation marker
    pub args: String,
    pub exit_status: ExitStatus,
    /// First line of the section (absolute, inclusive)
    pub start_line: usize,
    /// Last line of the section (absolute, inclusive)
    pub end_line: usize,
    /// Line of the `Building command:` marker; `None` for an implicit run
    pub invocation_line: Option<usize>,
    pub started_at: Option<DateTime<FixedOffset>>,
    pub finished_at: Option<DateTime<FixedOffset>>,
    pub stages: Vec<PipelineStage>,
    pub api_calls: Vec<ApiCall>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub orphan_commands: Vec<GuestCommand>,
    pub hivex_accesses: Vec<HivexAccess>,
    pub connections: Vec<NbdkitConnection>,
    pub disks: Vec<DiskSummary>,
    pub guest: Option<GuestInfo>,
    pub file_copies: Vec<FileCopy>,
    pub errors: Vec<V2VError>,
    pub components: Vec<ComponentVersion>,
    pub line_categories: Vec<LineCategory>,
}

impl ToolRun {
    /// Run carrying only identity and extent (used when a section could not be parsed)
    pub fn empty(
        tool: ToolKind,
        args: impl Into<String>,
        start_line: usize,
        end_line: usize,
        invocation_line: Option<usize>,
    ) -> Self {
        Self {
            tool,
            args: args.into(),
            exit_status: ExitStatus::Unknown,
            start_line,
            end_line,
            invocation_line,
            started_at: None,
            finished_at: None,
            stages: Vec::new(),
            api_calls: Vec::new(),
            orphan_commands: Vec::new(),
            hivex_accesses: Vec::new(),
            connections: Vec::new(),
            disks: Vec::new(),
            guest: None,
            file_copies: Vec::new(),
            errors: Vec::new(),
            components: Vec::new(),
            line_categories: vec![LineCategory::Other; (end_line + 1).saturating_sub(start_line)],
        }
    }

    pub fn line_count(&self) -> usize {
        self.end_line + 1 - self.start_line
    }

    pub fn is_implicit(&self) -> bool {
        self.invocation_line.is_none()
    }

    pub fn error_count(&self) -> usize {
        self.errors.iter().filter(|e| e.is_error()).count()
    }

    pub fn warning_count(&self) -> usize {
        self.errors.len() - self.error_count()
    }

    /// Elapsed time of the last stage, the closest thing the log offers to a run duration
    pub fn last_elapsed_secs(&self) -> Option<f64> {
        self.stages.last().map(|s| s.elapsed_secs)
    }

    pub fn category_counts(&self) -> BTreeMap<LineCategory, usize> {
        let mut counts = BTreeMap::new();
        for category in &self.line_categories {
            *counts.entry(*category).or_insert(0) += 1;
        }
        counts
    }
}

/// Result of parsing one log buffer
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParseOutput {
    pub tool_runs: Vec<ToolRun>,
    /// Number of lines after preprocessing
    pub total_lines: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_kind_names() {
        assert_eq!("virt-v2v-customize".parse::<ToolKind>(), Ok(ToolKind::Customize));
        assert_eq!(ToolKind::InPlace.to_string(), "virt-v2v-in-place");
        assert_eq!(
            serde_json::to_string(&ToolKind::Inspector).unwrap(),
            "\"virt-v2v-inspector\""
        );
        assert!("virt-customize".parse::<ToolKind>().is_err());
    }

    #[test]
    fn test_empty_run_extent() {
        let run = ToolRun::empty(ToolKind::VirtV2v, "", 4, 9, Some(4));
        assert_eq!(run.line_count(), 6);
        assert!(!run.is_implicit());
        assert_eq!(run.exit_status, ExitStatus::Unknown);
        assert_eq!(run.line_categories.len(), run.line_count());
        assert!(run.line_categories.iter().all(|c| *c == LineCategory::Other));
    }
}
