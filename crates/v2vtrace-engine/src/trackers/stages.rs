use super::{LineView, Tracker};
use regex::Regex;
use std::sync::LazyLock;
use v2vtrace_types::{ExitStatus, LineCategory, PipelineStage};

static STAGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\[\s*(\d+(?:\.\d+)?)\s*\]\s+(.+?)\s*$").unwrap());

static MONITOR_FINISHED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\w-]+ monitoring: Finished\b").unwrap());

const FINAL_STAGE: &str = "Finishing off";

pub fn parse_stage(text: &str, line: usize) -> Option<PipelineStage> {
    let caps = STAGE.captures(text)?;
    let elapsed_secs = caps[1].parse().ok()?;
    Some(PipelineStage {
        name: caps[2].to_string(),
        elapsed_secs,
        line,
    })
}

/// Collects progress stages and the success signal for a run.
#[derive(Debug, Default)]
pub struct StageTracker {
    stages: Vec<PipelineStage>,
    success_marker: bool,
}

impl StageTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stages(&self) -> &[PipelineStage] {
        &self.stages
    }

    pub fn exit_status(&self, has_error: bool) -> ExitStatus {
        infer_exit_status(&self.stages, self.success_marker, has_error)
    }

    pub fn into_stages(self) -> Vec<PipelineStage> {
        self.stages
    }
}

impl Tracker for StageTracker {
    fn observe(&mut self, line: &LineView<'_>) {
        if line.category == LineCategory::Stage
            && let Some(stage) = parse_stage(line.text, line.number)
        {
            self.stages.push(stage);
            return;
        }

        if !self.success_marker && MONITOR_FINISHED.is_match(line.text) {
            self.success_marker = true;
        }
    }
}

/// Final run status.
///
/// Priority:
/// - Success: a `Finishing off` stage or a monitor `Finished` line, even when errors were logged
/// - Error: at least one error-level diagnostic
/// - InProgress: stages were seen but the run never finished
/// - Unknown: nothing to go on
pub fn infer_exit_status(stages: &[PipelineStage], success_marker: bool, has_error: bool) -> ExitStatus {
    if success_marker || stages.iter().any(|s| s.name == FINAL_STAGE) {
        return ExitStatus::Success;
    }
    if has_error {
        return ExitStatus::Error;
    }
    if !stages.is_empty() {
        return ExitStatus::InProgress;
    }
    ExitStatus::Unknown
}
