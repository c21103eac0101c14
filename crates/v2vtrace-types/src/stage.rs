use serde::{Deserialize, Serialize};

/// Progress marker printed by the conversion pipeline, e.g. `[  12.3] Opening the source`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineStage {
    pub name: String,
    /// Seconds since the tool started, as printed inside the brackets
    pub elapsed_secs: f64,
    /// Absolute (post-preprocessing) line number
    pub line: usize,
}
