use super::{ParsedLog, print_json};
use crate::render::ParseReport;
use anyhow::Result;

pub fn handle(logs: &[ParsedLog], pretty: bool) -> Result<()> {
    for log in logs {
        let report = ParseReport {
            path: log.label.clone(),
            output: &log.output,
        };
        print_json(&report, pretty)?;
    }
    Ok(())
}
