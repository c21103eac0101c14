use super::{ParsedLog, print_json};
use crate::render::{Palette, SummaryReport, render_summary};
use crate::types::OutputFormat;
use anyhow::Result;

pub fn handle(logs: &[ParsedLog], format: OutputFormat, palette: Palette) -> Result<()> {
    for log in logs {
        match format {
            OutputFormat::Json => {
                print_json(&SummaryReport::new(log.label.clone(), &log.output), false)?
            }
            OutputFormat::Plain => print!("{}", render_summary(&log.label, &log.output, palette)),
        }
    }
    Ok(())
}
