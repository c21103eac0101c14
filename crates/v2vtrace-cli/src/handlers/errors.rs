use super::{ParsedLog, print_json};
use crate::render::{ErrorsReport, Palette, render_errors};
use crate::types::OutputFormat;
use anyhow::Result;

pub fn handle(
    logs: &[ParsedLog],
    errors_only: bool,
    format: OutputFormat,
    palette: Palette,
) -> Result<()> {
    for log in logs {
        match format {
            OutputFormat::Json => print_json(
                &ErrorsReport::new(log.label.clone(), &log.output, errors_only),
                false,
            )?,
            OutputFormat::Plain => {
                print!("{}", render_errors(&log.label, &log.output, errors_only, palette))
            }
        }
    }
    Ok(())
}
