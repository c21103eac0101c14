use super::{ParsedLog, print_json};
use crate::render::{CategoriesReport, Palette, render_categories};
use crate::types::OutputFormat;
use anyhow::Result;

pub fn handle(logs: &[ParsedLog], format: OutputFormat, palette: Palette) -> Result<()> {
    for log in logs {
        match format {
            OutputFormat::Json => {
                print_json(&CategoriesReport::new(log.label.clone(), &log.output), false)?
            }
            OutputFormat::Plain => print!("{}", render_categories(&log.label, &log.output, palette)),
        }
    }
    Ok(())
}
