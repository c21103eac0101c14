//! Assertions over the JSON emitted by `v2vtrace parse`.

use anyhow::{Context, Result};
use serde_json::Value;

fn runs(json: &Value) -> Result<&Vec<Value>> {
    json["tool_runs"]
        .as_array()
        .context("Expected 'tool_runs' array in JSON")
}

/// Assert the number of tool runs.
pub fn assert_run_count(json: &Value, expected: usize) -> Result<()> {
    let runs = runs(json)?;
    if runs.len() != expected {
        anyhow::bail!("Expected {} tool runs, got {}", expected, runs.len());
    }
    Ok(())
}

/// Assert the tool identities of the runs, in order.
pub fn assert_tool_sequence(json: &Value, expected: &[&str]) -> Result<()> {
    let tools = runs(json)?
        .iter()
        .enumerate()
        .map(|(i, run)| {
            run["tool"]
                .as_str()
                .with_context(|| format!("Run {} missing tool", i))
        })
        .collect::<Result<Vec<_>>>()?;

    if tools != expected {
        anyhow::bail!("Expected tools {:?}, got {:?}", expected, tools);
    }
    Ok(())
}

/// Assert that every run carries one category per line of its range.
pub fn assert_categories_cover_lines(json: &Value) -> Result<()> {
    for (i, run) in runs(json)?.iter().enumerate() {
        let start = run["start_line"].as_u64().with_context(|| format!("Run {} missing start_line", i))?;
        let end = run["end_line"].as_u64().with_context(|| format!("Run {} missing end_line", i))?;
        let categories = run["line_categories"]
            .as_array()
            .with_context(|| format!("Run {} missing line_categories", i))?;

        if categories.len() as u64 != end + 1 - start {
            anyhow::bail!(
                "Run {} covers lines {}..={} but has {} categories",
                i,
                start,
                end,
                categories.len()
            );
        }
    }
    Ok(())
}
