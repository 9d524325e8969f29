//! Assertions over `qmdverify check --format json` output.

use anyhow::{Context, Result};
use serde_json::Value;

/// Names of the files shown in a batch report, in output order.
pub fn shown_files(json: &Value) -> Result<Vec<String>> {
    let files = json["files"]
        .as_array()
        .context("Expected 'files' array in JSON")?;

    files
        .iter()
        .enumerate()
        .map(|(i, f)| {
            f["name"]
                .as_str()
                .map(String::from)
                .with_context(|| format!("File entry {} missing name", i))
        })
        .collect()
}

pub fn assert_shown_files(json: &Value, expected: &[&str]) -> Result<()> {
    let shown = shown_files(json)?;
    if shown != expected {
        anyhow::bail!("Expected files {:?}, got {:?}", expected, shown);
    }
    Ok(())
}

/// Assert the `outcome` of every shown file.
pub fn assert_outcomes(json: &Value, expected: &str) -> Result<()> {
    let files = json["files"]
        .as_array()
        .context("Expected 'files' array in JSON")?;

    for (i, file) in files.iter().enumerate() {
        let outcome = file["outcome"]
            .as_str()
            .with_context(|| format!("File entry {} missing outcome", i))?;
        if outcome != expected {
            anyhow::bail!("File entry {} has outcome {} but expected {}", i, outcome, expected);
        }
    }
    Ok(())
}

/// Count of incompatible rows across every shown file.
pub fn incompatible_count(json: &Value) -> Result<usize> {
    let files = json["files"]
        .as_array()
        .context("Expected 'files' array in JSON")?;

    Ok(files
        .iter()
        .filter_map(|f| f["detail"]["incompatible"].as_array())
        .map(Vec::len)
        .sum())
}
