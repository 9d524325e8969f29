use super::{connect, print_json};
use crate::commands::Exit;
use crate::config::Config;
use crate::files::{collect_qmd_files, validate_device_filters};
use crate::presentation::{Palette, render_check};
use crate::types::OutputFormat;
use anyhow::{Context, Result, bail};
use qmdverify_engine::{CheckReport, FilterCriteria};
use serde::Serialize;
use std::path::PathBuf;

pub struct CheckRequest {
    pub paths: Vec<PathBuf>,
    pub devices: Vec<String>,
    pub os_versions: Vec<String>,
    pub file_patterns: Vec<String>,
    pub failed_only: bool,
}

impl CheckRequest {
    fn criteria(&self) -> FilterCriteria {
        FilterCriteria::new()
            .with_devices(self.devices.iter().cloned())
            .with_versions(self.os_versions.iter().cloned())
            .with_files(self.file_patterns.iter().cloned())
            .failed_only(self.failed_only)
    }
}

#[derive(Serialize)]
struct CheckOutput<'a> {
    host: &'a str,
    passed: bool,
    #[serde(flatten)]
    report: &'a CheckReport,
}

pub fn handle(
    config: &Config,
    request: CheckRequest,
    verbose: bool,
    format: OutputFormat,
) -> Result<Exit> {
    validate_device_filters(&request.devices)?;

    let collected = collect_qmd_files(&request.paths)?;
    for skipped in &collected.skipped_empty {
        eprintln!("Warning: Skipping empty file {}", skipped.display());
    }
    if collected.files.is_empty() {
        bail!("no .qmd files found");
    }

    let client = connect(config)?;
    let criteria = request.criteria();
    let plain = format == OutputFormat::Plain;
    tracing::debug!(endpoint = %config.api_endpoint("/api/compare"), "submitting comparison");

    let report = if let [file] = collected.files.as_slice() {
        if plain {
            let name = file
                .path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            println!("Uploading {} to {}...\n", name, config.server_host);
        }

        let response = client
            .compare_file(&file.path)
            .context("failed to check compatibility")?;
        CheckReport::single(&response, &criteria)
    } else {
        if plain {
            println!(
                "Uploading {} files to {}...\n",
                collected.files.len(),
                config.server_host
            );
        }

        let batch = client
            .compare_files(&collected.files)
            .context("failed to check compatibility")?;
        CheckReport::batch(&batch, &criteria)
    };

    let passed = report.passed();
    match format {
        OutputFormat::Json => print_json(&CheckOutput {
            host: &config.server_host,
            passed,
            report: &report,
        })?,
        OutputFormat::Plain => print!("{}", render_check(&report, verbose, Palette::detect())),
    }

    Ok(if passed { Exit::Success } else { Exit::Incompatible })
}
