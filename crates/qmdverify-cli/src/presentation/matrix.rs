use super::{Palette, finish};
use qmdverify_engine::{Cell, CheckReport, CompatibilityMatrix, FileOutcome};
use qmdverify_types::ComparisonResponse;

const TITLE: &str = "QMD Compatibility Check Results";
const MIN_DEVICE_WIDTH: usize = 6;
const MIN_VERSION_WIDTH: usize = 15;

const MARK_COMPATIBLE: &str = "✓";
const MARK_INCOMPATIBLE: &str = "✗";
const MARK_NO_DATA: &str = "-";

/// Version x device grid for one response, followed by a summary line.
pub fn render_comparison(response: &ComparisonResponse, verbose: bool, palette: Palette) -> String {
    let matrix = CompatibilityMatrix::build(response);
    if matrix.is_empty() {
        return format!("{}\n", palette.info("No compatibility data available"));
    }

    let versions = matrix.versions();
    let devices = matrix.devices();

    let device_width = devices
        .iter()
        .map(|d| d.chars().count())
        .fold(MIN_DEVICE_WIDTH, usize::max);
    let version_width = versions
        .iter()
        .map(|v| v.chars().count())
        .fold(MIN_VERSION_WIDTH, usize::max);
    let table_width = version_width + 2 + device_width * devices.len();

    let mut lines = vec![
        String::new(),
        format!("{:^table_width$}", TITLE),
        String::new(),
    ];

    let header: String = devices
        .iter()
        .map(|d| format!("{:^device_width$}", d))
        .collect();
    lines.push(format!(" {:version_width$} {}", "", header));
    lines.push("─".repeat(table_width));

    for version in &versions {
        let cells: String = devices
            .iter()
            .map(|device| {
                let pad = |mark: &str| format!("{:^device_width$}", mark);
                match matrix.cell(version, device) {
                    Some(Cell::Compatible) => palette.compatible(&pad(MARK_COMPATIBLE)),
                    Some(Cell::Incompatible { .. }) => palette.incompatible(&pad(MARK_INCOMPATIBLE)),
                    None => palette.muted(&pad(MARK_NO_DATA)),
                }
            })
            .collect();
        lines.push(format!(" {:<version_width$} {}", version, cells));
    }

    if verbose {
        let details = matrix.error_details();
        if !details.is_empty() {
            lines.push(String::new());
            lines.push(palette.error("Error Details:"));
            for (version, device, detail) in details {
                lines.push(palette.error(&format!("  • {} ({}): {}", version, device, detail)));
            }
        }
    }

    lines.push(String::new());
    lines.push(summary(response, palette));
    finish(lines)
}

fn summary(response: &ComparisonResponse, palette: Palette) -> String {
    let compatible = format!("{} compatible", response.compatible.len());
    let incompatible = format!("{} incompatible", response.incompatible.len());

    let compatible = if response.compatible.is_empty() {
        compatible
    } else {
        palette.compatible(&compatible)
    };
    let incompatible = if response.incompatible.is_empty() {
        incompatible
    } else {
        palette.incompatible(&incompatible)
    };

    format!(
        "Summary: {} checked | {} | {}",
        response.total_checked, compatible, incompatible
    )
}

/// Every shown file of a check report. Batch entries get a `=== name ===`
/// heading; an empty outcome prints its advisory instead of a grid.
pub fn render_check(report: &CheckReport, verbose: bool, palette: Palette) -> String {
    let mut out = String::new();

    if report.roots_empty {
        out.push_str(
            "Warning: every uploaded file is imported by another uploaded file; no root files to show\n",
        );
    }

    for entry in &report.files {
        if let Some(name) = &entry.name {
            out.push_str(&format!("\n=== {} ===\n\n", name));
        }

        match &entry.outcome {
            FileOutcome::Empty(reason) => {
                out.push_str(&format!("Warning: {}\n", reason.advisory()));
            }
            FileOutcome::Results(response) => {
                out.push_str(&render_comparison(response, verbose, palette));
            }
        }
    }

    if verbose && !report.dependencies.is_empty() {
        out.push_str(&format!(
            "\n{}\n",
            palette.muted(&format!(
                "Validated as dependencies: {}",
                report.dependencies.join(", ")
            ))
        ));
    }

    out
}
