use super::{Palette, finish, table_line};
use qmdverify_types::{HashtablesResponse, TreesResponse, VersionResponse};

/// Columns start at these widths and grow to fit their content.
fn column_widths<'a>(minimums: &[usize], rows: impl Iterator<Item = &'a [String]>) -> Vec<usize> {
    let mut widths = minimums.to_vec();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count() + 1);
        }
    }
    widths
}

fn render_table(
    title: &str,
    headers: &[&str],
    minimums: &[usize],
    rows: &[Vec<String>],
    total: String,
) -> String {
    let widths = column_widths(minimums, rows.iter().map(Vec::as_slice));
    let headers: Vec<String> = headers.iter().map(|h| h.to_string()).collect();

    let mut lines = vec![title.to_string(), String::new()];
    lines.push(table_line(&headers, &widths));
    lines.push("─".repeat(widths.iter().sum::<usize>() + widths.len()));
    lines.extend(rows.iter().map(|row| table_line(row, &widths)));
    lines.push(String::new());
    lines.push(total);
    finish(lines)
}

pub fn render_hashtables(response: &HashtablesResponse, palette: Palette) -> String {
    if response.hashtables.is_empty() {
        return format!(
            "Available Hashtables\n\n{}\n",
            palette.info("No hashtables available on the server")
        );
    }

    let rows: Vec<Vec<String>> = response
        .hashtables
        .iter()
        .map(|ht| {
            vec![
                ht.device.clone(),
                ht.os_version.clone(),
                ht.name.clone(),
                ht.entry_count.to_string(),
            ]
        })
        .collect();

    render_table(
        "Available Hashtables",
        &["Device", "OS Version", "Hashtable", "Entries"],
        &[10, 12, 25, 10],
        &rows,
        format!("Total Hashtables: {}", response.count),
    )
}

pub fn render_trees(response: &TreesResponse, palette: Palette) -> String {
    if response.trees.is_empty() {
        return format!(
            "Available Dependency Trees\n\n{}\n",
            palette.info("No dependency trees available on the server")
        );
    }

    let rows: Vec<Vec<String>> = response
        .trees
        .iter()
        .map(|tree| {
            vec![
                tree.device.clone(),
                tree.version.clone(),
                tree.qml_count.to_string(),
                tree.path.clone(),
            ]
        })
        .collect();

    render_table(
        "Available Dependency Trees",
        &["Device", "Version", "QML Files", "Path"],
        &[10, 12, 11, 30],
        &rows,
        format!("Total Trees: {}", response.count),
    )
}

/// CLI version plus the server's version, or the error that prevented
/// fetching it.
pub fn render_version(
    cli_version: &str,
    host: &str,
    server: Result<&VersionResponse, String>,
) -> String {
    let mut out = format!("qmdverify CLI\n  Version: {}\n\nServer ({})\n", cli_version, host);
    match server {
        Ok(version) => {
            out.push_str(&format!("  Version: {}\n", version.version));
            if !version.commit.is_empty() {
                out.push_str(&format!("  Commit: {}\n", version.commit));
            }
            if !version.build_time.is_empty() {
                out.push_str(&format!("  Built: {}\n", version.build_time));
            }
        }
        Err(error) => out.push_str(&format!("  Error: {}\n", error)),
    }
    out
}
