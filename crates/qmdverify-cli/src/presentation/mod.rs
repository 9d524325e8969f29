//! Plain-text rendering. Every renderer returns a `String`; callers print.

pub mod catalog;
pub mod matrix;

use is_terminal::IsTerminal;
use owo_colors::OwoColorize;

pub use catalog::{render_hashtables, render_trees, render_version};
pub use matrix::{render_check, render_comparison};

/// Styling for terminal output. `plain()` renders without escape codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    color: bool,
}

impl Palette {
    pub fn plain() -> Self {
        Self { color: false }
    }

    pub fn colored() -> Self {
        Self { color: true }
    }

    /// Color only when stdout is a terminal and `NO_COLOR` is unset.
    pub fn detect() -> Self {
        Self {
            color: std::io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none(),
        }
    }

    pub fn compatible(&self, text: &str) -> String {
        if self.color {
            text.green().bold().to_string()
        } else {
            text.to_string()
        }
    }

    pub fn incompatible(&self, text: &str) -> String {
        if self.color {
            text.red().bold().to_string()
        } else {
            text.to_string()
        }
    }

    pub fn muted(&self, text: &str) -> String {
        if self.color {
            text.bright_black().to_string()
        } else {
            text.to_string()
        }
    }

    pub fn info(&self, text: &str) -> String {
        if self.color {
            text.cyan().to_string()
        } else {
            text.to_string()
        }
    }

    pub fn error(&self, text: &str) -> String {
        if self.color {
            text.bright_red().italic().to_string()
        } else {
            text.to_string()
        }
    }
}

/// Left-aligned cells padded to their column width, one leading space.
fn table_line(cells: &[String], widths: &[usize]) -> String {
    let line: String = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
        .collect();
    format!(" {}", line)
}

/// Joins lines with `\n`, dropping trailing spaces from each.
fn finish(lines: Vec<String>) -> String {
    let mut out = String::new();
    for line in lines {
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}
