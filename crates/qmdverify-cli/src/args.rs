use crate::types::{LogLevel, OutputFormat};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const ABOUT_LONG: &str = "qmdverify checks QMD patch files against reMarkable firmware \
hashtables on a qmd-check server.

Upload a .qmd file (or a directory of them) to see which device types and OS \
versions it is compatible with. The exit status is 1 when any shown result is \
incompatible.";

#[derive(Parser, Debug)]
#[command(name = "qmdverify")]
#[command(about = "QMD file compatibility checker for reMarkable devices")]
#[command(long_about = ABOUT_LONG)]
#[command(version)]
#[command(after_help = "Examples:
  qmdverify myfile.qmd
  qmdverify myfile.qmd --verbose
  qmdverify --device rmpp --os-version 3.22 myfile.qmd
  qmdverify check ./qmd-files/ --failed-only
  qmdverify list")]
pub struct Cli {
    /// Show detailed error messages for incompatible devices
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Server address (overrides QMDVERIFY_HOST and the config file)
    #[arg(long, global = true, value_name = "URL")]
    pub host: Option<String>,

    #[arg(long, default_value = "plain", global = true)]
    pub format: OutputFormat,

    #[arg(long, default_value = "warn", global = true)]
    pub log_level: LogLevel,

    /// QMD file to check (shorthand for `qmdverify check FILE`)
    #[arg(value_name = "FILE")]
    pub file: Option<PathBuf>,

    #[command(flatten)]
    pub filters: FilterArgs,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Result filters shared by the root shorthand and `check`.
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterArgs {
    /// Filter by device (repeatable: rm1, rm2, rmpp, rmppm)
    #[arg(short = 'd', long = "device", value_name = "DEVICE", value_delimiter = ',')]
    pub devices: Vec<String>,

    /// Filter by OS version prefix (repeatable, e.g. 3.22 or 3.22.4.2)
    #[arg(long = "os-version", value_name = "PREFIX", value_delimiter = ',')]
    pub os_versions: Vec<String>,
}

impl FilterArgs {
    pub fn merge(mut self, other: FilterArgs) -> Self {
        self.devices.extend(other.devices);
        self.os_versions.extend(other.os_versions);
        self
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check QMD file compatibility
    #[command(long_about = "Upload one or more .qmd files (or directories containing them) \
to check compatibility across reMarkable device types and OS versions.

Several files are sent as one batch; files that are imported by another \
uploaded file are validated through their importer and not shown separately.")]
    Check {
        /// Files and/or directories to check
        #[arg(required = true, value_name = "PATH")]
        paths: Vec<PathBuf>,

        #[command(flatten)]
        filters: FilterArgs,

        /// Only show files whose name matches (repeatable; glob or substring)
        #[arg(short = 'f', long = "file", value_name = "PATTERN")]
        files: Vec<String>,

        /// Only show files with incompatibilities
        #[arg(long)]
        failed_only: bool,
    },

    /// List hashtables available on the server
    List,

    /// List dependency trees available on the server
    Trees,

    /// Show CLI and server version
    Version,
}
