use anyhow::{Context, Result};
use is_terminal::IsTerminal;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{Layer, Registry, filter, fmt};

use crate::types::LogLevel;

/// Targets that log at the requested level. HTTP stack internals stay off.
const TARGETS: &[&str] = &["qmdverify_cli", "qmdverify_client", "qmdverify_engine"];

/// Install the global subscriber: human-readable events on stderr so stdout
/// stays reserved for command output.
pub fn init(level: LogLevel) -> Result<()> {
    let targets = TARGETS
        .iter()
        .fold(filter::Targets::new(), |targets, target| {
            targets.with_target(*target, level.filter())
        })
        .with_default(LevelFilter::OFF);

    let layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(false)
        .without_time()
        .with_filter(targets);

    let subscriber = Registry::default().with(layer);
    tracing::subscriber::set_global_default(subscriber).context("failed to install logger")
}
