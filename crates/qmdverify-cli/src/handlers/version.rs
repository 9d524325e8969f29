use super::{connect, print_json};
use crate::config::Config;
use crate::presentation::render_version;
use crate::types::OutputFormat;
use anyhow::Result;
use serde_json::json;

const CLI_VERSION: &str = env!("CARGO_PKG_VERSION");

/// A server failure is reported inline and never fails the command.
pub fn handle(config: &Config, format: OutputFormat) -> Result<()> {
    let server = connect(config)
        .and_then(|client| Ok(client.server_version()?))
        .map_err(|e| format!("{:#}", e));

    if let Err(error) = &server {
        tracing::info!(%error, "server version unavailable");
    }

    match format {
        OutputFormat::Json => {
            let server_json = match &server {
                Ok(version) => json!({
                    "host": config.server_host,
                    "version": version.version,
                    "commit": version.commit,
                    "build_time": version.build_time,
                }),
                Err(error) => json!({ "host": config.server_host, "error": error }),
            };
            print_json(&json!({
                "cli": { "version": CLI_VERSION },
                "server": server_json,
            }))?;
        }
        OutputFormat::Plain => {
            print!(
                "{}",
                render_version(CLI_VERSION, &config.server_host, server.as_ref().map_err(Clone::clone))
            );
        }
    }

    Ok(())
}
