use crate::args::{Cli, Commands};
use crate::config::Config;
use crate::handlers;
use crate::handlers::check::CheckRequest;
use anyhow::Result;
use clap::CommandFactory;

/// How a successful run should end the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exit {
    Success,
    /// A shown result was incompatible; the process exits with status 1.
    Incompatible,
}

pub fn run(cli: Cli) -> Result<Exit> {
    let command = match cli.command {
        Some(command) => command,
        None => match cli.file {
            Some(file) => Commands::Check {
                paths: vec![file],
                filters: Default::default(),
                files: Vec::new(),
                failed_only: false,
            },
            None => {
                Cli::command().print_help()?;
                println!();
                return Ok(Exit::Success);
            }
        },
    };

    let config = Config::resolve(cli.host.as_deref())?;
    tracing::debug!(host = %config.server_host, source = ?config.source, "resolved server address");

    match command {
        Commands::Check {
            paths,
            filters,
            files,
            failed_only,
        } => {
            let filters = cli.filters.merge(filters);
            let request = CheckRequest {
                paths,
                devices: filters.devices,
                os_versions: filters.os_versions,
                file_patterns: files,
                failed_only,
            };
            handlers::check::handle(&config, request, cli.verbose, cli.format)
        }
        Commands::List => handlers::list::handle(&config, cli.format).map(|_| Exit::Success),
        Commands::Trees => handlers::trees::handle(&config, cli.format).map(|_| Exit::Success),
        Commands::Version => handlers::version::handle(&config, cli.format).map(|_| Exit::Success),
    }
}
