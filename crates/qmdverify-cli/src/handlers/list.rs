use super::{connect, print_json};
use crate::config::Config;
use crate::presentation::{Palette, render_hashtables};
use crate::types::OutputFormat;
use anyhow::{Context, Result};

pub fn handle(config: &Config, format: OutputFormat) -> Result<()> {
    let client = connect(config)?;

    if format == OutputFormat::Plain {
        println!("Fetching hashtables from {}...\n", config.server_host);
    }

    let response = client
        .list_hashtables()
        .context("failed to list hashtables")?;

    match format {
        OutputFormat::Json => print_json(&response)?,
        OutputFormat::Plain => print!("{}", render_hashtables(&response, Palette::detect())),
    }

    Ok(())
}
