use super::{connect, print_json};
use crate::config::Config;
use crate::presentation::{Palette, render_trees};
use crate::types::OutputFormat;
use anyhow::{Context, Result};

pub fn handle(config: &Config, format: OutputFormat) -> Result<()> {
    let client = connect(config)?;

    if format == OutputFormat::Plain {
        println!("Fetching dependency trees from {}...\n", config.server_host);
    }

    let response = client.list_trees().context("failed to list trees")?;

    match format {
        OutputFormat::Json => print_json(&response)?,
        OutputFormat::Plain => print!("{}", render_trees(&response, Palette::detect())),
    }

    Ok(())
}
