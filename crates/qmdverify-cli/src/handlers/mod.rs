pub mod check;
pub mod list;
pub mod trees;
pub mod version;

use crate::config::Config;
use anyhow::{Context, Result};
use qmdverify_client::Client;

fn connect(config: &Config) -> Result<Client> {
    Client::new(&config.server_host).context("failed to create HTTP client")
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
