// Layering: args (clap surface) -> commands (dispatch) -> handlers (one per
// subcommand) -> presentation (pure string rendering). Handlers own all I/O;
// presentation never touches stdout or the network.

mod args;
mod commands;
pub mod config;
pub mod files;
mod handlers;
pub mod logging;
pub mod presentation;
pub mod types;

pub use args::{Cli, Commands, FilterArgs};
pub use commands::{Exit, run};
