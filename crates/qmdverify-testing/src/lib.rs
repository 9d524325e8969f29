//! Testing infrastructure for qmdverify integration tests.
//!
//! - `StubServer`: scripted stand-in for the qmd-check HTTP server
//! - `TestWorld`: isolated directory of QMD files plus a configured CLI
//! - `fixtures`: wire-format JSON builders
//! - `assertions`: checks over `--format json` output

pub mod assertions;
pub mod fixtures;
pub mod server;
pub mod world;

pub use server::{RecordedRequest, StubReply, StubServer};
pub use world::{CliResult, TestWorld};
