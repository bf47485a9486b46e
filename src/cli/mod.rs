//! CLI module for wasmgate
//!
//! Provides command-line interface for:
//! - serve: Register functions and serve them over HTTP
//! - schema: Print the discovery document

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{build_registry, load_config, run, run_command, schema, serve};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::write_json;
