//! CLI argument definitions using clap
//!
//! Commands:
//! - wasmgate serve --config <path> [--debug]
//! - wasmgate schema --config <path>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// wasmgate - serve WebAssembly functions over HTTP through a workflow engine
#[derive(Parser, Debug)]
#[command(name = "wasmgate")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Register functions, connect to the engine and serve HTTP
    Serve {
        /// Path to configuration file
        #[arg(long, default_value = "./wasmgate.json")]
        config: PathBuf,

        /// Attach a fresh nonce to every invocation, disabling replay
        #[arg(long)]
        debug: bool,
    },

    /// Print the discovery document and exit
    Schema {
        /// Path to configuration file
        #[arg(long, default_value = "./wasmgate.json")]
        config: PathBuf,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
