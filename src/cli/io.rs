//! JSON output for CLI commands

use std::io::{self, Write};

use serde::Serialize;

use super::errors::CliResult;

/// Write a pretty-printed JSON document to stdout
pub fn write_json<T: Serialize>(value: &T) -> CliResult<()> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value)?;
    writeln!(stdout)?;
    stdout.flush()?;

    Ok(())
}
