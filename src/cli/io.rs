//! JSON output for the CLI
//!
//! One pretty-printed JSON document per command, UTF-8.

use std::io::Write;

use serde::Serialize;

use super::errors::CliResult;

/// Write `value` as pretty JSON followed by a newline
pub fn write_json<W: Write, T: Serialize>(out: &mut W, value: &T) -> CliResult<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    out.flush()?;
    Ok(())
}
