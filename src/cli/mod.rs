//! CLI module for mockbase
//!
//! Provides command-line access to the emulated backend:
//! - tables: Row counts per table
//! - query: One-shot read query
//! - sign-in / sign-up: Auth emulator round trips

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{load_config, parse_value, query, run_command, sign_in, sign_up, tables, QueryArgs};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::write_json;

/// Parse arguments, run the command on a fresh runtime, print to stdout
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();

    let runtime = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::runtime_error(format!("Failed to start runtime: {}", e)))?;

    let mut stdout = std::io::stdout();
    runtime.block_on(run_command(cli, &mut stdout))
}
