//! mockbase CLI entry point
//!
//! A minimal entrypoint that:
//! 1. Installs the log backend (level from RUST_LOG, default warn)
//! 2. Delegates parsing and dispatch to cli::run
//! 3. Prints errors to stderr
//! 4. Exits with non-zero on failure

use mockbase::cli;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    if let Err(e) = cli::run() {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
