//! CLI argument definitions using clap
//!
//! Commands:
//! - mockbase tables
//! - mockbase query <table> [--select S] [--eq col=val].. [--in col=a,b].. [--order col.desc].. [--range 0-9] [--single]
//! - mockbase sign-in --email E --password P
//! - mockbase sign-up --email E --password P [--display-name N]

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// mockbase - an in-process stand-in for a hosted relational backend
#[derive(Parser, Debug)]
#[command(name = "mockbase")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to a JSON configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Override the artificial latency in milliseconds
    #[arg(long, global = true)]
    pub latency_ms: Option<u64>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the queryable tables with their row counts
    Tables,

    /// Run a read query and print the result envelope
    Query {
        /// Table to query
        table: String,

        /// Projection, e.g. "*, profiles(username)"
        #[arg(long, default_value = "*")]
        select: String,

        /// Equality filter COLUMN=VALUE; quote JSON strings to keep them strings ('id="1"')
        #[arg(long = "eq", value_name = "COLUMN=VALUE")]
        eq: Vec<String>,

        /// Membership filter COLUMN=A,B,C; commas inside quoted JSON strings do not split
        #[arg(long = "in", value_name = "COLUMN=A,B")]
        in_: Vec<String>,

        /// Ordering COLUMN[.asc|.desc]; the last one wins
        #[arg(long, value_name = "COLUMN[.asc|.desc]")]
        order: Vec<String>,

        /// Inclusive row range FROM-TO
        #[arg(long, value_name = "FROM-TO")]
        range: Option<String>,

        /// Return the first row only
        #[arg(long)]
        single: bool,
    },

    /// Sign in with email and password
    SignIn {
        #[arg(long)]
        email: String,

        #[arg(long)]
        password: String,
    },

    /// Register a new account
    SignUp {
        #[arg(long)]
        email: String,

        #[arg(long)]
        password: String,

        #[arg(long)]
        display_name: Option<String>,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
