//! Unified gatehouse CLI.
//!
//! This binary provides a single entry point to the gatehouse tooling:
//! - `gatehouse auth` - Hash passwords, check configs and run test logins
//!
//! The auth tooling can also be run as the standalone `gatehouse-auth` binary.

use std::process::ExitCode;

use clap::{Parser, Subcommand};

/// gatehouse unified CLI.
#[derive(Parser)]
#[command(
    name = "gatehouse",
    version,
    about = "Pluggable HTTP authentication dispatch",
    propagate_version = true
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Hash passwords, check configs and run test logins.
    #[command(name = "auth")]
    Auth(gatehouse_auth::AuthArgs),
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Auth(args) => gatehouse_auth::cli::run(args).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
