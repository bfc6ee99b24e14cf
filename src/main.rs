//! Unified gost-rs CLI.
//!
//! This binary fronts both halves of the proxy:
//! - `gost-rs server` - Run the HTTP proxy server
//! - `gost-rs client` - Run a local forwarder that tunnels through an HTTP proxy

use std::process::ExitCode;

use clap::{Parser, Subcommand};

/// gost-rs unified CLI.
#[derive(Parser)]
#[command(
    name = "gost-rs",
    version,
    about = "HTTP CONNECT forward proxy",
    propagate_version = true
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP proxy server.
    #[command(name = "server", alias = "serve")]
    Server(gost_server::ServerArgs),

    /// Run the local forwarder client.
    #[command(name = "client")]
    Client(gost_client::ClientArgs),
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Server(args) => gost_server::cli::run(args).await,
        Commands::Client(args) => gost_client::cli::run(args).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
