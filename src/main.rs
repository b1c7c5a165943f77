//! Homefeed - Session bootstrap for media-server clients
//!
//! This is the binary entry point. All logic lives in the library.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use homefeed::{add_server, exit_code, render_config, run_bootstrap, AddServerRequest};
use homefeed_app::config::ConfigPaths;

/// Homefeed - bootstrap a media-server session and print the home-feed layout
#[derive(Parser, Debug)]
#[command(name = "homefeed", version)]
#[command(about = "Bootstrap a media-server session and print the home-feed layout", long_about = None)]
struct Args {
    /// Configuration directory (default: $HOMEFEED_CONFIG_DIR, then the platform config dir)
    #[arg(long, value_name = "DIR", global = true)]
    config_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the startup sequence once and print NDJSON events (default)
    Bootstrap,

    /// Register a server and its signed-in account
    AddServer {
        /// Server base address, e.g. http://media.local:8096
        #[arg(long)]
        address: String,

        /// Account (user) id on the server
        #[arg(long)]
        account_id: String,

        /// Account display name
        #[arg(long)]
        display_name: String,

        /// Server id (default: reuse the entry for this address, or generate one)
        #[arg(long)]
        server_id: Option<String>,

        /// Server display name
        #[arg(long)]
        server_name: Option<String>,

        /// Access token to store for the account
        #[arg(long, env = "HOMEFEED_TOKEN", hide_env_values = true)]
        token: Option<String>,
    },

    /// Print the resolved configuration
    ShowConfig,
}

#[tokio::main]
async fn main() -> color_eyre::Result<ExitCode> {
    color_eyre::install()?;
    let args = Args::parse();

    // Stdout carries command output; logs go to a file, or stderr as a fallback
    let log_sink = homefeed_core::logging::init();
    tracing::debug!("Logging to {}", log_sink);

    let paths = ConfigPaths::resolve(args.config_dir.as_deref());

    match args.command.unwrap_or(Command::Bootstrap) {
        Command::Bootstrap => {
            let status = run_bootstrap(&paths).await?;
            Ok(ExitCode::from(exit_code(status)))
        }
        Command::AddServer {
            address,
            account_id,
            display_name,
            server_id,
            server_name,
            token,
        } => {
            let has_token = token.is_some();
            let request = AddServerRequest {
                address,
                account_id,
                display_name,
                server_id,
                server_name,
                token,
            };
            let added = match add_server(&paths, &request) {
                Ok(added) => added,
                Err(e) if e.is_fatal() => {
                    eprintln!("❌ {}", e);
                    return Ok(ExitCode::FAILURE);
                }
                Err(e) => return Err(e.into()),
            };

            eprintln!(
                "✅ Registered account {} on {} (server {})",
                added.account.account_id, added.server.base_address, added.server.server_id
            );
            if !has_token {
                eprintln!("   No token given; any previously stored token is kept.");
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::ShowConfig => {
            print!("{}", render_config(&paths)?);
            Ok(ExitCode::SUCCESS)
        }
    }
}
