//! Talentwire command-line interface.

pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Default config file path.
pub const DEFAULT_CONFIG: &str = "talentwire.json5";

/// Talentwire - multi-channel candidate messaging
#[derive(Parser)]
#[command(name = "talentwire")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, env = "TALENTWIRE_CONFIG", default_value = DEFAULT_CONFIG)]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Start the webhook gateway server
    Serve(commands::serve::ServeArgs),

    /// Send a notification to a contact
    Send(commands::send::SendArgs),

    /// Show provider health and delivery stats
    Status,

    /// Manage contacts
    Contacts(commands::contacts::ContactsArgs),

    /// Show version information
    Version,
}

/// Run the CLI with the given arguments.
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Serve(args) => commands::serve::run(&cli.config, args).await,
        Commands::Send(args) => commands::send::run(&cli.config, args).await,
        Commands::Status => commands::status::run(&cli.config).await,
        Commands::Contacts(args) => commands::contacts::run(&cli.config, args).await,
        Commands::Version => {
            println!("talentwire {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
