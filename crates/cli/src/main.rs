//! chatrelay CLI: the main entry point.
//!
//! Commands:
//! - `onboard`  Initialize config directory and config.toml
//! - `serve`    Start the HTTP gateway
//! - `chat`     Talk to the tutor from the terminal
//! - `history`  Show or clear the stored conversation
//! - `doctor`   Diagnose configuration and history health

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "chatrelay",
    about = "chatrelay: English-tutor chat relay",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize configuration
    Onboard,

    /// Start the HTTP gateway server
    Serve {
        /// Override the port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Chat with the tutor
    Chat {
        /// Send a single message instead of entering interactive mode
        #[arg(short, long)]
        message: Option<String>,
    },

    /// Inspect or clear the stored conversation
    History {
        #[command(subcommand)]
        action: HistoryAction,
    },

    /// Diagnose system health
    Doctor,
}

#[derive(Subcommand)]
enum HistoryAction {
    /// Print the stored messages, oldest first
    Show,

    /// Delete every stored message
    Clear {
        /// Required to actually clear
        #[arg(long)]
        confirm: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    match cli.command {
        Commands::Onboard => commands::onboard::run().await?,
        Commands::Serve { port } => commands::serve::run(port).await?,
        Commands::Chat { message } => commands::chat::run(message).await?,
        Commands::History { action } => match action {
            HistoryAction::Show => commands::history::show().await?,
            HistoryAction::Clear { confirm } => commands::history::clear(confirm).await?,
        },
        Commands::Doctor => commands::doctor::run().await?,
    }

    Ok(())
}
