//! Chatfolio CLI — the main entry point.
//!
//! Commands:
//! - `serve`   — Start the HTTP API server (default)
//! - `ask`     — Send one message and print the answer
//! - `prompt`  — Print the rendered system prompt
//! - `doctor`  — Diagnose configuration and knowledge
//! - `init`    — Write a starter `chatfolio.toml`

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "chatfolio",
    about = "Chatfolio — portfolio chatbot API",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true, env = "CHATFOLIO_JSON_LOGS")]
    json_logs: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API server
    Serve {
        /// Override the port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Ask a single question and print the answer
    Ask {
        /// The message to send
        #[arg(short, long)]
        message: String,
    },

    /// Print the system prompt built from the knowledge record
    Prompt,

    /// Diagnose configuration, knowledge and upstream reachability
    Doctor,

    /// Write a default chatfolio.toml in the current directory
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // A missing .env file is normal.
    let dotenv = dotenvy::dotenv();

    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter));
    if cli.json_logs {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(false)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .init();
    }

    if let Ok(path) = dotenv {
        tracing::debug!(path = %path.display(), "Loaded environment file");
    }

    match cli.command.unwrap_or(Commands::Serve { port: None }) {
        Commands::Serve { port } => commands::serve::run(port).await?,
        Commands::Ask { message } => commands::ask::run(message).await?,
        Commands::Prompt => commands::prompt::run()?,
        Commands::Doctor => commands::doctor::run().await?,
        Commands::Init { force } => commands::init::run(force)?,
    }

    Ok(())
}
