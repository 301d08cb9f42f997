//! DVLA CLI: entry point.
//!
//! # Commands
//!
//! - `dvla ask -m MESSAGE [-c CONVERSATION]`: one streamed execution, printed as an SSE frame
//! - `dvla chat [-c CONVERSATION]`: interactive REPL
//! - `dvla status`: show configuration and provider status
//! - `dvla onboard`: write the default configuration

mod helpers;
mod onboard;
mod repl;
mod status;

use anyhow::Result;
use clap::{Parser, Subcommand};
use futures_util::StreamExt;
use tracing::info;

use dvla_agent::stream_chat;
use dvla_core::config::load_config;
use dvla_core::events::{ChatRequest, StreamEvent, DEFAULT_CONVERSATION_ID};

// ─────────────────────────────────────────────
// CLI definition
// ─────────────────────────────────────────────

/// DVLA: a transaction assistant driven by an LLM tool-calling loop
#[derive(Parser)]
#[command(name = "dvla", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Send one message and print the resulting event
    Ask {
        /// Message to send
        #[arg(short, long)]
        message: String,

        /// Conversation identifier
        #[arg(short, long, default_value = DEFAULT_CONVERSATION_ID)]
        conversation: String,

        /// Enable debug logging
        #[arg(long, default_value_t = false)]
        logs: bool,
    },

    /// Chat with the assistant in an interactive REPL
    Chat {
        /// Conversation identifier
        #[arg(short, long, default_value = DEFAULT_CONVERSATION_ID)]
        conversation: String,

        /// Enable debug logging
        #[arg(long, default_value_t = false)]
        logs: bool,
    },

    /// Show configuration and provider status
    Status,

    /// Write the default configuration file
    Onboard,
}

// ─────────────────────────────────────────────
// Entrypoint
// ─────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    helpers::load_env_file(None);
    let cli = Cli::parse();

    match cli.command {
        Commands::Ask {
            message,
            conversation,
            logs,
        } => {
            init_logging(logs);
            run_ask(message, conversation).await
        }
        Commands::Chat { conversation, logs } => {
            init_logging(logs);
            let config = load_config(None);
            let agent = helpers::build_agent(&config)?;
            repl::run(agent, &conversation).await
        }
        Commands::Status => status::run(),
        Commands::Onboard => onboard::run(),
    }
}

// ─────────────────────────────────────────────
// Ask command
// ─────────────────────────────────────────────

async fn run_ask(message: String, conversation: String) -> Result<()> {
    let config = load_config(None);
    let agent = helpers::build_agent(&config)?;

    info!(conversation = %conversation, "processing single message");
    let request = ChatRequest::new(message).with_conversation(conversation);
    let mut events = Box::pin(stream_chat(agent, request));

    let event = events
        .next()
        .await
        .unwrap_or_else(|| StreamEvent::error("no event produced"));
    print!("{}", event.to_sse());

    if event.is_error() {
        std::process::exit(1);
    }
    Ok(())
}

/// Initialize tracing/logging.
fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("dvla=debug,info")
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}
