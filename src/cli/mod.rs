//! Command-line interface.

pub mod commands;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "urbanista", version, about = "Urban planning Q&A pipeline")]
pub struct Cli {
    /// Emit machine-readable JSON instead of formatted output
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Ask a question about the urban plan
    Ask(AskArgs),
    /// Show the turns recorded for a session
    History(HistoryArgs),
    /// Create the database and apply migrations
    Init(InitArgs),
}

#[derive(Args)]
pub struct AskArgs {
    /// The question text
    pub query: String,

    /// Conversation session id; enables session memory
    #[arg(long)]
    pub session: Option<String>,

    /// Skip the answer cache for this question
    #[arg(long)]
    pub no_cache: bool,

    /// LLM model override for the synthesis step
    #[arg(long)]
    pub model: Option<String>,
}

#[derive(Args)]
pub struct HistoryArgs {
    /// Session id to inspect
    pub session: String,

    /// Maximum number of turns to show
    #[arg(long, default_value_t = 10)]
    pub limit: usize,
}

#[derive(Args)]
pub struct InitArgs {
    /// Configuration file to load instead of urbanista.yaml
    #[arg(long)]
    pub config: Option<std::path::PathBuf>,
}
