//! CLI module for Clipwise.

pub mod busy;
pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use clap::{Parser, Subcommand};

/// Clipwise - ask a language model about text and YouTube videos
///
/// Type what you want ("summarize", "translate to French", "list the key
/// points") followed by the text or a YouTube link.
#[derive(Parser, Debug)]
#[command(name = "clipwise")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// OpenAI API key
    #[arg(long, env = "OPENAI_API_KEY", global = true, hide_env_values = true)]
    pub api_key: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Answer a single request, e.g. "summarize: https://youtu.be/..."
    Ask {
        /// The request, with the text or video link it applies to
        utterance: String,
    },

    /// Start an interactive session (one request per line, 'quit' to exit)
    Chat,

    /// Start an HTTP server exposing the same session over JSON
    Serve {
        /// Host to bind to (defaults to server.host in config)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to (defaults to server.port in config)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Print the transcript of a YouTube video
    Transcript {
        /// YouTube URL
        input: String,

        /// Caption languages in preference order (comma-separated)
        #[arg(short, long, value_delimiter = ',')]
        lang: Vec<String>,
    },

    /// Check system requirements and configuration
    Doctor,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Open configuration file in editor
    Edit,

    /// Show configuration file path
    Path,
}
