//! Clipwise CLI entry point.

use anyhow::Result;
use clap::Parser;
use clipwise::cli::{commands, Cli, Commands};
use clipwise::config::Settings;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let settings = match &cli.config {
        Some(path) => Settings::load_from(Some(&std::path::PathBuf::from(path)))?,
        None => Settings::load()?,
    };

    // Initialize logging; -v flags win over general.log_level
    let log_level = match cli.verbose {
        0 => settings.general.log_level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("clipwise={}", log_level)),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let api_key = cli.api_key.as_deref();

    // Execute command
    match &cli.command {
        Commands::Ask { utterance } => {
            commands::run_ask(utterance, api_key, settings).await?;
        }

        Commands::Chat => {
            commands::run_chat(api_key, settings).await?;
        }

        Commands::Serve { host, port } => {
            commands::run_serve(host.clone(), *port, api_key, settings).await?;
        }

        Commands::Transcript { input, lang } => {
            commands::run_transcript(input, lang.clone(), settings).await?;
        }

        Commands::Doctor => {
            commands::run_doctor(&settings, api_key)?;
        }

        Commands::Config { action } => {
            commands::run_config(action, settings)?;
        }
    }

    Ok(())
}
