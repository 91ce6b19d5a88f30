//! Ask command implementation.

use super::{build_orchestrator, transcript_source};
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::session::Session;
use anyhow::Result;

/// Run the ask command.
pub async fn run_ask(utterance: &str, api_key: Option<&str>, settings: Settings) -> Result<()> {
    // Pre-flight checks
    if let Err(e) = preflight::check(Operation::Ask, &settings, api_key) {
        Output::error(&format!("{}", e));
        Output::info("Run 'clipwise doctor' for detailed diagnostics.");
        return Err(e.into());
    }
    let key = preflight::require_api_key(&settings, api_key)?;

    let spinner = Output::spinner("Validating API key...");
    let session = match Session::validate(&key, &settings.model).await {
        Ok(session) => session,
        Err(e) => {
            spinner.finish_and_clear();
            Output::error(&format!("{}", e));
            return Err(e.into());
        }
    };

    let transcripts = transcript_source(&settings)?;
    let orchestrator = build_orchestrator(&session, &transcripts, &settings)?;

    spinner.set_message("Processing...");

    let outcome = orchestrator.handle(utterance).await;
    spinner.finish_and_clear();

    match outcome {
        Ok(answer) => Output::answer(&answer),
        Err(e) => {
            Output::warning(&format!("{}", e));
            return Err(e.into());
        }
    }

    Ok(())
}
