//! CLI command implementations.

mod ask;
mod chat;
mod config;
mod doctor;
mod serve;
mod transcript;

pub use ask::run_ask;
pub use chat::run_chat;
pub use config::run_config;
pub use doctor::run_doctor;
pub use serve::run_serve;
pub use transcript::run_transcript;

use crate::config::Settings;
use crate::error::Result;
use crate::orchestrator::Orchestrator;
use crate::session::Session;
use crate::video::{TranscriptSource, YtDlpTranscriptSource};
use std::sync::Arc;

/// Transcript source configured from settings.
fn transcript_source(settings: &Settings) -> Result<Arc<dyn TranscriptSource>> {
    Ok(Arc::new(
        YtDlpTranscriptSource::new(&settings.transcript.ytdlp_path)?
            .with_watch_url(&settings.extractor.watch_url),
    ))
}

/// Orchestrator for a freshly validated session.
fn build_orchestrator(
    session: &Session,
    transcripts: &Arc<dyn TranscriptSource>,
    settings: &Settings,
) -> Result<Arc<Orchestrator>> {
    Ok(Arc::new(Orchestrator::new(
        session,
        transcripts.clone(),
        settings,
    )?))
}
