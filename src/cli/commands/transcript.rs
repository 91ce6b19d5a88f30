//! Transcript command: print a video's captions without involving the model.

use super::transcript_source;
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::error::ClipwiseError;
use crate::video::LinkExtractor;
use anyhow::Result;

/// Run the transcript command.
pub async fn run_transcript(input: &str, languages: Vec<String>, settings: Settings) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Transcript, &settings, None) {
        Output::error(&format!("{}", e));
        Output::info("Run 'clipwise doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let extractor = LinkExtractor::new(&settings.extractor)?;
    let video_id = extractor.extract(input).canonical_id.ok_or_else(|| {
        ClipwiseError::Validation(format!("Not a valid YouTube video: {}", input))
    })?;

    let languages = if languages.is_empty() {
        settings.transcript.languages.clone()
    } else {
        languages
    };

    let spinner = Output::spinner(&format!("Fetching transcript for {}...", video_id));
    let result = transcript_source(&settings)?.fetch(&video_id, &languages).await;
    spinner.finish_and_clear();

    let text = result.into_result(&video_id)?;
    println!("{}", text);

    Ok(())
}
