//! Pre-flight checks before talking to external services.
//!
//! Validates that required tools and credentials are available before
//! starting operations that would otherwise fail midway.

use crate::cli::Output;
use crate::config::Settings;
use crate::error::{ClipwiseError, Result};
use std::process::Command;

/// Requirements for different operations.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    /// Answering requests needs a credential; yt-dlp is only needed for videos.
    Ask,
    /// The console loop can ask for a credential itself.
    Chat,
    /// Printing a transcript needs yt-dlp but no credential.
    Transcript,
}

/// Run pre-flight checks for the given operation.
///
/// Missing optional tools only produce a warning.
pub fn check(operation: Operation, settings: &Settings, api_key: Option<&str>) -> Result<()> {
    let ytdlp = check_tool(&settings.transcript.ytdlp_path);

    match operation {
        Operation::Ask => {
            require_api_key(settings, api_key)?;
            warn_video_unavailable(ytdlp);
        }
        Operation::Chat => warn_video_unavailable(ytdlp),
        Operation::Transcript => ytdlp?,
    }
    Ok(())
}

/// Resolve the API key or explain how to provide one.
pub fn require_api_key(settings: &Settings, explicit: Option<&str>) -> Result<String> {
    settings.resolve_api_key(explicit).ok_or_else(|| {
        ClipwiseError::Config(
            "No API key found. Set it with: export OPENAI_API_KEY='sk-...' (or pass --api-key)"
                .to_string(),
        )
    })
}

fn warn_video_unavailable(check: Result<()>) {
    if let Err(e) = check {
        Output::warning(&format!("{} Video requests will fail until it is installed.", e));
    }
}

/// Check if an external tool is available.
pub fn check_tool(name: &str) -> Result<()> {
    match Command::new(name).arg("--version").output() {
        Ok(output) if output.status.success() => Ok(()),
        Ok(_) => Err(ClipwiseError::ToolNotFound(format!(
            "{} is installed but not working correctly",
            name
        ))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(ClipwiseError::ToolNotFound(name.to_string()))
        }
        Err(e) => Err(ClipwiseError::ToolNotFound(format!("{}: {}", name, e))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_tool() {
        assert!(matches!(
            check_tool("/nonexistent/clipwise-test/yt-dlp"),
            Err(ClipwiseError::ToolNotFound(_))
        ));
    }

    #[test]
    fn test_transcript_requires_ytdlp() {
        let mut settings = Settings::default();
        settings.transcript.ytdlp_path = "/nonexistent/clipwise-test/yt-dlp".to_string();
        assert!(check(Operation::Transcript, &settings, None).is_err());
        assert!(check(Operation::Chat, &settings, None).is_ok());
    }

    #[test]
    fn test_explicit_key_satisfies_ask() {
        let mut settings = Settings::default();
        settings.transcript.ytdlp_path = "/nonexistent/clipwise-test/yt-dlp".to_string();
        assert!(check(Operation::Ask, &settings, Some("sk-test")).is_ok());
    }
}
