//! Tool implementations.

use super::request::{tool_catalog, Request, ToolInvocation, ToolName};
use crate::gateway::{ModelGateway, ToolSpec};
use crate::video::{LinkExtractor, TranscriptResult, TranscriptSource};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Why a tool fell back to a canned message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolFailure {
    /// The payload is not a recognised video link.
    InvalidReference,
    /// The video has no transcript in any preferred language.
    TranscriptAbsent,
    /// The transcript could not be retrieved.
    TranscriptFetch,
    /// The model backend failed while processing text.
    TextService,
    /// The model backend failed while processing a transcript.
    VideoService,
}

impl ToolFailure {
    /// Fixed user-facing message for this failure.
    pub fn message(&self) -> &'static str {
        match self {
            ToolFailure::InvalidReference => "Not a valid YouTube video. Please use another link.",
            ToolFailure::TranscriptAbsent => {
                "Error: No transcript found. Please try another video or use a transcript \
                 service like https://tactiq.io/tools/youtube-transcript"
            }
            ToolFailure::TranscriptFetch => "Error: Unable to fetch video transcript.",
            ToolFailure::TextService => {
                "Unable to process this text due to an error. Please try another one."
            }
            ToolFailure::VideoService => {
                "Unable to process this video due to an error. Please try another one."
            }
        }
    }
}

/// Text produced by a tool. `text` is always what the user sees.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolResult {
    pub text: String,
    pub failure: Option<ToolFailure>,
}

impl ToolResult {
    fn success(text: String) -> Self {
        Self {
            text,
            failure: None,
        }
    }

    fn failed(failure: ToolFailure) -> Self {
        Self {
            text: failure.message().to_string(),
            failure: Some(failure),
        }
    }

    /// Whether the tool fell back to a canned message.
    pub fn is_failure(&self) -> bool {
        self.failure.is_some()
    }
}

/// Combine an instruction and content into a generation prompt.
pub fn build_prompt(instruction: &str, content: &str) -> String {
    format!("{}:\n\n{}", instruction, content)
}

/// The tool set exposed to the planner.
pub struct ToolSet {
    gateway: Arc<dyn ModelGateway>,
    transcripts: Arc<dyn TranscriptSource>,
    extractor: LinkExtractor,
    languages: Vec<String>,
}

impl ToolSet {
    /// Create a tool set.
    pub fn new(
        gateway: Arc<dyn ModelGateway>,
        transcripts: Arc<dyn TranscriptSource>,
        extractor: LinkExtractor,
        languages: Vec<String>,
    ) -> Self {
        Self {
            gateway,
            transcripts,
            extractor,
            languages,
        }
    }

    /// Declarations of the tools in this set.
    pub fn catalog(&self) -> Vec<ToolSpec> {
        tool_catalog()
    }

    /// Run the tool named by the invocation.
    pub async fn invoke(&self, invocation: &ToolInvocation) -> ToolResult {
        match invocation.tool {
            ToolName::ProcessText => self.process_text(&invocation.request).await,
            ToolName::ProcessVideo => self.process_video(&invocation.request).await,
        }
    }

    /// Apply the instruction to the payload text.
    #[instrument(skip_all, fields(instruction = %request.instruction()))]
    pub async fn process_text(&self, request: &Request) -> ToolResult {
        debug!("Processing {} chars of text", request.payload().len());
        self.generate(request.instruction(), request.payload(), ToolFailure::TextService)
            .await
    }

    /// Resolve the payload as a video link and apply the instruction to its transcript.
    #[instrument(skip_all, fields(instruction = %request.instruction()))]
    pub async fn process_video(&self, request: &Request) -> ToolResult {
        let reference = self.extractor.extract(request.payload());
        let Some(video_id) = reference.canonical_id else {
            info!("No video id in '{}'", reference.raw_input);
            return ToolResult::failed(ToolFailure::InvalidReference);
        };

        info!("Fetching transcript for {}", video_id);
        let text = match self.transcripts.fetch(&video_id, &self.languages).await {
            TranscriptResult::Found { text } => text,
            TranscriptResult::NotFound => {
                info!("No transcript found for video {}", video_id);
                return ToolResult::failed(ToolFailure::TranscriptAbsent);
            }
            TranscriptResult::FetchError { detail } => {
                warn!("Error fetching transcript for {}: {}", video_id, detail);
                return ToolResult::failed(ToolFailure::TranscriptFetch);
            }
        };

        debug!("Transcript for {} has {} chars", video_id, text.len());
        self.generate(request.instruction(), &text, ToolFailure::VideoService)
            .await
    }

    async fn generate(&self, instruction: &str, content: &str, failure: ToolFailure) -> ToolResult {
        let prompt = build_prompt(instruction, content);
        match self.gateway.generate(&prompt).await {
            Ok(text) => ToolResult::success(text),
            Err(e) => {
                warn!("Generation failed: {}", e);
                ToolResult::failed(failure)
            }
        }
    }
}
