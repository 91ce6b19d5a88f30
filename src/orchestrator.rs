//! Request dispatch for Clipwise.
//!
//! Turns one free-form utterance into an answer: the model backend plans which
//! tool to run, the tool does the work, and its text comes back unchanged.

use crate::config::Settings;
use crate::error::{ClipwiseError, Result};
use crate::gateway::{ModelGateway, Plan};
use crate::session::Session;
use crate::tools::ToolSet;
use crate::video::{LinkExtractor, TranscriptSource};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Answer returned when the planning call itself fails.
pub const REQUEST_FAILURE_MESSAGE: &str =
    "An error occurred while processing your request. Please check your API key or try again later.";

/// The dispatch orchestrator.
///
/// Holds no per-call state. The gateway is borrowed from a [`Session`]; callers
/// must not run two `handle` calls against the same session at once.
pub struct Orchestrator {
    gateway: Arc<dyn ModelGateway>,
    tools: ToolSet,
}

impl Orchestrator {
    /// Create an orchestrator for a validated session.
    pub fn new(
        session: &Session,
        transcripts: Arc<dyn TranscriptSource>,
        settings: &Settings,
    ) -> Result<Self> {
        let extractor = LinkExtractor::new(&settings.extractor)?;
        Ok(Self::with_components(
            session.gateway(),
            transcripts,
            extractor,
            settings.transcript.languages.clone(),
        ))
    }

    /// Create an orchestrator with custom components.
    pub fn with_components(
        gateway: Arc<dyn ModelGateway>,
        transcripts: Arc<dyn TranscriptSource>,
        extractor: LinkExtractor,
        languages: Vec<String>,
    ) -> Self {
        let tools = ToolSet::new(gateway.clone(), transcripts, extractor, languages);
        Self { gateway, tools }
    }

    /// Handle one user utterance.
    ///
    /// Only an empty utterance is reported as an error; every other failure
    /// comes back as answer text.
    #[instrument(skip_all, fields(chars = utterance.len()))]
    pub async fn handle(&self, utterance: &str) -> Result<String> {
        if utterance.trim().is_empty() {
            return Err(ClipwiseError::Validation(
                "Please enter a question or YouTube URL.".to_string(),
            ));
        }

        let plan = match self.gateway.plan(utterance, &self.tools.catalog()).await {
            Ok(plan) => plan,
            Err(e) => {
                warn!("Error processing request: {}", e);
                return Ok(REQUEST_FAILURE_MESSAGE.to_string());
            }
        };

        let invocations = match plan {
            Plan::Respond(text) => return Ok(text),
            Plan::Invoke(invocations) if invocations.is_empty() => {
                warn!("Planner returned an empty tool list");
                return Ok(REQUEST_FAILURE_MESSAGE.to_string());
            }
            Plan::Invoke(invocations) => invocations,
        };

        let mut answers = Vec::with_capacity(invocations.len());
        for invocation in &invocations {
            info!("Invoking {}", invocation.tool);
            let result = self.tools.invoke(invocation).await;
            if let Some(failure) = result.failure {
                info!("{} fell back to canned answer: {:?}", invocation.tool, failure);
            }
            answers.push(result.text);
        }

        Ok(answers.join("\n\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExtractorSettings;
    use crate::testing::{FakeGateway, FakeTranscripts, GenerateReply, PlanReply};
    use crate::tools::ToolFailure;
    use crate::video::TranscriptResult;

    fn orchestrator(gateway: &Arc<FakeGateway>, transcripts: &Arc<FakeTranscripts>) -> Orchestrator {
        Orchestrator::with_components(
            gateway.clone(),
            transcripts.clone(),
            LinkExtractor::youtube(),
            vec!["ar".to_string(), "en".to_string()],
        )
    }

    fn call(name: &str, args: serde_json::Value) -> (String, String) {
        (name.to_string(), args.to_string())
    }

    #[tokio::test]
    async fn test_empty_utterance_never_plans() {
        let gateway = Arc::new(FakeGateway::new(PlanReply::Respond("hi".to_string()), GenerateReply::Echo));
        let transcripts = Arc::new(FakeTranscripts::new(TranscriptResult::NotFound));
        let orchestrator = orchestrator(&gateway, &transcripts);

        for utterance in ["", "   \n\t"] {
            let err = orchestrator.handle(utterance).await.unwrap_err();
            assert!(err.is_validation());
        }
        assert_eq!(gateway.plan_calls(), 0);
    }

    #[tokio::test]
    async fn test_summarize_video_scenario() {
        let gateway = Arc::new(FakeGateway::new(
            PlanReply::Tools(vec![call(
                "process_video",
                serde_json::json!({ "instruction": "summarize", "url": "https://video.host/watch?id=abc123" }),
            )]),
            GenerateReply::Fixed("Someone says hello.".to_string()),
        ));
        let transcripts = Arc::new(FakeTranscripts::from_fragments(&["Hello ", "world."]));
        let extractor = LinkExtractor::new(&ExtractorSettings {
            hosts: vec!["video.host".to_string()],
            short_hosts: Vec::new(),
            query_params: vec!["id".to_string()],
            path_prefixes: Vec::new(),
            id_pattern: "^[A-Za-z0-9_-]+$".to_string(),
            watch_url: "https://video.host/watch?id={id}".to_string(),
        })
        .unwrap();
        let orchestrator = Orchestrator::with_components(
            gateway.clone(),
            transcripts.clone(),
            extractor,
            vec!["ar".to_string(), "en".to_string()],
        );

        let answer = orchestrator
            .handle("summarize: https://video.host/watch?id=abc123")
            .await
            .unwrap();

        assert_eq!(answer, "Someone says hello.");
        assert_eq!(gateway.prompts(), vec!["summarize:\n\nHello world."]);
        assert_eq!(transcripts.calls(), 1);
    }

    #[tokio::test]
    async fn test_text_tool_service_error_is_plain_answer() {
        let gateway = Arc::new(FakeGateway::new(
            PlanReply::Tools(vec![call(
                "process_text",
                serde_json::json!({ "instruction": "summarize", "text": "A long article." }),
            )]),
            GenerateReply::Fail,
        ));
        let transcripts = Arc::new(FakeTranscripts::new(TranscriptResult::NotFound));

        let answer = orchestrator(&gateway, &transcripts)
            .handle("summarize: A long article.")
            .await
            .unwrap();

        assert_eq!(answer, ToolFailure::TextService.message());
    }

    #[tokio::test]
    async fn test_planner_failure_is_plain_answer() {
        let gateway = Arc::new(FakeGateway::new(PlanReply::Fail, GenerateReply::Echo));
        let transcripts = Arc::new(FakeTranscripts::new(TranscriptResult::NotFound));

        let answer = orchestrator(&gateway, &transcripts).handle("hello").await.unwrap();
        assert_eq!(answer, REQUEST_FAILURE_MESSAGE);
        assert!(gateway.prompts().is_empty());
    }

    #[tokio::test]
    async fn test_unparsable_plan_is_plain_answer() {
        let gateway = Arc::new(FakeGateway::new(
            PlanReply::Tools(vec![call("delete_everything", serde_json::json!({}))]),
            GenerateReply::Echo,
        ));
        let transcripts = Arc::new(FakeTranscripts::new(TranscriptResult::NotFound));

        let answer = orchestrator(&gateway, &transcripts).handle("hello").await.unwrap();
        assert_eq!(answer, REQUEST_FAILURE_MESSAGE);
    }

    #[tokio::test]
    async fn test_direct_answer_passes_through() {
        let gateway = Arc::new(FakeGateway::new(
            PlanReply::Respond("Hi! Send me text or a YouTube link.".to_string()),
            GenerateReply::Fail,
        ));
        let transcripts = Arc::new(FakeTranscripts::new(TranscriptResult::NotFound));

        let answer = orchestrator(&gateway, &transcripts).handle("hi").await.unwrap();
        assert_eq!(answer, "Hi! Send me text or a YouTube link.");
        assert!(gateway.prompts().is_empty());
    }

    #[tokio::test]
    async fn test_multiple_tools_run_in_order() {
        let gateway = Arc::new(FakeGateway::new(
            PlanReply::Tools(vec![
                call("process_text", serde_json::json!({ "instruction": "first", "text": "a" })),
                call("process_video", serde_json::json!({ "instruction": "second", "url": "nope" })),
                call("process_text", serde_json::json!({ "instruction": "third", "text": "c" })),
            ]),
            GenerateReply::Echo,
        ));
        let transcripts = Arc::new(FakeTranscripts::new(TranscriptResult::NotFound));

        let answer = orchestrator(&gateway, &transcripts).handle("do three things").await.unwrap();
        assert_eq!(
            answer,
            format!(
                "first:\n\na\n\n{}\n\nthird:\n\nc",
                ToolFailure::InvalidReference.message()
            )
        );
    }

    #[tokio::test]
    async fn test_sequential_calls_answer_in_order() {
        let gateway = Arc::new(FakeGateway::new(PlanReply::TextOfUtterance, GenerateReply::Echo));
        let transcripts = Arc::new(FakeTranscripts::new(TranscriptResult::NotFound));
        let orchestrator = orchestrator(&gateway, &transcripts);

        let first = orchestrator.handle("one").await.unwrap();
        let second = orchestrator.handle("two").await.unwrap();

        assert_eq!(first, "echo:\n\none");
        assert_eq!(second, "echo:\n\ntwo");
        assert_eq!(gateway.plan_calls(), 2);
    }

    #[tokio::test]
    async fn test_new_uses_session_gateway() {
        let gateway = Arc::new(FakeGateway::new(PlanReply::TextOfUtterance, GenerateReply::Echo));
        let session = Session::validate_with("sk-test-1234567890", gateway.clone(), "Hello")
            .await
            .unwrap();
        let transcripts: Arc<dyn TranscriptSource> =
            Arc::new(FakeTranscripts::new(TranscriptResult::NotFound));

        let orchestrator = Orchestrator::new(&session, transcripts, &Settings::default()).unwrap();
        assert_eq!(orchestrator.handle("ping").await.unwrap(), "echo:\n\nping");
        assert_eq!(gateway.prompts(), vec!["Hello", "echo:\n\nping"]);
    }
}
