//! In-memory fakes for the model backend and transcript service.

use crate::error::{ClipwiseError, Result};
use crate::gateway::{ModelGateway, Plan, ToolSpec};
use crate::tools::parse_tool_call;
use crate::video::{join_fragments, TranscriptFragment, TranscriptResult, TranscriptSource};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// How the fake planner answers.
pub enum PlanReply {
    /// Raw `(tool name, JSON arguments)` calls, parsed like a real backend reply.
    Tools(Vec<(String, String)>),
    /// Route every utterance to `process_text` with the utterance as payload.
    TextOfUtterance,
    /// Answer without tools.
    Respond(String),
    /// Fail as if the backend were unreachable.
    Fail,
}

/// How the fake generator answers.
pub enum GenerateReply {
    Fixed(String),
    /// Return the prompt itself.
    Echo,
    Fail,
}

pub struct FakeGateway {
    plan_reply: PlanReply,
    generate_reply: GenerateReply,
    plan_calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl FakeGateway {
    pub fn new(plan_reply: PlanReply, generate_reply: GenerateReply) -> Self {
        Self {
            plan_reply,
            generate_reply,
            plan_calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn generating(generate_reply: GenerateReply) -> Self {
        Self::new(PlanReply::Fail, generate_reply)
    }

    pub fn plan_calls(&self) -> usize {
        self.plan_calls.load(Ordering::SeqCst)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl ModelGateway for FakeGateway {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        match &self.generate_reply {
            GenerateReply::Fixed(text) => Ok(text.clone()),
            GenerateReply::Echo => Ok(prompt.to_string()),
            GenerateReply::Fail => Err(ClipwiseError::Service("quota exceeded".to_string())),
        }
    }

    async fn plan(&self, utterance: &str, catalog: &[ToolSpec]) -> Result<Plan> {
        self.plan_calls.fetch_add(1, Ordering::SeqCst);
        assert_eq!(catalog.len(), 2, "planner should always see the full catalog");

        match &self.plan_reply {
            PlanReply::Tools(calls) => Ok(Plan::Invoke(
                calls
                    .iter()
                    .map(|(name, args)| parse_tool_call(name, args))
                    .collect::<Result<Vec<_>>>()?,
            )),
            PlanReply::TextOfUtterance => {
                let args = serde_json::json!({ "instruction": "echo", "text": utterance });
                Ok(Plan::Invoke(vec![parse_tool_call("process_text", &args.to_string())?]))
            }
            PlanReply::Respond(text) => Ok(Plan::Respond(text.clone())),
            PlanReply::Fail => Err(ClipwiseError::Service("connection refused".to_string())),
        }
    }
}

pub struct FakeTranscripts {
    result: TranscriptResult,
    calls: AtomicUsize,
    last_request: Mutex<Option<(String, Vec<String>)>>,
}

impl FakeTranscripts {
    pub fn new(result: TranscriptResult) -> Self {
        Self {
            result,
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        }
    }

    /// A service returning these caption fragments, timed in order.
    pub fn from_fragments(fragments: &[&str]) -> Self {
        let fragments = fragments
            .iter()
            .enumerate()
            .map(|(i, text)| TranscriptFragment {
                start_ms: i as u64 * 1000,
                text: text.to_string(),
            })
            .collect();
        Self::new(TranscriptResult::Found {
            text: join_fragments(fragments),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<(String, Vec<String>)> {
        self.last_request.lock().unwrap().clone()
    }
}

#[async_trait]
impl TranscriptSource for FakeTranscripts {
    async fn fetch(&self, canonical_id: &str, languages: &[String]) -> TranscriptResult {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() = Some((canonical_id.to_string(), languages.to_vec()));
        self.result.clone()
    }
}
