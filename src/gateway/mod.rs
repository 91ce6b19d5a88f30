//! Call boundary to the generative-language backend.
//!
//! A [`ModelGateway`] does two things: generate text for a finished prompt, and
//! act as a tool-calling planner that decides which tool should handle a
//! free-form utterance. Both calls are single-shot and never retried here.

mod openai;

pub use openai::{create_client, plan_from_choice, OpenAiGateway};

use crate::error::Result;
use crate::tools::ToolInvocation;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Backend-neutral declaration of a tool offered to the planner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    /// JSON schema of the tool arguments.
    pub parameters: serde_json::Value,
}

/// The planner's decision for one utterance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Plan {
    /// Run these tools, in order.
    Invoke(Vec<ToolInvocation>),
    /// No tool needed; the backend answered directly.
    Respond(String),
}

/// Trait for language model backends.
#[async_trait]
pub trait ModelGateway: Send + Sync {
    /// Generate text for a fully formed prompt.
    ///
    /// Transport, auth and quota failures surface as `ClipwiseError::Service`.
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Ask the backend which tool (if any) should handle the utterance.
    ///
    /// Unparsable decisions surface as `ClipwiseError::Planning`.
    async fn plan(&self, utterance: &str, catalog: &[ToolSpec]) -> Result<Plan>;
}
