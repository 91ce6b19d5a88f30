//! OpenAI chat-completions gateway.

use super::{ModelGateway, Plan, ToolSpec};
use crate::config::ModelSettings;
use crate::error::{ClipwiseError, Result};
use crate::tools::parse_tool_call;
use async_openai::config::OpenAIConfig;
use async_openai::types::{
    ChatChoice, ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs, ChatCompletionTool, ChatCompletionToolType,
    CreateChatCompletionRequestArgs, FunctionObject,
};
use async_openai::Client;
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, info};

/// Create an OpenAI client for one API key with the given request timeout.
pub fn create_client(api_key: &str, timeout: Duration) -> Result<Client<OpenAIConfig>> {
    let http_client = reqwest::Client::builder().timeout(timeout).build()?;

    Ok(Client::with_config(OpenAIConfig::new().with_api_key(api_key)).with_http_client(http_client))
}

/// Gateway backed by the OpenAI chat completions API.
pub struct OpenAiGateway {
    client: Client<OpenAIConfig>,
    model: String,
    temperature: f32,
    system_prompt: String,
}

impl OpenAiGateway {
    /// Create a gateway for one API key.
    pub fn new(api_key: &str, settings: &ModelSettings) -> Result<Self> {
        Ok(Self {
            client: create_client(api_key, Duration::from_secs(settings.timeout_secs))?,
            model: settings.model.clone(),
            temperature: settings.temperature,
            system_prompt: settings.system_prompt.clone(),
        })
    }

    /// Model name used for every call.
    pub fn model(&self) -> &str {
        &self.model
    }

    async fn complete(
        &self,
        messages: Vec<ChatCompletionRequestMessage>,
        tools: Option<Vec<ChatCompletionTool>>,
    ) -> Result<ChatChoice> {
        let mut args = CreateChatCompletionRequestArgs::default();
        args.model(&self.model)
            .messages(messages)
            .temperature(self.temperature);
        if let Some(tools) = tools {
            args.tools(tools);
        }
        let request = args.build().map_err(service_error)?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(service_error)?;

        response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ClipwiseError::Service("No response from model".to_string()))
    }
}

#[async_trait]
impl ModelGateway for OpenAiGateway {
    async fn generate(&self, prompt: &str) -> Result<String> {
        debug!("Generating for prompt of {} chars", prompt.len());

        let messages = vec![user_message(prompt)?];
        let choice = self.complete(messages, None).await?;

        choice
            .message
            .content
            .ok_or_else(|| ClipwiseError::Service("Empty response from model".to_string()))
    }

    async fn plan(&self, utterance: &str, catalog: &[ToolSpec]) -> Result<Plan> {
        let messages = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(self.system_prompt.clone())
                .build()
                .map_err(service_error)?
                .into(),
            user_message(utterance)?,
        ];

        let tools = catalog.iter().map(to_openai_tool).collect();
        let choice = self.complete(messages, Some(tools)).await?;
        plan_from_choice(choice)
    }
}

/// Turn the planner's reply into a [`Plan`].
///
/// Tool calls become invocations in the order the backend listed them; a
/// reply with no tool calls is a direct answer.
pub fn plan_from_choice(choice: ChatChoice) -> Result<Plan> {
    match choice.message.tool_calls {
        Some(tool_calls) if !tool_calls.is_empty() => {
            let invocations = tool_calls
                .iter()
                .map(|call| {
                    info!(
                        "Planner chose tool: {} with args: {}",
                        call.function.name, call.function.arguments
                    );
                    parse_tool_call(&call.function.name, &call.function.arguments)
                })
                .collect::<Result<Vec<_>>>()?;
            Ok(Plan::Invoke(invocations))
        }
        _ => {
            let content = choice.message.content.ok_or_else(|| {
                ClipwiseError::Planning("Model returned neither a tool call nor text".to_string())
            })?;
            info!("Planner answered without tools");
            Ok(Plan::Respond(content))
        }
    }
}

fn user_message(content: &str) -> Result<ChatCompletionRequestMessage> {
    Ok(ChatCompletionRequestUserMessageArgs::default()
        .content(content)
        .build()
        .map_err(service_error)?
        .into())
}

fn service_error(e: async_openai::error::OpenAIError) -> ClipwiseError {
    ClipwiseError::Service(e.to_string())
}

/// Convert a tool declaration into the OpenAI function-tool format.
fn to_openai_tool(spec: &ToolSpec) -> ChatCompletionTool {
    ChatCompletionTool {
        r#type: ChatCompletionToolType::Function,
        function: FunctionObject {
            name: spec.name.clone(),
            description: Some(spec.description.clone()),
            parameters: Some(spec.parameters.clone()),
            strict: None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::{tool_catalog, ToolName};

    #[test]
    fn test_to_openai_tool() {
        let tool = to_openai_tool(&tool_catalog()[1]);
        assert_eq!(tool.function.name, "process_video");
        let params = tool.function.parameters.unwrap();
        assert_eq!(params["required"], serde_json::json!(["instruction", "url"]));
    }

    fn choice(message: serde_json::Value) -> ChatChoice {
        serde_json::from_value(serde_json::json!({
            "index": 0,
            "message": message,
            "finish_reason": "stop"
        }))
        .unwrap()
    }

    fn tool_call(id: &str, name: &str, arguments: serde_json::Value) -> serde_json::Value {
        serde_json::json!({
            "id": id,
            "type": "function",
            "function": { "name": name, "arguments": arguments.to_string() }
        })
    }

    #[test]
    fn test_tool_calls_become_invocations_in_order() {
        let plan = plan_from_choice(choice(serde_json::json!({
            "role": "assistant",
            "content": null,
            "tool_calls": [
                tool_call("call_1", "process_video", serde_json::json!({
                    "instruction": "summarize", "url": "https://youtu.be/dQw4w9WgXcQ"
                })),
                tool_call("call_2", "process_text", serde_json::json!({
                    "instruction": "translate to French", "text": "Good morning"
                }))
            ]
        })))
        .unwrap();

        let Plan::Invoke(invocations) = plan else {
            panic!("expected tool invocations, got {:?}", plan);
        };
        let tools: Vec<_> = invocations.iter().map(|i| i.tool).collect();
        assert_eq!(tools, vec![ToolName::ProcessVideo, ToolName::ProcessText]);
        assert_eq!(invocations[0].request.payload(), "https://youtu.be/dQw4w9WgXcQ");
        assert_eq!(invocations[1].request.instruction(), "translate to French");
    }

    #[test]
    fn test_plain_reply_is_direct_answer() {
        let plan = plan_from_choice(choice(serde_json::json!({
            "role": "assistant",
            "content": "Send me some text or a YouTube link."
        })))
        .unwrap();
        assert_eq!(plan, Plan::Respond("Send me some text or a YouTube link.".to_string()));

        let plan = plan_from_choice(choice(serde_json::json!({
            "role": "assistant",
            "content": "Hi!",
            "tool_calls": []
        })))
        .unwrap();
        assert_eq!(plan, Plan::Respond("Hi!".to_string()));
    }

    #[test]
    fn test_empty_reply_is_planning_error() {
        let result = plan_from_choice(choice(serde_json::json!({
            "role": "assistant",
            "content": null
        })));
        assert!(matches!(result, Err(ClipwiseError::Planning(_))));
    }

    #[test]
    fn test_unknown_tool_is_planning_error() {
        let result = plan_from_choice(choice(serde_json::json!({
            "role": "assistant",
            "tool_calls": [tool_call("call_1", "delete_everything", serde_json::json!({}))]
        })));
        assert!(matches!(result, Err(ClipwiseError::Planning(_))));
    }

    #[test]
    fn test_gateway_uses_configured_model() {
        let settings = ModelSettings {
            model: "gpt-4.1".to_string(),
            ..ModelSettings::default()
        };
        let gateway = OpenAiGateway::new("sk-test", &settings).unwrap();
        assert_eq!(gateway.model(), "gpt-4.1");
    }
}
