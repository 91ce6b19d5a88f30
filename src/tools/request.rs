//! Tool requests, the declared tool catalog and planner decision parsing.

use crate::error::{ClipwiseError, Result};
use crate::gateway::ToolSpec;

/// An instruction paired with the content it applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    instruction: String,
    payload: String,
}

impl Request {
    /// Create a request. The instruction must not be blank.
    pub fn new(instruction: impl Into<String>, payload: impl Into<String>) -> Result<Self> {
        let instruction = instruction.into();
        if instruction.trim().is_empty() {
            return Err(ClipwiseError::Validation(
                "Request instruction must not be empty".to_string(),
            ));
        }

        Ok(Self {
            instruction,
            payload: payload.into(),
        })
    }

    /// What the user wants done, e.g. "summarize".
    pub fn instruction(&self) -> &str {
        &self.instruction
    }

    /// Raw text or a video reference.
    pub fn payload(&self) -> &str {
        &self.payload
    }
}

/// Tools available to the planner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolName {
    ProcessText,
    ProcessVideo,
}

impl ToolName {
    /// Name declared to the model backend.
    pub fn as_str(&self) -> &'static str {
        match self {
            ToolName::ProcessText => "process_text",
            ToolName::ProcessVideo => "process_video",
        }
    }

    /// Name of the argument carrying the payload.
    fn payload_argument(&self) -> &'static str {
        match self {
            ToolName::ProcessText => "text",
            ToolName::ProcessVideo => "url",
        }
    }
}

impl std::fmt::Display for ToolName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ToolName {
    type Err = ClipwiseError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "process_text" => Ok(ToolName::ProcessText),
            "process_video" => Ok(ToolName::ProcessVideo),
            _ => Err(ClipwiseError::Planning(format!("Unknown tool: {}", s))),
        }
    }
}

/// A planner decision to run one tool on one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolInvocation {
    pub tool: ToolName,
    pub request: Request,
}

/// Tool declarations sent with every planning call.
pub fn tool_catalog() -> Vec<ToolSpec> {
    vec![
        ToolSpec {
            name: ToolName::ProcessText.as_str().to_string(),
            description: "Process a given text based on the request given. \
                Use this when the user supplies the text to work on directly."
                .to_string(),
            parameters: serde_json::json!({
                "type": "object",
                "properties": {
                    "instruction": {
                        "type": "string",
                        "description": "The user request, e.g. 'summarize' or 'translate to French'"
                    },
                    "text": {
                        "type": "string",
                        "description": "Text to process"
                    }
                },
                "required": ["instruction", "text"]
            }),
        },
        ToolSpec {
            name: ToolName::ProcessVideo.as_str().to_string(),
            description: "Process a YouTube video given its URL based on the request given. \
                Use this when the user refers to a video link."
                .to_string(),
            parameters: serde_json::json!({
                "type": "object",
                "properties": {
                    "instruction": {
                        "type": "string",
                        "description": "The user request, e.g. 'summarize' or 'list the key points'"
                    },
                    "url": {
                        "type": "string",
                        "description": "The YouTube video URL"
                    }
                },
                "required": ["instruction", "url"]
            }),
        },
    ]
}

/// Parse a tool call from the model backend into a [`ToolInvocation`].
pub fn parse_tool_call(name: &str, arguments: &str) -> Result<ToolInvocation> {
    let tool: ToolName = name.parse()?;

    let args: serde_json::Value = serde_json::from_str(arguments)
        .map_err(|e| ClipwiseError::Planning(format!("Invalid tool arguments: {}", e)))?;

    let argument = |key: &str| -> Result<String> {
        args[key]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| ClipwiseError::Planning(format!("Missing '{}' argument", key)))
    };

    let instruction = argument("instruction")?;
    let payload = argument(tool.payload_argument())?;

    let request = Request::new(instruction, payload)
        .map_err(|e| ClipwiseError::Planning(e.to_string()))?;

    Ok(ToolInvocation { tool, request })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_rejects_blank_instruction() {
        assert!(matches!(
            Request::new("   ", "text"),
            Err(ClipwiseError::Validation(_))
        ));
        let request = Request::new("summarize", "").unwrap();
        assert_eq!(request.instruction(), "summarize");
        assert_eq!(request.payload(), "");
    }

    #[test]
    fn test_parse_process_text() {
        let invocation = parse_tool_call(
            "process_text",
            r#"{"instruction": "translate to French", "text": "Good morning"}"#,
        )
        .unwrap();
        assert_eq!(invocation.tool, ToolName::ProcessText);
        assert_eq!(invocation.request.instruction(), "translate to French");
        assert_eq!(invocation.request.payload(), "Good morning");
    }

    #[test]
    fn test_parse_process_video() {
        let invocation = parse_tool_call(
            "process_video",
            r#"{"instruction": "summarize", "url": "https://youtu.be/dQw4w9WgXcQ"}"#,
        )
        .unwrap();
        assert_eq!(invocation.tool, ToolName::ProcessVideo);
        assert_eq!(invocation.request.payload(), "https://youtu.be/dQw4w9WgXcQ");
    }

    #[test]
    fn test_parse_failures_are_planning_errors() {
        for (name, args) in [
            ("search", r#"{"instruction": "x", "text": "y"}"#),
            ("process_text", "not json"),
            ("process_video", r#"{"instruction": "summarize"}"#),
            ("process_text", r#"{"instruction": "", "text": "y"}"#),
        ] {
            assert!(
                matches!(parse_tool_call(name, args), Err(ClipwiseError::Planning(_))),
                "expected planning error for {} {}",
                name,
                args
            );
        }
    }

    #[test]
    fn test_catalog_matches_tool_names() {
        let names: Vec<_> = tool_catalog().into_iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["process_text", "process_video"]);
    }
}
