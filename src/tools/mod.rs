//! The two tools the planner can choose between.
//!
//! `process_text` runs a user instruction over supplied text; `process_video`
//! resolves a video link, pulls its transcript and runs the instruction over
//! that. Both always answer with user-facing text.

mod request;
mod toolset;

pub use request::{parse_tool_call, tool_catalog, Request, ToolInvocation, ToolName};
pub use toolset::{build_prompt, ToolFailure, ToolResult, ToolSet};
