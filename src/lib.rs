//! Clipwise - ask a language model about text and YouTube videos
//!
//! A user types one utterance such as "summarize: https://youtu.be/dQw4w9WgXcQ"
//! or "translate to French: good morning". A planning call to the model picks
//! the tool that fits; the tool fetches the video's captions when needed and
//! asks the model to apply the instruction to the content.
//!
//! # Architecture
//!
//! - `config` - Configuration management
//! - `video` - Link extraction and caption retrieval
//! - `gateway` - Language model access (plain generation and tool planning)
//! - `tools` - The process-text and process-video tools
//! - `session` - Validated credential holder
//! - `orchestrator` - Plans one utterance and runs the chosen tools
//! - `cli` - Console, one-shot and HTTP front-ends
//!
//! # Example
//!
//! ```rust,no_run
//! use clipwise::config::Settings;
//! use clipwise::orchestrator::Orchestrator;
//! use clipwise::session::Session;
//! use clipwise::video::YtDlpTranscriptSource;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let session = Session::validate("sk-...", &settings.model).await?;
//!     let transcripts = Arc::new(YtDlpTranscriptSource::new(&settings.transcript.ytdlp_path)?);
//!     let orchestrator = Orchestrator::new(&session, transcripts, &settings)?;
//!
//!     let answer = orchestrator
//!         .handle("summarize: https://youtu.be/dQw4w9WgXcQ")
//!         .await?;
//!     println!("{}", answer);
//!
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod gateway;
pub mod orchestrator;
pub mod session;
pub mod tools;
pub mod video;

#[cfg(test)]
mod testing;

pub use error::{ClipwiseError, Result};
