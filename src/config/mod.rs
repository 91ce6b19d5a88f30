//! Configuration module for Clipwise.
//!
//! Handles loading and managing application settings.

mod settings;

pub use settings::{
    ExtractorSettings, GeneralSettings, ModelSettings, ServerSettings, Settings,
    TranscriptSettings,
};
