//! Configuration settings for Clipwise.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub model: ModelSettings,
    pub transcript: TranscriptSettings,
    pub extractor: ExtractorSettings,
    pub server: ServerSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
        }
    }
}

/// Language model backend settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelSettings {
    /// Chat model used for both planning and generation.
    pub model: String,
    /// Sampling temperature.
    pub temperature: f32,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// System prompt sent with the planning call.
    pub system_prompt: String,
    /// Trivial prompt issued once to validate a credential.
    pub validation_prompt: String,
    /// API key (OPENAI_API_KEY takes precedence when set).
    pub api_key: Option<String>,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            temperature: 0.0,
            timeout_secs: 300,
            system_prompt: "You are a helpful assistant.".to_string(),
            validation_prompt: "Hello".to_string(),
            api_key: None,
        }
    }
}

/// Transcript retrieval settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriptSettings {
    /// Caption languages in preference order; the first available wins.
    pub languages: Vec<String>,
    /// Path or name of the yt-dlp executable.
    pub ytdlp_path: String,
}

impl Default for TranscriptSettings {
    fn default() -> Self {
        Self {
            languages: vec!["ar".to_string(), "en".to_string()],
            ytdlp_path: "yt-dlp".to_string(),
        }
    }
}

/// Video link recognition settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorSettings {
    /// Hosts serving the long (`/watch?v=`) and embed forms.
    pub hosts: Vec<String>,
    /// Hosts serving the short-link form, where the id is the first path segment.
    pub short_hosts: Vec<String>,
    /// Query parameters that may carry the id on `hosts`.
    pub query_params: Vec<String>,
    /// Path prefixes followed by the id on `hosts` (e.g. `embed`).
    pub path_prefixes: Vec<String>,
    /// Regex a candidate id must fully match.
    pub id_pattern: String,
    /// URL handed to yt-dlp for a resolved id; `{id}` is replaced by the id.
    pub watch_url: String,
}

impl Default for ExtractorSettings {
    fn default() -> Self {
        Self {
            hosts: vec![
                "youtube.com".to_string(),
                "youtube-nocookie.com".to_string(),
            ],
            short_hosts: vec!["youtu.be".to_string()],
            query_params: vec!["v".to_string()],
            path_prefixes: vec![
                "embed".to_string(),
                "v".to_string(),
                "shorts".to_string(),
                "live".to_string(),
            ],
            id_pattern: "^[A-Za-z0-9_-]{11}$".to_string(),
            watch_url: crate::video::YOUTUBE_WATCH_URL.to_string(),
        }
    }
}

/// HTTP shell settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => Self::expand_path(&p.to_string_lossy()),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Save settings to the default configuration file.
    pub fn save(&self) -> crate::error::Result<()> {
        self.save_to(&Self::default_config_path())
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::ClipwiseError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("clipwise")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Resolve the credential to use: explicit value, then environment, then config file.
    pub fn resolve_api_key(&self, explicit: Option<&str>) -> Option<String> {
        explicit
            .map(str::to_string)
            .or_else(|| std::env::var("OPENAI_API_KEY").ok())
            .or_else(|| self.model.api_key.clone())
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.transcript.languages, vec!["ar", "en"]);
        assert_eq!(settings.model.temperature, 0.0);
        assert_eq!(settings.extractor.short_hosts, vec!["youtu.be"]);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let settings: Settings = toml::from_str(
            r#"
            [model]
            model = "gpt-4.1"

            [transcript]
            languages = ["en"]
            "#,
        )
        .unwrap();

        assert_eq!(settings.model.model, "gpt-4.1");
        assert_eq!(settings.model.timeout_secs, 300);
        assert_eq!(settings.transcript.languages, vec!["en"]);
        assert_eq!(settings.transcript.ytdlp_path, "yt-dlp");
        assert_eq!(settings.server.port, 3000);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut settings = Settings::default();
        settings.server.port = 8080;
        settings.extractor.hosts.push("video.host".to_string());
        settings.extractor.watch_url = "https://video.host/watch?id={id}".to_string();
        settings.save_to(&path).unwrap();

        let loaded = Settings::load_from(Some(&path)).unwrap();
        assert_eq!(loaded.server.port, 8080);
        assert!(loaded.extractor.hosts.contains(&"video.host".to_string()));
        assert_eq!(loaded.extractor.watch_url, "https://video.host/watch?id={id}");
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        let loaded = Settings::load_from(Some(&path)).unwrap();
        assert_eq!(loaded.model.model, "gpt-4o-mini");
    }

    #[test]
    fn test_explicit_api_key_wins() {
        let settings = Settings::default();
        assert_eq!(
            settings.resolve_api_key(Some("  sk-explicit ")),
            Some("sk-explicit".to_string())
        );
    }
}
