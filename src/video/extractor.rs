//! Canonical video id extraction from links.

use crate::config::ExtractorSettings;
use crate::error::{ClipwiseError, Result};
use regex::Regex;
use url::Url;

/// Host prefixes that do not change which site a link points at.
const IGNORED_HOST_PREFIXES: &[&str] = &["www.", "m.", "music."];

/// A user-supplied video reference and the id extracted from it, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoReference {
    pub raw_input: String,
    pub canonical_id: Option<String>,
}

impl VideoReference {
    /// Whether a canonical id was found.
    pub fn is_resolved(&self) -> bool {
        self.canonical_id.is_some()
    }
}

/// Recognises the short, long and embed link forms of a video host.
#[derive(Debug, Clone)]
pub struct LinkExtractor {
    hosts: Vec<String>,
    short_hosts: Vec<String>,
    query_params: Vec<String>,
    path_prefixes: Vec<String>,
    id_regex: Regex,
}

impl LinkExtractor {
    /// Create an extractor from configuration.
    pub fn new(settings: &ExtractorSettings) -> Result<Self> {
        let id_regex = Regex::new(&settings.id_pattern).map_err(|e| {
            ClipwiseError::Config(format!(
                "Invalid extractor id_pattern '{}': {}",
                settings.id_pattern, e
            ))
        })?;

        let lower = |values: &[String]| -> Vec<String> {
            values.iter().map(|v| v.trim().to_lowercase()).collect()
        };

        Ok(Self {
            hosts: lower(&settings.hosts),
            short_hosts: lower(&settings.short_hosts),
            query_params: settings.query_params.clone(),
            path_prefixes: lower(&settings.path_prefixes),
            id_regex,
        })
    }

    /// Extractor for the default YouTube link forms.
    pub fn youtube() -> Self {
        Self::new(&ExtractorSettings::default()).expect("Invalid default id pattern")
    }

    /// Resolve raw input into a [`VideoReference`].
    ///
    /// The input may be a bare link or a sentence containing one; every
    /// whitespace-separated token is tried and the first match wins. A miss is
    /// a normal outcome and yields `canonical_id: None`.
    pub fn extract(&self, raw_input: &str) -> VideoReference {
        let canonical_id = raw_input
            .split_whitespace()
            .find_map(|token| self.id_from_token(token));

        VideoReference {
            raw_input: raw_input.to_string(),
            canonical_id,
        }
    }

    fn id_from_token(&self, token: &str) -> Option<String> {
        let token = token.trim_matches(|c: char| {
            matches!(c, '"' | '\'' | '<' | '>' | '(' | ')' | '[' | ']' | ',' | ';' | '.' | '!' | '?')
        });
        if token.is_empty() {
            return None;
        }

        let url = if token.contains("://") {
            Url::parse(token).ok()?
        } else {
            Url::parse(&format!("https://{}", token)).ok()?
        };

        let host = normalize_host(url.host_str()?);

        let candidate = if self.short_hosts.iter().any(|h| *h == host) {
            url.path_segments()?.next().map(str::to_string)
        } else if self.hosts.iter().any(|h| *h == host) {
            self.id_from_query(&url).or_else(|| self.id_from_path(&url))
        } else {
            None
        };

        let candidate = candidate?;
        self.id_regex.is_match(&candidate).then_some(candidate)
    }

    fn id_from_query(&self, url: &Url) -> Option<String> {
        self.query_params.iter().find_map(|param| {
            url.query_pairs()
                .find(|(key, _)| key == param.as_str())
                .map(|(_, value)| value.into_owned())
        })
    }

    fn id_from_path(&self, url: &Url) -> Option<String> {
        let mut segments = url.path_segments()?;
        let prefix = segments.next()?.to_lowercase();
        if self.path_prefixes.contains(&prefix) {
            segments.next().map(str::to_string)
        } else {
            None
        }
    }
}

impl Default for LinkExtractor {
    fn default() -> Self {
        Self::youtube()
    }
}

fn normalize_host(host: &str) -> String {
    let host = host.to_lowercase();
    IGNORED_HOST_PREFIXES
        .iter()
        .find_map(|prefix| host.strip_prefix(prefix))
        .map(str::to_string)
        .unwrap_or(host)
}
