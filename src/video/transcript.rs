//! Caption transcript retrieval.
//!
//! Track discovery goes through `yt-dlp --dump-json`, which lists both
//! uploaded and auto-generated caption tracks per language. The chosen track is
//! then downloaded in YouTube's `json3` format and flattened into text.

use super::{watch_url, YOUTUBE_WATCH_URL};
use crate::error::{ClipwiseError, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use url::Url;
use tracing::{debug, info, instrument, warn};

/// Caption format requested from the platform.
const CAPTION_FORMAT: &str = "json3";

/// Outcome of a transcript lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranscriptResult {
    /// Caption text, fragments joined in temporal order.
    Found { text: String },
    /// The video has no caption track in any preferred language.
    NotFound,
    /// The lookup itself failed (tool missing, network, unparsable payload).
    FetchError { detail: String },
}

impl TranscriptResult {
    /// Convert into a plain result for callers that only care about the text.
    pub fn into_result(self, video_id: &str) -> Result<String> {
        match self {
            TranscriptResult::Found { text } => Ok(text),
            TranscriptResult::NotFound => Err(ClipwiseError::TranscriptAbsent(video_id.to_string())),
            TranscriptResult::FetchError { detail } => Err(ClipwiseError::TranscriptFetch(detail)),
        }
    }
}

/// Trait for transcript providers.
#[async_trait]
pub trait TranscriptSource: Send + Sync {
    /// Fetch the transcript for a canonical video id.
    ///
    /// `languages` is tried in order and the first available track wins.
    /// Implementations never retry.
    async fn fetch(&self, canonical_id: &str, languages: &[String]) -> TranscriptResult;
}

/// A single caption cue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptFragment {
    pub start_ms: u64,
    pub text: String,
}

/// A caption track chosen for download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptionTrack {
    pub language: String,
    pub url: String,
    pub auto_generated: bool,
}

/// Join fragments in temporal order with no separator.
///
/// Fragments already carry their own spacing. Cues sharing a start time keep
/// their original order.
pub fn join_fragments(mut fragments: Vec<TranscriptFragment>) -> String {
    fragments.sort_by_key(|f| f.start_ms);
    fragments.into_iter().map(|f| f.text).collect()
}

/// Pick the caption track to download from `yt-dlp --dump-json` output.
///
/// Languages are tried in preference order. Within a language, uploaded
/// subtitles beat auto-generated captions. yt-dlp also lists machine
/// translations of the auto-generated track into most languages (URLs carrying
/// `tlang`); those are never picked, so only tracks that exist on the video count.
pub fn select_track(metadata: &serde_json::Value, languages: &[String]) -> Option<CaptionTrack> {
    for language in languages {
        let candidates = [
            ("subtitles", language.clone(), false),
            ("automatic_captions", format!("{}-orig", language), true),
            ("automatic_captions", language.clone(), true),
        ];

        for (key, track_key, auto_generated) in candidates {
            let url = metadata[key][track_key.as_str()]
                .as_array()
                .and_then(|formats| {
                    formats.iter().find(|f| {
                        f["ext"].as_str() == Some(CAPTION_FORMAT)
                            && f["url"].as_str().is_some_and(|u| !is_translation(u))
                    })
                })
                .and_then(|f| f["url"].as_str());

            if let Some(url) = url {
                return Some(CaptionTrack {
                    language: language.clone(),
                    url: url.to_string(),
                    auto_generated,
                });
            }
        }
    }
    None
}

/// Whether a caption URL asks the platform to machine-translate the track.
fn is_translation(caption_url: &str) -> bool {
    Url::parse(caption_url)
        .map(|u| u.query_pairs().any(|(key, _)| key == "tlang"))
        .unwrap_or(false)
}

#[derive(Deserialize)]
struct Json3 {
    #[serde(default)]
    events: Vec<Json3Event>,
}

#[derive(Deserialize)]
struct Json3Event {
    #[serde(rename = "tStartMs", default)]
    start_ms: u64,
    #[serde(rename = "aAppend", default)]
    append: u8,
    #[serde(default)]
    segs: Vec<Json3Segment>,
}

#[derive(Deserialize)]
struct Json3Segment {
    #[serde(default)]
    utf8: String,
}

/// Parse a `json3` caption payload into fragments.
///
/// Events without segments and line-break append events are dropped.
pub fn parse_json3(body: &str) -> Result<Vec<TranscriptFragment>> {
    let parsed: Json3 = serde_json::from_str(body)?;

    Ok(parsed
        .events
        .into_iter()
        .filter(|e| e.append == 0 && !e.segs.is_empty())
        .map(|e| TranscriptFragment {
            start_ms: e.start_ms,
            text: e.segs.into_iter().map(|s| s.utf8).collect(),
        })
        .filter(|f| !f.text.is_empty())
        .collect())
}

/// Transcript source backed by yt-dlp and the platform caption endpoint.
pub struct YtDlpTranscriptSource {
    ytdlp_path: String,
    watch_url_template: String,
    http: reqwest::Client,
}

impl YtDlpTranscriptSource {
    /// Create a source using the given yt-dlp executable.
    pub fn new(ytdlp_path: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()?;

        Ok(Self {
            ytdlp_path: ytdlp_path.to_string(),
            watch_url_template: YOUTUBE_WATCH_URL.to_string(),
            http,
        })
    }

    /// Use a different watch URL template (`{id}` marks the video id).
    pub fn with_watch_url(mut self, template: &str) -> Self {
        self.watch_url_template = template.to_string();
        self
    }

    /// URL yt-dlp is pointed at for a canonical id.
    pub fn video_url(&self, video_id: &str) -> String {
        watch_url(&self.watch_url_template, video_id)
    }

    /// Dump video metadata (including caption track listings) with yt-dlp.
    async fn dump_metadata(&self, video_id: &str) -> Result<serde_json::Value> {
        let url = self.video_url(video_id);

        let output = tokio::process::Command::new(&self.ytdlp_path)
            .args(["--dump-json", "--skip-download", "--no-warnings", &url])
            .output()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    ClipwiseError::ToolNotFound(self.ytdlp_path.clone())
                } else {
                    ClipwiseError::ToolFailed(format!("Failed to run yt-dlp: {}", e))
                }
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ClipwiseError::ToolFailed(format!(
                "yt-dlp could not read video {}: {}",
                video_id,
                stderr.trim()
            )));
        }

        Ok(serde_json::from_slice(&output.stdout)?)
    }

    async fn download_track(&self, track: &CaptionTrack) -> Result<String> {
        let body = self
            .http
            .get(&track.url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        Ok(body)
    }
}

#[async_trait]
impl TranscriptSource for YtDlpTranscriptSource {
    #[instrument(skip(self))]
    async fn fetch(&self, canonical_id: &str, languages: &[String]) -> TranscriptResult {
        let metadata = match self.dump_metadata(canonical_id).await {
            Ok(metadata) => metadata,
            Err(e) => {
                warn!("Transcript fetch failed for {}: {}", canonical_id, e);
                return TranscriptResult::FetchError {
                    detail: e.to_string(),
                };
            }
        };

        let Some(track) = select_track(&metadata, languages) else {
            info!("No transcript found for {} in {:?}", canonical_id, languages);
            return TranscriptResult::NotFound;
        };

        debug!(
            "Using {} captions ({}) for {}",
            track.language,
            if track.auto_generated { "auto-generated" } else { "uploaded" },
            canonical_id
        );

        let fragments = match self
            .download_track(&track)
            .await
            .and_then(|body| parse_json3(&body))
        {
            Ok(fragments) => fragments,
            Err(e) => {
                warn!("Caption download failed for {}: {}", canonical_id, e);
                return TranscriptResult::FetchError {
                    detail: e.to_string(),
                };
            }
        };

        if fragments.is_empty() {
            info!("Caption track for {} is empty", canonical_id);
            return TranscriptResult::NotFound;
        }

        debug!("Fetched {} caption fragments", fragments.len());
        TranscriptResult::Found {
            text: join_fragments(fragments),
        }
    }
}
