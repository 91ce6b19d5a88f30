//! Video link recognition and transcript retrieval.
//!
//! [`LinkExtractor`] turns whatever the user pasted into a canonical video id,
//! and a [`TranscriptSource`] turns that id into caption text.

mod extractor;
mod transcript;

pub use extractor::{LinkExtractor, VideoReference};
pub use transcript::{
    join_fragments, parse_json3, select_track, CaptionTrack, TranscriptFragment,
    TranscriptResult, TranscriptSource, YtDlpTranscriptSource,
};

/// Watch URL template for YouTube; `{id}` is replaced by the canonical id.
pub const YOUTUBE_WATCH_URL: &str = "https://www.youtube.com/watch?v={id}";

/// Build the watch URL handed to yt-dlp for a canonical id.
pub fn watch_url(template: &str, video_id: &str) -> String {
    template.replace("{id}", video_id)
}
