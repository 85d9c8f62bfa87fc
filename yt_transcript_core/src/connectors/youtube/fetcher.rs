use crate::error::FetchError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One timed caption line, in the only shape the rest of the crate sees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptSegment {
    pub text: String,
    /// Seconds from the start of the video.
    pub start: f64,
    /// Seconds.
    pub duration: f64,
}

impl TranscriptSegment {
    pub fn new(text: impl Into<String>, start: f64, duration: f64) -> Self {
        Self {
            text: text.into(),
            start,
            duration,
        }
    }
}

/// Source of raw transcripts.
///
/// `languages = None` asks for whatever transcript the source prefers;
/// `Some` restricts the fetch to the given language codes.
#[async_trait]
pub trait TranscriptFetcher: Send + Sync {
    async fn fetch(
        &self,
        video_id: &str,
        languages: Option<&[String]>,
    ) -> Result<Vec<TranscriptSegment>, FetchError>;
}

#[cfg(feature = "youtube")]
pub use live::YtTranscriptFetcher;

#[cfg(feature = "youtube")]
mod live {
    use super::*;
    use futures::FutureExt;
    use std::panic::AssertUnwindSafe;
    use tracing::debug;
    use yt_transcript_rs::errors::{CouldNotRetrieveTranscript, CouldNotRetrieveTranscriptReason};
    use yt_transcript_rs::YouTubeTranscriptApi;

    /// Language preference used when the caller does not restrict the fetch.
    const DEFAULT_LANGUAGES: &[&str] = &["en"];

    /// Fetches captions from YouTube through `yt-transcript-rs`.
    pub struct YtTranscriptFetcher {
        api: YouTubeTranscriptApi,
    }

    impl YtTranscriptFetcher {
        pub fn new() -> Result<Self, FetchError> {
            let api = YouTubeTranscriptApi::new(None, None, None)
                .map_err(|e| FetchError::Other(e.to_string()))?;
            Ok(Self { api })
        }
    }

    #[async_trait]
    impl TranscriptFetcher for YtTranscriptFetcher {
        async fn fetch(
            &self,
            video_id: &str,
            languages: Option<&[String]>,
        ) -> Result<Vec<TranscriptSegment>, FetchError> {
            let requested: Vec<&str> = match languages {
                Some(codes) => codes.iter().map(String::as_str).collect(),
                None => DEFAULT_LANGUAGES.to_vec(),
            };
            debug!(video_id = %video_id, languages = ?requested, "Fetching transcript");

            // Guard against upstream panics in yt-transcript-rs
            let fetched = AssertUnwindSafe(self.api.fetch_transcript(video_id, &requested, false))
                .catch_unwind()
                .await
                .map_err(|_| FetchError::Other("transcript fetch panicked".to_string()))?
                .map_err(map_fetch_error)?;

            Ok(fetched
                .parts()
                .iter()
                .map(|part| TranscriptSegment::new(part.text.clone(), part.start, part.duration))
                .collect())
        }
    }

    fn map_fetch_error(err: CouldNotRetrieveTranscript) -> FetchError {
        match &err.reason {
            Some(CouldNotRetrieveTranscriptReason::TranscriptsDisabled) => {
                FetchError::TranscriptsDisabled
            }
            Some(CouldNotRetrieveTranscriptReason::NoTranscriptFound { .. }) => {
                FetchError::NoTranscriptFound
            }
            Some(CouldNotRetrieveTranscriptReason::VideoUnavailable) => FetchError::VideoUnavailable,
            _ => FetchError::Other(err.to_string()),
        }
    }

}
