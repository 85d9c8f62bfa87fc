use super::fetcher::{TranscriptFetcher, TranscriptSegment};
use super::video_id::resolve_video_id;
use crate::error::FetchError;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

/// Language marker used when no specific transcript language was obtained.
pub const AUTO_DETECTED: &str = "auto-detected";

/// Closed set of outcomes reported in every tool response.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ResponseStatus {
    Success,
    TranscriptsDisabled,
    NoTranscript,
    VideoUnavailable,
    RateLimited,
    Error,
    InvalidRequest,
    InvalidInput,
    UnknownTool,
    ServerError,
}

/// Requested shape of a successful response.
#[derive(Debug, Serialize, Deserialize, JsonSchema, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// Timed segments plus metadata (default)
    #[default]
    Structured,
    /// Flattened plain text only
    Text,
}

impl OutputFormat {
    /// Anything other than `"text"` selects the structured format.
    pub fn from_arg(arg: Option<&str>) -> Self {
        match arg {
            Some("text") => OutputFormat::Text,
            _ => OutputFormat::Structured,
        }
    }
}

/// A fetched transcript with its derived fields.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TranscriptResult {
    video_id: String,
    language: String,
    is_generated: bool,
    transcript: Vec<TranscriptSegment>,
    plain_text: String,
    status: ResponseStatus,
    total_segments: usize,
    duration_seconds: f64,
}

impl TranscriptResult {
    /// Trims segment text, rounds timings to two decimals and derives the
    /// plain text, segment count and total duration.
    pub fn new(
        video_id: impl Into<String>,
        language: impl Into<String>,
        is_generated: bool,
        segments: Vec<TranscriptSegment>,
    ) -> Self {
        let transcript: Vec<TranscriptSegment> = segments
            .into_iter()
            .map(|s| TranscriptSegment::new(s.text.trim(), round2(s.start), round2(s.duration)))
            .collect();

        let plain_text = transcript
            .iter()
            .map(|s| s.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");

        let duration_seconds = transcript
            .last()
            .map(|last| round2(last.start + last.duration))
            .unwrap_or(0.0);

        Self {
            video_id: video_id.into(),
            language: language.into(),
            is_generated,
            total_segments: transcript.len(),
            transcript,
            plain_text,
            status: ResponseStatus::Success,
            duration_seconds,
        }
    }

    pub fn video_id(&self) -> &str {
        &self.video_id
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn is_generated(&self) -> bool {
        self.is_generated
    }

    pub fn segments(&self) -> &[TranscriptSegment] {
        &self.transcript
    }

    pub fn plain_text(&self) -> &str {
        &self.plain_text
    }

    pub fn total_segments(&self) -> usize {
        self.total_segments
    }

    pub fn duration_seconds(&self) -> f64 {
        self.duration_seconds
    }

    /// Reduce to the plain-text response shape.
    pub fn into_plain_text(self) -> PlainTextTranscript {
        PlainTextTranscript {
            video_id: self.video_id,
            language: self.language,
            is_generated: self.is_generated,
            text: self.plain_text,
            status: ResponseStatus::Success,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PlainTextTranscript {
    pub video_id: String,
    pub language: String,
    pub is_generated: bool,
    pub text: String,
    pub status: ResponseStatus,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<String>,
    pub status: ResponseStatus,
}

impl ErrorResponse {
    /// Error that is not tied to any video or input.
    pub fn new(status: ResponseStatus, error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            video_id: None,
            input: None,
            status,
        }
    }

    pub fn for_video(
        status: ResponseStatus,
        error: impl Into<String>,
        video_id: impl Into<String>,
    ) -> Self {
        Self {
            video_id: Some(video_id.into()),
            ..Self::new(status, error)
        }
    }

    pub fn for_input(
        status: ResponseStatus,
        error: impl Into<String>,
        input: impl Into<String>,
    ) -> Self {
        Self {
            input: Some(input.into()),
            ..Self::new(status, error)
        }
    }

    pub fn invalid_request(error: impl Into<String>) -> Self {
        Self::new(ResponseStatus::InvalidRequest, error)
    }

    pub fn unknown_tool(name: &str) -> Self {
        Self::new(ResponseStatus::UnknownTool, format!("Unknown tool: {}", name))
    }

    pub fn server_error(message: impl std::fmt::Display) -> Self {
        Self::new(
            ResponseStatus::ServerError,
            format!("Internal server error: {}", message),
        )
    }
}

/// Any payload the transcript tool can return.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum TranscriptResponse {
    Structured(TranscriptResult),
    Text(PlainTextTranscript),
    Error(ErrorResponse),
}

impl TranscriptResponse {
    pub fn status(&self) -> ResponseStatus {
        match self {
            TranscriptResponse::Structured(r) => r.status,
            TranscriptResponse::Text(t) => t.status,
            TranscriptResponse::Error(e) => e.status,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status() == ResponseStatus::Success
    }
}

impl From<ErrorResponse> for TranscriptResponse {
    fn from(value: ErrorResponse) -> Self {
        TranscriptResponse::Error(value)
    }
}

/// Fetch and normalize the transcript for an already resolved video ID.
///
/// With a language, one restricted attempt is made; if it fails for any
/// reason a single unrestricted attempt follows and its result is reported
/// as auto-detected. Only the final attempt's failure is reported.
pub async fn get_transcript(
    fetcher: &dyn TranscriptFetcher,
    video_id: &str,
    language: Option<&str>,
) -> TranscriptResponse {
    let language = language.filter(|l| !l.is_empty());

    let attempt = match language {
        Some(code) => {
            let requested = [code.to_string()];
            match fetcher.fetch(video_id, Some(&requested)).await {
                Ok(segments) => Ok((segments, code.to_string(), false)),
                Err(e) => {
                    debug!(
                        video_id = %video_id,
                        language = %code,
                        error = %e,
                        "Requested language unavailable, falling back to auto-detect"
                    );
                    fetcher
                        .fetch(video_id, None)
                        .await
                        .map(|segments| (segments, AUTO_DETECTED.to_string(), true))
                }
            }
        }
        None => fetcher
            .fetch(video_id, None)
            .await
            .map(|segments| (segments, AUTO_DETECTED.to_string(), true)),
    };

    match attempt {
        Ok((segments, language, is_generated)) => TranscriptResponse::Structured(
            TranscriptResult::new(video_id, language, is_generated, segments),
        ),
        Err(e) => map_fetch_failure(video_id, e).into(),
    }
}

/// Resolve a video reference, fetch its transcript and shape the response.
pub async fn get_youtube_transcript(
    fetcher: &dyn TranscriptFetcher,
    reference: &str,
    language: Option<&str>,
    format: OutputFormat,
) -> TranscriptResponse {
    let Some(video_id) = resolve_video_id(reference) else {
        return ErrorResponse::for_input(
            ResponseStatus::InvalidInput,
            "Invalid YouTube URL or video ID",
            reference,
        )
        .into();
    };

    match get_transcript(fetcher, &video_id, language).await {
        TranscriptResponse::Structured(result) if format == OutputFormat::Text => {
            TranscriptResponse::Text(result.into_plain_text())
        }
        other => other,
    }
}

fn map_fetch_failure(video_id: &str, err: FetchError) -> ErrorResponse {
    let (status, message) = match err {
        FetchError::TranscriptsDisabled => (
            ResponseStatus::TranscriptsDisabled,
            "Transcripts are disabled for this video".to_string(),
        ),
        FetchError::NoTranscriptFound => (
            ResponseStatus::NoTranscript,
            "No transcript found for this video".to_string(),
        ),
        FetchError::VideoUnavailable => (
            ResponseStatus::VideoUnavailable,
            "Video is unavailable or private".to_string(),
        ),
        FetchError::Other(msg) if is_rate_limit(&msg) => (
            ResponseStatus::RateLimited,
            "Rate limit exceeded. Please try again later.".to_string(),
        ),
        FetchError::Other(msg) => {
            error!(video_id = %video_id, error = %msg, "Unexpected error fetching transcript");
            (ResponseStatus::Error, format!("Unexpected error: {}", msg))
        }
    };
    ErrorResponse::for_video(status, message, video_id)
}

fn is_rate_limit(message: &str) -> bool {
    let lower = message.to_lowercase();
    lower.contains("too many requests") || lower.contains("rate limit")
}

/// Two decimals, ties to even.
fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Replays scripted results and records every call.
    struct ScriptedFetcher {
        results: Mutex<Vec<Result<Vec<TranscriptSegment>, FetchError>>>,
        calls: Mutex<Vec<Option<Vec<String>>>>,
    }

    impl ScriptedFetcher {
        fn new(results: Vec<Result<Vec<TranscriptSegment>, FetchError>>) -> Self {
            Self {
                results: Mutex::new(results),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<Option<Vec<String>>> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl TranscriptFetcher for ScriptedFetcher {
        async fn fetch(
            &self,
            _video_id: &str,
            languages: Option<&[String]>,
        ) -> Result<Vec<TranscriptSegment>, FetchError> {
            self.calls.lock().unwrap().push(languages.map(|l| l.to_vec()));
            self.results.lock().unwrap().remove(0)
        }
    }

    fn hello_world() -> Vec<TranscriptSegment> {
        vec![
            TranscriptSegment::new("Hello", 0.0, 1.5),
            TranscriptSegment::new("world", 1.5, 2.0),
        ]
    }

    #[test]
    fn derives_plain_text_count_and_duration() {
        let result = TranscriptResult::new("dQw4w9WgXcQ", AUTO_DETECTED, true, hello_world());
        assert_eq!(result.plain_text(), "Hello world");
        assert_eq!(result.total_segments(), 2);
        assert_eq!(result.duration_seconds(), 3.5);
    }

    #[test]
    fn empty_transcript_has_zero_duration() {
        let result = TranscriptResult::new("dQw4w9WgXcQ", AUTO_DETECTED, true, Vec::new());
        assert_eq!(result.plain_text(), "");
        assert_eq!(result.total_segments(), 0);
        assert_eq!(result.duration_seconds(), 0.0);
    }

    #[test]
    fn trims_text_and_rounds_timings() {
        let result = TranscriptResult::new(
            "dQw4w9WgXcQ",
            "en",
            false,
            vec![TranscriptSegment::new("  spaced out \n", 1.23456, 0.9999)],
        );
        assert_eq!(result.segments()[0].text, "spaced out");
        assert_eq!(result.segments()[0].start, 1.23);
        assert_eq!(result.segments()[0].duration, 1.0);
        assert_eq!(result.duration_seconds(), 2.23);
    }

    #[test]
    fn halves_round_to_even() {
        let result = TranscriptResult::new(
            "dQw4w9WgXcQ",
            "en",
            false,
            vec![
                TranscriptSegment::new("a", 0.125, 0.375),
                TranscriptSegment::new("b", 0.625, 0.125),
            ],
        );
        assert_eq!(result.segments()[0].start, 0.12);
        assert_eq!(result.segments()[0].duration, 0.38);
        assert_eq!(result.segments()[1].start, 0.62);
        assert_eq!(result.segments()[1].duration, 0.12);
        assert_eq!(result.duration_seconds(), 0.74);
    }

    #[tokio::test]
    async fn requested_language_is_reported_on_success() {
        let fetcher = ScriptedFetcher::new(vec![Ok(hello_world())]);
        let response = get_transcript(&fetcher, "dQw4w9WgXcQ", Some("es")).await;

        let TranscriptResponse::Structured(result) = response else {
            panic!("expected structured response");
        };
        assert_eq!(result.video_id(), "dQw4w9WgXcQ");
        assert_eq!(result.language(), "es");
        assert!(!result.is_generated());
        assert_eq!(fetcher.calls(), vec![Some(vec!["es".to_string()])]);
    }

    #[tokio::test]
    async fn any_language_failure_falls_back_to_auto_detect() {
        let fetcher = ScriptedFetcher::new(vec![
            Err(FetchError::Other("connection reset".into())),
            Ok(hello_world()),
        ]);
        let response = get_transcript(&fetcher, "dQw4w9WgXcQ", Some("fr")).await;

        let TranscriptResponse::Structured(result) = response else {
            panic!("expected structured response");
        };
        assert_eq!(result.language(), AUTO_DETECTED);
        assert!(result.is_generated());
        assert_eq!(fetcher.calls(), vec![Some(vec!["fr".to_string()]), None]);
    }

    #[tokio::test]
    async fn only_the_fallback_failure_is_reported() {
        let fetcher = ScriptedFetcher::new(vec![
            Err(FetchError::NoTranscriptFound),
            Err(FetchError::TranscriptsDisabled),
        ]);
        let response = get_transcript(&fetcher, "dQw4w9WgXcQ", Some("de")).await;
        assert_eq!(response.status(), ResponseStatus::TranscriptsDisabled);
    }

    #[tokio::test]
    async fn no_language_makes_a_single_attempt() {
        let fetcher = ScriptedFetcher::new(vec![Err(FetchError::VideoUnavailable)]);
        let response = get_transcript(&fetcher, "dQw4w9WgXcQ", None).await;

        assert_eq!(
            response,
            TranscriptResponse::Error(ErrorResponse::for_video(
                ResponseStatus::VideoUnavailable,
                "Video is unavailable or private",
                "dQw4w9WgXcQ",
            ))
        );
        assert_eq!(fetcher.calls(), vec![None]);
    }

    #[tokio::test]
    async fn empty_language_counts_as_none() {
        let fetcher = ScriptedFetcher::new(vec![Ok(hello_world())]);
        get_transcript(&fetcher, "dQw4w9WgXcQ", Some("")).await;
        assert_eq!(fetcher.calls(), vec![None]);
    }

    #[tokio::test]
    async fn failure_mapping() {
        let cases = [
            (FetchError::TranscriptsDisabled, ResponseStatus::TranscriptsDisabled),
            (FetchError::NoTranscriptFound, ResponseStatus::NoTranscript),
            (FetchError::VideoUnavailable, ResponseStatus::VideoUnavailable),
            (
                FetchError::Other("HTTP 429: Too Many Requests".into()),
                ResponseStatus::RateLimited,
            ),
            (
                FetchError::Other("RATE LIMIT reached".into()),
                ResponseStatus::RateLimited,
            ),
            (FetchError::Other("boom".into()), ResponseStatus::Error),
        ];

        for (err, status) in cases {
            let fetcher = ScriptedFetcher::new(vec![Err(err)]);
            let response = get_transcript(&fetcher, "dQw4w9WgXcQ", None).await;
            assert_eq!(response.status(), status);
            assert!(!response.is_success());
        }
    }

    #[tokio::test]
    async fn unexpected_errors_keep_their_message() {
        let fetcher = ScriptedFetcher::new(vec![Err(FetchError::Other("boom".into()))]);
        let TranscriptResponse::Error(err) = get_transcript(&fetcher, "abc", None).await else {
            panic!("expected error response");
        };
        assert_eq!(err.error, "Unexpected error: boom");
        assert_eq!(err.video_id.as_deref(), Some("abc"));
        assert_eq!(
            serde_json::to_value(&err).unwrap(),
            serde_json::json!({
                "error": "Unexpected error: boom",
                "video_id": "abc",
                "status": "error"
            })
        );
    }

    #[tokio::test]
    async fn invalid_reference_skips_the_fetch() {
        let fetcher = ScriptedFetcher::new(Vec::new());
        let response =
            get_youtube_transcript(&fetcher, "not a url", None, OutputFormat::Structured).await;

        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            serde_json::json!({
                "error": "Invalid YouTube URL or video ID",
                "input": "not a url",
                "status": "invalid_input"
            })
        );
        assert!(fetcher.calls().is_empty());
    }

    #[tokio::test]
    async fn text_format_drops_the_segments() {
        let fetcher = ScriptedFetcher::new(vec![Ok(hello_world())]);
        let response = get_youtube_transcript(
            &fetcher,
            "https://youtu.be/dQw4w9WgXcQ",
            None,
            OutputFormat::Text,
        )
        .await;
        assert!(response.is_success());

        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            serde_json::json!({
                "video_id": "dQw4w9WgXcQ",
                "language": "auto-detected",
                "is_generated": true,
                "text": "Hello world",
                "status": "success"
            })
        );
    }

    #[tokio::test]
    async fn structured_format_keeps_every_field() {
        let fetcher = ScriptedFetcher::new(vec![Ok(hello_world())]);
        let response = get_youtube_transcript(
            &fetcher,
            "dQw4w9WgXcQ",
            Some("en"),
            OutputFormat::Structured,
        )
        .await;

        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            serde_json::json!({
                "video_id": "dQw4w9WgXcQ",
                "language": "en",
                "is_generated": false,
                "transcript": [
                    {"text": "Hello", "start": 0.0, "duration": 1.5},
                    {"text": "world", "start": 1.5, "duration": 2.0}
                ],
                "plain_text": "Hello world",
                "status": "success",
                "total_segments": 2,
                "duration_seconds": 3.5
            })
        );
    }

    #[test]
    fn responses_survive_a_json_round_trip() {
        let responses = vec![
            TranscriptResponse::Structured(TranscriptResult::new(
                "dQw4w9WgXcQ",
                "en",
                false,
                hello_world(),
            )),
            TranscriptResponse::Text(
                TranscriptResult::new("dQw4w9WgXcQ", AUTO_DETECTED, true, hello_world())
                    .into_plain_text(),
            ),
            ErrorResponse::for_input(ResponseStatus::InvalidInput, "bad", "x").into(),
            ErrorResponse::unknown_tool("nope").into(),
        ];

        for response in responses {
            let json = serde_json::to_string(&response).unwrap();
            let back: TranscriptResponse = serde_json::from_str(&json).unwrap();
            assert_eq!(back, response);
        }
    }

    #[test]
    fn format_argument_defaults_to_structured() {
        assert_eq!(OutputFormat::from_arg(Some("text")), OutputFormat::Text);
        assert_eq!(OutputFormat::from_arg(Some("structured")), OutputFormat::Structured);
        assert_eq!(OutputFormat::from_arg(Some("xml")), OutputFormat::Structured);
        assert_eq!(OutputFormat::from_arg(None), OutputFormat::Structured);
    }
}
