// src/connectors/youtube/mod.rs

pub mod fetcher;
pub mod transcript;
pub mod video_id;

use crate::auth::AuthDetails;
use crate::error::ConnectorError;
use crate::utils::json_text_result;
use crate::Connector;
use async_trait::async_trait;
use rmcp::model::*;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::borrow::Cow;
use std::sync::Arc;
use tracing::{debug, error};

pub use fetcher::{TranscriptFetcher, TranscriptSegment};
#[cfg(feature = "youtube")]
pub use fetcher::YtTranscriptFetcher;
pub use transcript::{
    get_transcript, get_youtube_transcript, ErrorResponse, OutputFormat, PlainTextTranscript,
    ResponseStatus, TranscriptResponse, TranscriptResult,
};
pub use video_id::resolve_video_id;

pub const TRANSCRIPT_TOOL: &str = "get_youtube_transcript";

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct GetTranscriptInput {
    /// YouTube video URL or video ID (e.g., 'https://youtube.com/watch?v=VIDEO_ID' or 'VIDEO_ID')
    pub video_url: String,
    /// Preferred transcript language code (e.g., 'en', 'es', 'fr'). If not specified, auto-detects best available language.
    #[serde(default)]
    pub language: Option<String>,
    /// Output format: 'structured' includes timestamps and metadata, 'text' returns plain text only
    #[serde(default)]
    #[schemars(with = "Option<OutputFormat>")]
    pub format: Option<String>,
}

pub struct YouTubeConnector {
    fetcher: Arc<dyn TranscriptFetcher>,
    auth: AuthDetails,
}

impl YouTubeConnector {
    /// Connector backed by the live YouTube transcript fetcher.
    #[cfg(feature = "youtube")]
    pub async fn new(auth: Option<AuthDetails>) -> Result<Self, ConnectorError> {
        let fetcher =
            YtTranscriptFetcher::new().map_err(|e| ConnectorError::Other(e.to_string()))?;
        let mut connector = Self::with_fetcher(Arc::new(fetcher));

        if let Some(auth) = auth {
            connector.set_auth_details(auth).await?;
        }

        Ok(connector)
    }

    pub fn with_fetcher(fetcher: Arc<dyn TranscriptFetcher>) -> Self {
        Self {
            fetcher,
            auth: AuthDetails::new(),
        }
    }

    async fn transcript_tool(&self, args: serde_json::Map<String, Value>) -> TranscriptResponse {
        if args.get("video_url").map_or(true, is_blank) {
            return ErrorResponse::invalid_request("video_url parameter is required").into();
        }

        let input: GetTranscriptInput = match serde_json::from_value(Value::Object(args)) {
            Ok(input) => input,
            Err(e) => {
                error!(error = %e, "Error in {}", TRANSCRIPT_TOOL);
                return ErrorResponse::server_error(e).into();
            }
        };

        debug!(
            video_url = %input.video_url,
            language = ?input.language,
            format = ?input.format,
            "Handling transcript request"
        );

        get_youtube_transcript(
            self.fetcher.as_ref(),
            &input.video_url,
            input.language.as_deref(),
            OutputFormat::from_arg(input.format.as_deref()),
        )
        .await
    }
}

/// Values a caller could plausibly mean as "not given".
fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(fields) => fields.is_empty(),
    }
}

#[async_trait]
impl Connector for YouTubeConnector {
    fn name(&self) -> &'static str {
        "youtube"
    }

    fn description(&self) -> &'static str {
        "Extracts transcripts and captions from YouTube videos."
    }

    async fn capabilities(&self) -> ServerCapabilities {
        ServerCapabilities::builder().enable_tools().build()
    }

    async fn get_auth_details(&self) -> Result<AuthDetails, ConnectorError> {
        Ok(self.auth.clone())
    }

    async fn set_auth_details(&mut self, details: AuthDetails) -> Result<(), ConnectorError> {
        if details.contains_key("api_key") {
            debug!("YouTube API key configured");
        }
        self.auth = details;
        Ok(())
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
    ) -> Result<ListToolsResult, ConnectorError> {
        let schema = serde_json::to_value(schemars::schema_for!(GetTranscriptInput))?;
        let input_schema = schema
            .as_object()
            .cloned()
            .ok_or_else(|| ConnectorError::InternalError("Schema must be an object".into()))?;

        let tools = vec![Tool {
            name: Cow::Borrowed(TRANSCRIPT_TOOL),
            title: None,
            description: Some(Cow::Borrowed(
                "Extract transcript/captions from YouTube videos. Supports various URL formats and provides both timestamped and plain text output.",
            )),
            input_schema: Arc::new(input_schema),
            output_schema: None,
            annotations: None,
            icons: None,
        }];

        Ok(ListToolsResult {
            tools,
            next_cursor: None,
        })
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
    ) -> Result<CallToolResult, ConnectorError> {
        let name = request.name.as_ref();
        let args = request.arguments.unwrap_or_default();

        let response = match name {
            TRANSCRIPT_TOOL => self.transcript_tool(args).await,
            _ => ErrorResponse::unknown_tool(name).into(),
        };

        json_text_result(&response)
    }
}
