use crate::auth::AuthDetails;
use crate::logging::LogLevel;
use serde::{Deserialize, Serialize};

/// Transports the server can listen on.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    #[default]
    Stdio,
}

/// Process configuration, built once at startup and handed to the components
/// that need it.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct ServerConfig {
    #[serde(default)]
    pub transport: Transport,
    #[serde(default)]
    pub log_level: LogLevel,
    /// YouTube Data API key. Stored on the connector; transcript fetching
    /// does not use it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

impl ServerConfig {
    /// Credentials to hand to the YouTube connector.
    pub fn youtube_auth(&self) -> AuthDetails {
        let mut details = AuthDetails::new();
        if let Some(key) = self.api_key.as_deref().filter(|k| !k.is_empty()) {
            details.insert("api_key".to_string(), key.to_string());
        }
        details
    }
}
