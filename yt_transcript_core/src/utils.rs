use crate::error::ConnectorError;
use rmcp::model::{CallToolResult, Content};
use serde::Serialize;

/// Wrap `data` as a tool result holding a single text item with its
/// pretty-printed JSON.
pub fn json_text_result<T: Serialize>(data: &T) -> Result<CallToolResult, ConnectorError> {
    let text = serde_json::to_string_pretty(data)?;

    Ok(CallToolResult {
        content: vec![Content::text(text)],
        structured_content: None,
        is_error: Some(false),
        meta: None,
    })
}
