//! Wire types for the synchronous chat endpoint.
//!
//! `POST {endpoint}/applications/{application_id}/conversations?sync`

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatSyncRequest {
    pub user_message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatSyncResponse {
    /// Missing when the service answered without text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_message: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
}

/// Build the chat URL for an application.
pub fn chat_sync_url(endpoint: &str, application_id: &str) -> String {
    format!(
        "{}/applications/{}/conversations?sync",
        endpoint.trim_end_matches('/'),
        application_id
    )
}
