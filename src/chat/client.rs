//! HTTP client for the conversational service.

use crate::auth::Credentials;
use crate::chat::protocol::{chat_sync_url, ChatSyncRequest, ChatSyncResponse};
use crate::chat::ChatService;
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;

/// Talks to one application on one service endpoint.
pub struct HttpChatService {
    endpoint: String,
    application_id: String,
    http: Client,
}

impl HttpChatService {
    pub fn new(endpoint: impl Into<String>, application_id: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            application_id: application_id.into(),
            http: Client::new(),
        }
    }

    pub fn application_id(&self) -> &str {
        &self.application_id
    }
}

#[async_trait]
impl ChatService for HttpChatService {
    async fn chat_sync(&self, credentials: &Credentials, message: &str) -> Result<String> {
        let url = chat_sync_url(&self.endpoint, &self.application_id);
        let request = ChatSyncRequest {
            user_message: message.to_string(),
        };

        let resp = self
            .http
            .post(&url)
            .bearer_auth(&credentials.session_token)
            .header("X-Amz-Security-Token", &credentials.session_token)
            .json(&request)
            .send()
            .await
            .with_context(|| format!("request to {} failed", url))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            let detail: String = body.chars().take(800).collect();
            if detail.trim().is_empty() {
                return Err(anyhow!("service error: {}", status));
            }
            return Err(anyhow!("service error: {}\n{}", status, detail));
        }

        let body: ChatSyncResponse = resp
            .json()
            .await
            .context("service returned an unreadable response")?;
        body.system_message
            .ok_or_else(|| anyhow!("service response has no systemMessage"))
    }
}
