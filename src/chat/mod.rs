pub mod client;
pub mod protocol;

use crate::auth::Credentials;
use anyhow::Result;
use async_trait::async_trait;

pub use client::HttpChatService;

/// A conversational service that answers one message with one message.
#[async_trait]
pub trait ChatService {
    async fn chat_sync(&self, credentials: &Credentials, message: &str) -> Result<String>;
}
