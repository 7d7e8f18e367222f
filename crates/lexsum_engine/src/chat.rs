use std::sync::Arc;

use lexsum_logging::lexsum_warn;
use serde_json::Value;

use crate::recent::Clock;
use crate::{ApiError, BackendApi};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
    pub timestamp: String,
}

/// Conversation about one analysed document.
pub struct ChatSession {
    request_id: String,
    messages: Vec<ChatMessage>,
    clock: Clock,
}

impl ChatSession {
    pub fn new(request_id: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
            messages: Vec::new(),
            clock: Arc::new(String::new),
        }
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Sends `message` with the analysis `context` and records both sides.
    ///
    /// Blank input is ignored and returns `Ok(None)`. On failure the user's
    /// message stays in the transcript without a reply.
    pub async fn send(
        &mut self,
        api: &dyn BackendApi,
        message: &str,
        context: &Value,
    ) -> Result<Option<&ChatMessage>, ApiError> {
        let message = message.trim();
        if message.is_empty() {
            return Ok(None);
        }
        self.push(ChatRole::User, message.to_string());
        let reply = match api.chat(&self.request_id, message, context).await {
            Ok(reply) => reply,
            Err(err) => {
                lexsum_warn!("chat for {} failed: {}", self.request_id, err);
                return Err(err);
            }
        };
        self.push(ChatRole::Assistant, reply);
        Ok(self.messages.last())
    }

    fn push(&mut self, role: ChatRole, content: String) {
        self.messages.push(ChatMessage {
            role,
            content,
            timestamp: (self.clock)(),
        });
    }
}
