//! Chat widget
//!
//! Messages go out through a `ChatBroadcaster`. The in-process `ChatHub` is a
//! tokio broadcast channel; subscribers never see their own messages.

use super::sanitize::strip_tags;
use crate::domain::{ChatMessage, User};
use crate::error::ServiceResult;
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, warn};
use uuid::Uuid;
use validator::Validate;

#[async_trait::async_trait]
pub trait ChatBroadcaster: Send + Sync {
    /// Deliver `message` to everyone except its sender
    async fn broadcast(&self, message: ChatMessage) -> ServiceResult<()>;
}

pub struct ChatHub {
    sender: broadcast::Sender<ChatMessage>,
}

impl ChatHub {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Listen as `user_id`
    pub fn subscribe(&self, user_id: Uuid) -> ChatSubscription {
        ChatSubscription {
            user_id,
            receiver: self.sender.subscribe(),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

#[async_trait::async_trait]
impl ChatBroadcaster for ChatHub {
    async fn broadcast(&self, message: ChatMessage) -> ServiceResult<()> {
        match self.sender.send(message) {
            Ok(receivers) => debug!(receivers, "Chat message broadcast"),
            // Nobody listening is not a failure
            Err(_) => debug!("Chat message dropped, no subscribers"),
        }
        Ok(())
    }
}

pub struct ChatSubscription {
    user_id: Uuid,
    receiver: broadcast::Receiver<ChatMessage>,
}

impl ChatSubscription {
    /// Next message from another user; `None` once the hub is gone
    pub async fn recv(&mut self) -> Option<ChatMessage> {
        loop {
            match self.receiver.recv().await {
                Ok(message) if message.sender_id == self.user_id => continue,
                Ok(message) => return Some(message),
                Err(RecvError::Lagged(skipped)) => {
                    warn!(user = %self.user_id, skipped, "Chat subscriber lagged");
                    continue;
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct ChatInput {
    #[validate(length(min = 1, max = 1000, message = "is required and at most 1000 characters"))]
    pub message: String,
}

#[derive(Clone)]
pub struct ChatService {
    broadcaster: Arc<dyn ChatBroadcaster>,
}

impl ChatService {
    pub fn new(broadcaster: Arc<dyn ChatBroadcaster>) -> Self {
        Self { broadcaster }
    }

    /// Broadcast `text` from `sender`. Returns `None` when nothing is left to
    /// send after stripping markup and whitespace.
    pub async fn send(&self, sender: &User, text: &str) -> ServiceResult<Option<ChatMessage>> {
        ChatInput {
            message: text.to_string(),
        }
        .validate()?;

        let cleaned = strip_tags(text);
        let cleaned = cleaned.trim();
        if cleaned.is_empty() {
            return Ok(None);
        }

        let message = ChatMessage {
            sender_id: sender.id,
            username: sender.username.clone(),
            text: cleaned.to_string(),
            avatar: sender.avatar_path(),
        };

        self.broadcaster.broadcast(message.clone()).await?;
        Ok(Some(message))
    }
}
