//! Conversation message types.
//!
//! This module contains types for representing messages in a conversation,
//! including roles, citations and message content.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Represents the role of a message in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// Message from the reader.
    User,
    /// Message from the assistant (answers, greetings, failure notices).
    Assistant,
}

/// A structured pointer from an answer back to a source passage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Citation {
    pub chapter: String,
    pub section: String,
    pub url: String,
    /// Relevance in `[0, 1]` as reported by the backend.
    pub relevance_score: f64,
}

/// A single message in a transcript.
///
/// Messages are immutable once appended; the transcript only ever grows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub role: MessageRole,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub citations: Option<Vec<Citation>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    /// Creation instant, serialized as an ISO-8601 string.
    pub timestamp: DateTime<Utc>,
}

impl Message {
    fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role,
            content: content.into(),
            citations: None,
            confidence: None,
            timestamp: Utc::now(),
        }
    }

    /// Creates a user message stamped with the current time.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content)
    }

    /// Creates a plain assistant message (greeting, failure notice).
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, content)
    }

    /// Creates an assistant message carrying a backend answer.
    pub fn answer(content: impl Into<String>, citations: Vec<Citation>, confidence: f64) -> Self {
        let mut message = Self::new(MessageRole::Assistant, content);
        message.citations = Some(citations);
        message.confidence = Some(confidence);
        message
    }

    pub fn is_user(&self) -> bool {
        self.role == MessageRole::User
    }

    /// Citations of this message, empty when none were attached.
    pub fn citations(&self) -> &[Citation] {
        self.citations.as_deref().unwrap_or(&[])
    }
}
