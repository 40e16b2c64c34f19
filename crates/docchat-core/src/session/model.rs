//! Core session domain model.

use super::message::Message;
use serde::{Deserialize, Serialize};

/// A server-assigned conversation identity plus its client-held transcript.
///
/// This is also the sole persisted shape: `{session_id, messages}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatSession {
    /// Opaque identifier assigned by the backend on the first exchange.
    pub session_id: String,
    /// Transcript in conversation order.
    #[serde(default)]
    pub messages: Vec<Message>,
}

impl ChatSession {
    pub fn new(session_id: impl Into<String>, messages: Vec<Message>) -> Self {
        Self {
            session_id: session_id.into(),
            messages,
        }
    }

    /// Whether the session holds anything worth persisting.
    pub fn is_vacuous(&self) -> bool {
        self.session_id.is_empty() || self.messages.is_empty()
    }
}
