//! Backend exchange contract.
//!
//! The retrieval/generation backend is consumed only through
//! `POST {api_base}/chat`. These types mirror its JSON bodies; the
//! [`ChatTransport`] trait lets the controller stay ignorant of HTTP.

use crate::error::Result;
use crate::session::Citation;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Request body of `POST /chat`. Absent optionals are omitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub query: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u32>,
}

impl ChatRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            session_id: None,
            selected_text: None,
            top_k: None,
        }
    }

    pub fn with_session_id(mut self, session_id: Option<String>) -> Self {
        self.session_id = session_id;
        self
    }

    pub fn with_selected_text(mut self, selected_text: Option<String>) -> Self {
        self.selected_text = selected_text;
        self
    }

    pub fn with_top_k(mut self, top_k: u32) -> Self {
        self.top_k = Some(top_k);
        self
    }
}

/// Response body of a successful `POST /chat`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub answer: String,
    #[serde(default)]
    pub citations: Vec<Citation>,
    pub confidence: f64,
    pub session_id: String,
}

/// Error body of a non-2xx `POST /chat`.
///
/// `detail` is a string for handled errors and a list of
/// `{loc, msg, type}` objects for request validation failures.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorDetail {
    #[serde(default)]
    pub detail: Option<serde_json::Value>,
}

impl ErrorDetail {
    /// Human-readable message, `None` when the body carries nothing usable.
    pub fn message(&self) -> Option<String> {
        let text = match self.detail.as_ref()? {
            serde_json::Value::String(text) => text.trim().to_string(),
            serde_json::Value::Array(items) => items
                .iter()
                .filter_map(|item| item.get("msg").and_then(|msg| msg.as_str()))
                .collect::<Vec<_>>()
                .join("; "),
            _ => String::new(),
        };
        (!text.is_empty()).then_some(text)
    }
}

/// Issues one chat exchange with the backend.
///
/// Implementations own credentials, timeouts and session-expiry side
/// effects; every failure is reported as a [`crate::ChatError`].
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn send(&self, request: ChatRequest) -> Result<ChatResponse>;
}
