//! HttpChatTransport - reqwest implementation of the backend exchange.
//!
//! Issues `POST {api_base}/chat` with a JSON body, attaches the bearer token
//! when one is available and maps every failure to a [`ChatError`] whose
//! display text is what the error banner shows.

use crate::auth::SessionExpiryHandler;
use async_trait::async_trait;
use docchat_core::auth::{Anonymous, CredentialProvider};
use docchat_core::config::ChatConfig;
use docchat_core::error::{ChatError, Result};
use docchat_core::transport::{ChatRequest, ChatResponse, ChatTransport, ErrorDetail};
use reqwest::{Client, StatusCode};
use std::sync::Arc;
use std::time::Duration;

const SESSION_EXPIRED_MESSAGE: &str = "Your session has expired. Please log in again.";

/// Chat transport that talks to the backend over HTTP.
#[derive(Clone)]
pub struct HttpChatTransport {
    client: Client,
    endpoint: String,
    credentials: Arc<dyn CredentialProvider>,
    expiry: Option<SessionExpiryHandler>,
}

impl HttpChatTransport {
    /// Creates an anonymous transport for `config.chat_endpoint()`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the HTTP client cannot be built.
    pub fn new(config: &ChatConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|err| ChatError::config(format!("Failed to build HTTP client: {err}")))?;

        Ok(Self {
            client,
            endpoint: config.chat_endpoint(),
            credentials: Arc::new(Anonymous),
            expiry: None,
        })
    }

    /// Uses `credentials` for the `Authorization` header.
    pub fn with_credentials(mut self, credentials: Arc<dyn CredentialProvider>) -> Self {
        self.credentials = credentials;
        self
    }

    /// Invokes `handler` whenever the backend answers 401.
    pub fn with_expiry_handler(mut self, handler: SessionExpiryHandler) -> Self {
        self.expiry = Some(handler);
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ChatTransport for HttpChatTransport {
    async fn send(&self, request: ChatRequest) -> Result<ChatResponse> {
        let mut builder = self.client.post(&self.endpoint).json(&request);
        if let Some(token) = self.credentials.access_token() {
            builder = builder.bearer_auth(token);
        }

        tracing::debug!(
            session_id = request.session_id.as_deref().unwrap_or("-"),
            "[HttpChatTransport] POST {}",
            self.endpoint
        );

        let response = builder
            .send()
            .await
            .map_err(|err| ChatError::transport(None, format!("Network error: {err}")))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            if let Some(handler) = &self.expiry {
                handler.handle();
            }
            let body = response.text().await.unwrap_or_default();
            let message = parse_detail(&body).unwrap_or_else(|| SESSION_EXPIRED_MESSAGE.to_string());
            return Err(ChatError::session_expired(message));
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(map_http_error(status, &body));
        }

        let body = response
            .bytes()
            .await
            .map_err(|err| ChatError::transport(None, format!("Network error: {err}")))?;

        serde_json::from_slice::<ChatResponse>(&body).map_err(|err| {
            ChatError::transport(
                Some(status.as_u16()),
                format!("Invalid response from server: {err}"),
            )
        })
    }
}

fn parse_detail(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorDetail>(body)
        .ok()
        .and_then(|detail| detail.message())
}

fn map_http_error(status: StatusCode, body: &str) -> ChatError {
    let message = parse_detail(body).unwrap_or_else(|| {
        format!(
            "HTTP {}: {}",
            status.as_u16(),
            status.canonical_reason().unwrap_or("Unknown Status")
        )
    });
    ChatError::transport(Some(status.as_u16()), message)
}
