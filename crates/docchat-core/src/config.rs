use crate::error::{ChatError, Result};
use crate::selection::SelectionConfig;
use serde::{Deserialize, Serialize};

pub const DEFAULT_API_BASE: &str = "http://localhost:8000/api/v1";
pub const DEFAULT_TOP_K: u32 = 5;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_LOGIN_ROUTE: &str = "/login";
pub const DEFAULT_STORAGE_KEY: &str = "docchat.session";
pub const DEFAULT_MAX_SELECTED_CHARS: usize = 500;

const DEFAULT_GREETING: &str = "Hi! I'm the documentation assistant. Ask me anything about the book, \
or select text on any page and click \"Ask about this\".";
const DEFAULT_FAILURE_NOTICE: &str =
    "Sorry, I couldn't reach the assistant right now. Please try again in a moment.";

/// Runtime configuration for the chat widget core.
///
/// Every field has a default, so an empty `config.toml` is valid.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ChatConfig {
    /// Prefix for `POST {api_base}/chat`.
    pub api_base: String,
    /// Number of passages the backend should retrieve.
    pub top_k: u32,
    pub request_timeout_secs: u64,
    /// Route the reader is sent to when the backend answers 401.
    pub login_route: String,
    /// Key of the tab-scoped store entry.
    pub storage_key: String,
    /// Synthetic assistant message seeded into an empty transcript.
    pub greeting: String,
    /// Assistant message appended when an exchange fails.
    pub failure_notice: String,
    /// Longer selections are truncated before being staged.
    pub max_selected_chars: usize,
    pub selection: SelectionConfig,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            top_k: DEFAULT_TOP_K,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            login_route: DEFAULT_LOGIN_ROUTE.to_string(),
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            greeting: DEFAULT_GREETING.to_string(),
            failure_notice: DEFAULT_FAILURE_NOTICE.to_string(),
            max_selected_chars: DEFAULT_MAX_SELECTED_CHARS,
            selection: SelectionConfig::default(),
        }
    }
}

impl ChatConfig {
    /// Validate the configuration and return the first problem found.
    pub fn validate(&self) -> Result<()> {
        if self.api_base.trim().is_empty() {
            return Err(ChatError::config("api_base must not be empty"));
        }
        if self.top_k == 0 {
            return Err(ChatError::config("top_k must be at least 1"));
        }
        if self.request_timeout_secs == 0 {
            return Err(ChatError::config("request_timeout_secs must be at least 1"));
        }
        if self.storage_key.trim().is_empty() {
            return Err(ChatError::config("storage_key must not be empty"));
        }
        if self.max_selected_chars == 0 {
            return Err(ChatError::config("max_selected_chars must be at least 1"));
        }
        self.selection.validate()
    }

    /// `POST` target of the chat exchange, without doubled slashes.
    pub fn chat_endpoint(&self) -> String {
        format!("{}/chat", self.api_base.trim_end_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_yields_defaults() {
        let config: ChatConfig = toml::from_str("").unwrap();
        assert_eq!(config, ChatConfig::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_overrides() {
        let config: ChatConfig = toml::from_str(
            r#"
api_base = "https://docs.example.com/api/v1/"
top_k = 3

[selection]
padding = 16.0
"#,
        )
        .unwrap();

        assert_eq!(config.top_k, 3);
        assert_eq!(config.chat_endpoint(), "https://docs.example.com/api/v1/chat");
        assert_eq!(config.selection.padding, 16.0);
        assert_eq!(config.selection.menu_width, SelectionConfig::default().menu_width);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let config = ChatConfig {
            top_k: 0,
            ..Default::default()
        };
        assert!(config.validate().unwrap_err().to_string().contains("top_k"));

        let config = ChatConfig {
            api_base: "  ".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = ChatConfig {
            max_selected_chars: 0,
            ..Default::default()
        };
        assert!(config
            .validate()
            .unwrap_err()
            .to_string()
            .contains("max_selected_chars"));
    }
}
