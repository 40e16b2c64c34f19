//! Tab-scoped session storage.
//!
//! A browsing context gets one [`TabStorage`]: a string key/value area that
//! lives as long as the tab and is shared by every handle cloned from it.
//! [`TabSessionStore`] keeps the active session in that area as JSON text,
//! exactly as it would sit in the browser's session storage.

use docchat_core::error::{ChatError, Result};
use docchat_core::session::{ChatSession, SessionStore};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Shared string key/value area of one browsing context.
#[derive(Clone, Default)]
pub struct TabStorage {
    entries: Arc<RwLock<HashMap<String, String>>>,
    /// Maximum total bytes of keys plus values, `None` for unbounded.
    quota_bytes: Option<usize>,
}

impl TabStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a storage area that rejects writes beyond `quota_bytes`.
    pub fn with_quota(quota_bytes: usize) -> Self {
        Self {
            entries: Arc::default(),
            quota_bytes: Some(quota_bytes),
        }
    }

    pub fn get_item(&self, key: &str) -> Result<Option<String>> {
        let entries = self
            .entries
            .read()
            .map_err(|_| ChatError::storage("tab storage lock poisoned"))?;
        Ok(entries.get(key).cloned())
    }

    pub fn set_item(&self, key: &str, value: String) -> Result<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| ChatError::storage("tab storage lock poisoned"))?;

        if let Some(quota) = self.quota_bytes {
            let others: usize = entries
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(k, v)| k.len() + v.len())
                .sum();
            let needed = others + key.len() + value.len();
            if needed > quota {
                return Err(ChatError::storage(format!(
                    "quota exceeded: {} of {} bytes",
                    needed, quota
                )));
            }
        }

        entries.insert(key.to_string(), value);
        Ok(())
    }

    pub fn remove_item(&self, key: &str) -> Result<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| ChatError::storage("tab storage lock poisoned"))?;
        entries.remove(key);
        Ok(())
    }
}

/// [`SessionStore`] over one [`TabStorage`] entry.
#[derive(Clone)]
pub struct TabSessionStore {
    storage: TabStorage,
    key: String,
}

impl TabSessionStore {
    pub fn new(storage: TabStorage, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

impl SessionStore for TabSessionStore {
    fn load(&self) -> Result<Option<ChatSession>> {
        let Some(raw) = self.storage.get_item(&self.key)? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(session) => Ok(Some(session)),
            Err(e) => {
                tracing::warn!(
                    "[TabSessionStore] Ignoring undecodable entry '{}': {}",
                    self.key,
                    e
                );
                Ok(None)
            }
        }
    }

    fn save(&self, session: &ChatSession) -> Result<()> {
        let raw = serde_json::to_string(session)?;
        self.storage.set_item(&self.key, raw)
    }

    fn clear(&self) -> Result<()> {
        self.storage.remove_item(&self.key)
    }
}
