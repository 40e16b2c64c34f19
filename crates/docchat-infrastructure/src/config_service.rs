//! Configuration service implementation.
//!
//! Loads [`ChatConfig`] from `~/.config/docchat/config.toml` (or an explicit
//! path), layers `DOCCHAT_*` environment overrides on top and validates the
//! result.

use crate::paths::DocChatPaths;
use docchat_core::config::ChatConfig;
use docchat_core::error::{ChatError, Result};
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, PoisonError, RwLock};

pub const ENV_API_BASE: &str = "DOCCHAT_API_BASE";
pub const ENV_TOP_K: &str = "DOCCHAT_TOP_K";
pub const ENV_TIMEOUT_SECS: &str = "DOCCHAT_TIMEOUT_SECS";

type EnvLookup = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Configuration service that loads and caches the chat configuration.
#[derive(Clone)]
pub struct ConfigService {
    /// Explicit file location; `None` resolves through [`DocChatPaths`].
    path: Option<PathBuf>,
    env: EnvLookup,
    config: Arc<RwLock<Option<ChatConfig>>>,
}

impl ConfigService {
    /// Creates a service reading the default config file and the process environment.
    pub fn new() -> Self {
        Self {
            path: None,
            env: Arc::new(|key| std::env::var(key).ok()),
            config: Arc::new(RwLock::new(None)),
        }
    }

    /// Reads from `path` instead of the default location.
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Replaces the environment lookup (tests inject a map here).
    pub fn with_env<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        self.env = Arc::new(lookup);
        self
    }

    /// Loads, overrides and validates the configuration without touching the cache.
    ///
    /// A missing or blank file yields the defaults; a malformed one is an error.
    pub fn load(&self) -> Result<ChatConfig> {
        let path = match &self.path {
            Some(path) => path.clone(),
            None => DocChatPaths::config_file()?,
        };

        let mut config = if path.exists() {
            let content = fs::read_to_string(&path)?;
            if content.trim().is_empty() {
                ChatConfig::default()
            } else {
                toml::from_str(&content)?
            }
        } else {
            tracing::debug!("[ConfigService] No config at {:?}, using defaults", path);
            ChatConfig::default()
        };

        apply_env_overrides(&mut config, self.env.as_ref())?;
        config.validate()?;
        Ok(config)
    }

    /// Gets the configuration, loading it on first access.
    ///
    /// Load failures are logged and fall back to the defaults.
    pub fn get_config(&self) -> ChatConfig {
        {
            let cached = self.config.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(config) = cached.as_ref() {
                return config.clone();
            }
        }

        let loaded = self.load().unwrap_or_else(|e| {
            tracing::warn!("[ConfigService] Failed to load config, using defaults: {}", e);
            ChatConfig::default()
        });

        *self.config.write().unwrap_or_else(PoisonError::into_inner) = Some(loaded.clone());
        loaded
    }

    /// Invalidates the cache, forcing a reload on next access.
    pub fn invalidate_cache(&self) {
        *self.config.write().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

impl Default for ConfigService {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies `DOCCHAT_API_BASE`, `DOCCHAT_TOP_K` and `DOCCHAT_TIMEOUT_SECS`.
///
/// Blank values are ignored; unparsable numbers are a configuration error.
pub fn apply_env_overrides(
    config: &mut ChatConfig,
    lookup: &(dyn Fn(&str) -> Option<String> + Send + Sync),
) -> Result<()> {
    let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

    if let Some(api_base) = get(ENV_API_BASE) {
        config.api_base = api_base;
    }
    if let Some(top_k) = get(ENV_TOP_K) {
        config.top_k = top_k
            .parse()
            .map_err(|_| ChatError::config(format!("{ENV_TOP_K} is not a number: {top_k}")))?;
    }
    if let Some(timeout) = get(ENV_TIMEOUT_SECS) {
        config.request_timeout_secs = timeout.parse().map_err(|_| {
            ChatError::config(format!("{ENV_TIMEOUT_SECS} is not a number: {timeout}"))
        })?;
    }
    Ok(())
}
