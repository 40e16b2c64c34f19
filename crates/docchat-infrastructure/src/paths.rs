//! Path management for DocChat configuration and session files.
//!
//! ```text
//! ~/.config/docchat/           # Config directory
//! ├── config.toml              # ChatConfig overrides
//! └── session.json             # Persisted active session (file-backed store)
//! ```

use std::path::PathBuf;

const APP_DIR: &str = "docchat";

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Platform config directory could not be determined.
    ConfigDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::ConfigDirNotFound => write!(f, "Cannot find config directory"),
        }
    }
}

impl std::error::Error for PathError {}

impl From<PathError> for docchat_core::ChatError {
    fn from(e: PathError) -> Self {
        docchat_core::ChatError::config(e.to_string())
    }
}

/// Unified path resolution for DocChat.
pub struct DocChatPaths;

impl DocChatPaths {
    /// Returns the DocChat configuration directory (e.g. `~/.config/docchat/`).
    pub fn config_dir() -> Result<PathBuf, PathError> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or(PathError::ConfigDirNotFound)
    }

    /// Returns the path to `config.toml`.
    pub fn config_file() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Returns the path of the file-backed session store.
    pub fn session_file() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join("session.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_files_live_in_app_dir() {
        // Headless CI images may lack a config dir; only check when present.
        if let Ok(dir) = DocChatPaths::config_dir() {
            assert!(dir.ends_with(APP_DIR));
            assert_eq!(DocChatPaths::config_file().unwrap(), dir.join("config.toml"));
            assert_eq!(DocChatPaths::session_file().unwrap(), dir.join("session.json"));
        }
    }
}
