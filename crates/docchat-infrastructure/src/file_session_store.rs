//! File-backed session store for hosts without a tab storage area
//! (embedded webviews, desktop shells).

use crate::paths::DocChatPaths;
use crate::storage::AtomicJsonFile;
use docchat_core::error::Result;
use docchat_core::session::{ChatSession, SessionStore};
use std::path::{Path, PathBuf};

/// Persists the active session as a single JSON document.
pub struct JsonFileSessionStore {
    file: AtomicJsonFile<ChatSession>,
}

impl JsonFileSessionStore {
    /// Creates a store at the default location (`~/.config/docchat/session.json`).
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration directory cannot be determined.
    pub fn default_location() -> Result<Self> {
        Ok(Self::new(DocChatPaths::session_file()?))
    }

    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            file: AtomicJsonFile::new(path.into()),
        }
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }
}

impl SessionStore for JsonFileSessionStore {
    fn load(&self) -> Result<Option<ChatSession>> {
        Ok(self.file.load()?)
    }

    fn save(&self, session: &ChatSession) -> Result<()> {
        self.file.save(session)?;
        tracing::debug!(
            session_id = %session.session_id,
            messages = session.messages.len(),
            "[JsonFileSessionStore] Saved session to {:?}",
            self.file.path()
        );
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        Ok(self.file.remove()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docchat_core::session::Message;
    use tempfile::TempDir;

    #[test]
    fn test_save_and_reload_across_instances() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("session.json");
        let session = ChatSession::new(
            "abc",
            vec![Message::user("What is ZMP?"), Message::answer("...", Vec::new(), 0.8)],
        );

        JsonFileSessionStore::new(&path).save(&session).unwrap();
        let restored = JsonFileSessionStore::new(&path).load().unwrap();

        assert_eq!(restored, Some(session));
    }

    #[test]
    fn test_missing_file_loads_none() {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonFileSessionStore::new(temp_dir.path().join("session.json"));
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn test_clear_removes_file() {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonFileSessionStore::new(temp_dir.path().join("session.json"));
        store
            .save(&ChatSession::new("abc", vec![Message::user("hi")]))
            .unwrap();

        store.clear().unwrap();

        assert!(!store.path().exists());
        assert_eq!(store.load().unwrap(), None);
    }
}
