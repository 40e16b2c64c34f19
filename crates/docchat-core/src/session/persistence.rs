//! Best-effort persistence on top of a [`SessionStore`].

use super::model::ChatSession;
use super::repository::SessionStore;
use std::sync::Arc;

/// Wraps a [`SessionStore`] with the controller's persistence contract.
///
/// Persistence is not a correctness dependency: `load` degrades to `None`
/// and `save` logs failures instead of returning them. `save` also refuses
/// vacuous sessions (no session id yet, or an empty transcript).
#[derive(Clone)]
pub struct PersistenceStore {
    store: Arc<dyn SessionStore>,
}

impl PersistenceStore {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }

    /// Loads the stored session, if any.
    pub fn load(&self) -> Option<ChatSession> {
        match self.store.load() {
            Ok(session) => session,
            Err(e) => {
                tracing::warn!("[Persistence] Failed to load stored session: {}", e);
                None
            }
        }
    }

    /// Saves the session. Returns whether a write was attempted and succeeded.
    pub fn save(&self, session: &ChatSession) -> bool {
        if session.is_vacuous() {
            tracing::debug!("[Persistence] Skipping save of vacuous session");
            return false;
        }

        match self.store.save(session) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(
                    session_id = %session.session_id,
                    "[Persistence] Failed to save session: {}",
                    e
                );
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ChatError, Result};
    use crate::session::Message;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingStore {
        saved: Mutex<Vec<ChatSession>>,
        fail: bool,
    }

    impl SessionStore for RecordingStore {
        fn load(&self) -> Result<Option<ChatSession>> {
            if self.fail {
                return Err(ChatError::storage("quota exceeded"));
            }
            Ok(self.saved.lock().unwrap().last().cloned())
        }

        fn save(&self, session: &ChatSession) -> Result<()> {
            if self.fail {
                return Err(ChatError::storage("quota exceeded"));
            }
            self.saved.lock().unwrap().push(session.clone());
            Ok(())
        }

        fn clear(&self) -> Result<()> {
            self.saved.lock().unwrap().clear();
            Ok(())
        }
    }

    #[test]
    fn test_save_then_load_round_trip() {
        let store = Arc::new(RecordingStore::default());
        let persistence = PersistenceStore::new(store.clone());
        let session = ChatSession::new("abc", vec![Message::user("hi")]);

        assert!(persistence.save(&session));
        assert_eq!(persistence.load(), Some(session));
    }

    #[test]
    fn test_vacuous_sessions_are_not_saved() {
        let store = Arc::new(RecordingStore::default());
        let persistence = PersistenceStore::new(store.clone());

        assert!(!persistence.save(&ChatSession::new("", vec![Message::user("hi")])));
        assert!(!persistence.save(&ChatSession::new("abc", Vec::new())));
        assert!(store.saved.lock().unwrap().is_empty());
    }

    #[test]
    fn test_failures_are_swallowed() {
        let store = Arc::new(RecordingStore {
            fail: true,
            ..Default::default()
        });
        let persistence = PersistenceStore::new(store);

        assert!(!persistence.save(&ChatSession::new("abc", vec![Message::user("hi")])));
        assert_eq!(persistence.load(), None);
    }
}
