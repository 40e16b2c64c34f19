//! Session store trait.
//!
//! Defines the interface for durable-for-tab session storage.

use super::model::ChatSession;
use crate::error::Result;

/// An abstract store holding the single active session of a browsing context.
///
/// This trait decouples the controller from the storage mechanism
/// (tab-scoped map, JSON file, ...). Implementations report failures
/// faithfully; swallowing them is the job of [`super::PersistenceStore`].
///
/// Calls happen while the controller holds its state lock, so the methods
/// are synchronous and must not block for long.
pub trait SessionStore: Send + Sync {
    /// Loads the stored session.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(ChatSession))`: A session was stored
    /// - `Ok(None)`: Nothing stored yet
    /// - `Err(_)`: The entry exists but could not be read or decoded
    fn load(&self) -> Result<Option<ChatSession>>;

    /// Replaces the stored session.
    fn save(&self, session: &ChatSession) -> Result<()>;

    /// Removes the stored session (end of browsing context).
    fn clear(&self) -> Result<()>;
}
