//! Session domain module.
//!
//! # Module Structure
//!
//! - `model`: The persisted session shape (`ChatSession`)
//! - `message`: Transcript entries (`Message`, `MessageRole`, `Citation`)
//! - `repository`: Storage trait (`SessionStore`)
//! - `persistence`: Best-effort wrapper used by the controller (`PersistenceStore`)

mod message;
mod model;
mod persistence;
mod repository;

// Re-export public API
pub use message::{Citation, Message, MessageRole};
pub use model::ChatSession;
pub use persistence::PersistenceStore;
pub use repository::SessionStore;
