//! Domain types and pure logic of the DocChat session core.
//!
//! Adapters (storage, HTTP) live in sibling crates and plug in through the
//! traits defined here: [`session::SessionStore`], [`transport::ChatTransport`],
//! [`auth::CredentialProvider`], [`auth::Navigator`] and
//! [`selection::SelectionSource`].

pub mod auth;
pub mod config;
pub mod error;
pub mod interpreter;
pub mod selection;
pub mod session;
pub mod transport;

// Re-export common types
pub use config::ChatConfig;
pub use error::{ChatError, Result};
pub use interpreter::{ClarificationOption, Interpretation, ResponseInterpreter};
pub use session::{ChatSession, Citation, Message, MessageRole, PersistenceStore, SessionStore};
pub use transport::{ChatRequest, ChatResponse, ChatTransport};
