pub mod config_service;
pub mod file_session_store;
pub mod paths;
pub mod storage;
pub mod tab_session_store;

pub use crate::config_service::ConfigService;
pub use crate::file_session_store::JsonFileSessionStore;
pub use crate::paths::DocChatPaths;
pub use crate::tab_session_store::{TabSessionStore, TabStorage};
