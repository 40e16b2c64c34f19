//! HTTP gateway to the DocChat backend.

pub mod auth;
pub mod http_transport;

pub use auth::{SessionExpiryHandler, StaticCredentials};
pub use http_transport::HttpChatTransport;
