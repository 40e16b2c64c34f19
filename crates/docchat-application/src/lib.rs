pub mod context;
pub mod controller;
pub mod logging;

pub use context::ChatContext;
pub use controller::{ChatSessionController, ChatView, ControllerState, PendingSend, SendOutcome};
pub use logging::init_tracing;
