//! Application-scoped wiring of the chat session.
//!
//! A `ChatContext` is built once when the host application mounts and lives
//! as long as it does. Hosts pass it (or clones of it) to whatever needs the
//! chat; tests build a fresh one per case with their own collaborators.

use crate::controller::ChatSessionController;
use anyhow::{Context, Result};
use docchat_core::auth::Navigator;
use docchat_core::config::ChatConfig;
use docchat_core::selection::{SelectionCapture, SelectionSource};
use docchat_core::session::{PersistenceStore, SessionStore};
use docchat_core::transport::ChatTransport;
use docchat_infrastructure::{TabSessionStore, TabStorage};
use docchat_interaction::{HttpChatTransport, SessionExpiryHandler, StaticCredentials};
use std::sync::Arc;

/// Shared handle to the chat session of one browsing context.
#[derive(Clone)]
pub struct ChatContext {
    controller: ChatSessionController,
    /// Present when the HTTP transport was wired by [`ChatContext::bootstrap`].
    credentials: Option<Arc<StaticCredentials>>,
}

impl ChatContext {
    /// Builds a context over injected collaborators.
    pub fn new(
        transport: Arc<dyn ChatTransport>,
        store: Arc<dyn SessionStore>,
        config: ChatConfig,
    ) -> Self {
        let controller = ChatSessionController::new(transport, PersistenceStore::new(store), config);
        Self {
            controller,
            credentials: None,
        }
    }

    /// Wires the HTTP transport and the tab-scoped store for `config`.
    ///
    /// `navigator` receives the login redirect when the backend answers 401;
    /// `storage` is the tab's key/value area.
    pub fn bootstrap(
        config: ChatConfig,
        navigator: Arc<dyn Navigator>,
        storage: TabStorage,
    ) -> Result<Self> {
        config.validate().context("Invalid chat configuration")?;

        let credentials = Arc::new(StaticCredentials::default());
        let transport = HttpChatTransport::new(&config)
            .context("Failed to create chat transport")?
            .with_credentials(credentials.clone())
            .with_expiry_handler(SessionExpiryHandler::new(
                navigator,
                config.login_route.clone(),
            ));
        let store = TabSessionStore::new(storage, config.storage_key.clone());

        tracing::info!(
            "[ChatContext] Chat ready (endpoint: {}, storage key: {})",
            transport.endpoint(),
            store.key()
        );

        let controller = ChatSessionController::new(
            Arc::new(transport),
            PersistenceStore::new(Arc::new(store)),
            config,
        );
        Ok(Self {
            controller,
            credentials: Some(credentials),
        })
    }

    pub fn controller(&self) -> &ChatSessionController {
        &self.controller
    }

    /// Token holder read by the HTTP transport on every request.
    ///
    /// The host's auth subsystem updates it on login and logout.
    pub fn credentials(&self) -> Option<&Arc<StaticCredentials>> {
        self.credentials.as_ref()
    }

    /// Creates a selection capture using the configured menu geometry.
    pub fn selection_capture<S: SelectionSource>(&self, source: S) -> SelectionCapture<S> {
        SelectionCapture::new(source, self.controller.config().selection.clone())
    }

    /// Invokes the selection menu's action and stages the captured text.
    ///
    /// Returns whether the chat was opened with a staged draft.
    pub fn ask_about_selection<S: SelectionSource>(&self, capture: &mut SelectionCapture<S>) -> bool {
        match capture.invoke() {
            Some(text) => self.controller.open_with_selected_text(&text),
            None => false,
        }
    }
}
