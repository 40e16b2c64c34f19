//! Chat session controller.
//!
//! `ChatSessionController` owns the transcript, the session id, visibility,
//! the pending flag, the error banner and the staged draft. Every handle is a
//! cheap clone over the same state container, so actions always observe the
//! latest state no matter when the presentation shell captured the handle.
//!
//! Exchanges run as spawned tokio tasks: a send is never lost because the
//! caller stopped waiting or the chat surface was hidden.

use docchat_core::config::ChatConfig;
use docchat_core::error::{ChatError, Result};
use docchat_core::interpreter::{ClarificationOption, Interpretation, ResponseInterpreter};
use docchat_core::session::{ChatSession, Message, PersistenceStore};
use docchat_core::transport::{ChatRequest, ChatResponse, ChatTransport};
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

/// Framing prepended to text staged from a page selection.
pub const SELECTION_PREFIX: &str = "Explain: ";

const INTERRUPTED_MESSAGE: &str = "The chat request was interrupted. Please try again.";

/// UI-level summary of the controller.
///
/// Visibility, pending and error are independent; this picks the most
/// relevant one for a single indicator (pending, then error, then visibility).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ControllerState {
    Idle,
    Open,
    Sending,
    ErrorPresented,
}

/// Read-only snapshot handed to the presentation shell.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatView {
    pub messages: Vec<Message>,
    pub session_id: Option<String>,
    pub is_open: bool,
    pub is_pending: bool,
    pub error: Option<String>,
    pub draft: String,
}

/// Result of a completed (or ignored) send.
#[derive(Debug, Clone, PartialEq)]
pub enum SendOutcome {
    /// The query was empty after trimming; nothing happened.
    Ignored,
    /// The backend answered; `message` is the appended assistant message.
    Answered {
        message: Message,
        interpretation: Interpretation,
    },
    /// The exchange failed; `message` is the appended failure notice.
    Failed { message: Message, error: ChatError },
}

impl SendOutcome {
    pub fn is_answered(&self) -> bool {
        matches!(self, Self::Answered { .. })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

/// Handle to an exchange that is already running.
///
/// Dropping it does not cancel the exchange.
#[must_use = "dropping a PendingSend detaches it; the exchange still completes"]
#[derive(Debug)]
pub struct PendingSend {
    handle: JoinHandle<SendOutcome>,
}

impl PendingSend {
    /// Waits for the exchange to finish and the transcript to be updated.
    ///
    /// # Errors
    ///
    /// [`ChatError::Internal`] if the exchange task panicked or was dropped by
    /// the runtime. The controller has already settled the send by then
    /// (banner set, failure notice appended, no longer pending).
    pub async fn wait(self) -> Result<SendOutcome> {
        self.handle
            .await
            .map_err(|e| ChatError::internal(format!("Chat exchange task failed: {e}")))
    }
}

/// Settles an exchange that ends without a transport result.
///
/// Armed for the duration of the transport call; if the task unwinds or is
/// dropped there, the send is recorded as failed so the controller never
/// stays pending.
struct ExchangeGuard<'a> {
    controller: &'a ChatSessionController,
    armed: bool,
}

impl<'a> ExchangeGuard<'a> {
    fn new(controller: &'a ChatSessionController) -> Self {
        Self {
            controller,
            armed: true,
        }
    }

    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for ExchangeGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut inner = self.controller.lock();
        if inner.is_pending {
            self.controller.record_failure(&mut inner, ChatError::internal(INTERRUPTED_MESSAGE));
            inner.is_pending = false;
            self.controller.persist(&inner);
        }
    }
}

#[derive(Debug, Default)]
struct ControllerInner {
    messages: Vec<Message>,
    session_id: Option<String>,
    is_open: bool,
    is_pending: bool,
    error: Option<String>,
    draft: String,
    /// Page selection staged by `open_with_selected_text`, sent as
    /// `selected_text` with the next submitted query.
    staged_selection: Option<String>,
}

impl ControllerInner {
    fn to_session(&self) -> ChatSession {
        ChatSession::new(self.session_id.clone().unwrap_or_default(), self.messages.clone())
    }
}

/// Orchestrates the chat session lifecycle.
#[derive(Clone)]
pub struct ChatSessionController {
    inner: Arc<Mutex<ControllerInner>>,
    transport: Arc<dyn ChatTransport>,
    persistence: PersistenceStore,
    interpreter: ResponseInterpreter,
    config: Arc<ChatConfig>,
}

impl ChatSessionController {
    /// Creates a controller, restoring the stored session if there is one.
    ///
    /// The store is read exactly once, here. An absent or empty stored
    /// session leaves a fresh transcript seeded with the greeting (unless
    /// the configured greeting is blank).
    pub fn new(
        transport: Arc<dyn ChatTransport>,
        persistence: PersistenceStore,
        config: ChatConfig,
    ) -> Self {
        let mut inner = ControllerInner::default();

        match persistence.load() {
            Some(session) if !session.is_vacuous() => {
                tracing::info!(
                    session_id = %session.session_id,
                    messages = session.messages.len(),
                    "[ChatController] Restored stored session"
                );
                inner.session_id = Some(session.session_id);
                inner.messages = session.messages;
            }
            _ if config.greeting.trim().is_empty() => {
                tracing::debug!("[ChatController] No stored session, starting empty");
            }
            _ => {
                tracing::debug!("[ChatController] No stored session, seeding greeting");
                inner.messages.push(Message::assistant(config.greeting.clone()));
            }
        }

        Self {
            inner: Arc::new(Mutex::new(inner)),
            transport,
            persistence,
            interpreter: ResponseInterpreter::new(),
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &ChatConfig {
        &self.config
    }

    fn lock(&self) -> MutexGuard<'_, ControllerInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn persist(&self, inner: &ControllerInner) {
        self.persistence.save(&inner.to_session());
    }

    // ============================================================================
    // Sending
    // ============================================================================

    /// Starts an exchange and returns without waiting for the backend.
    ///
    /// By the time this returns the user message is in the transcript and
    /// the controller is pending. Returns `Ok(None)` for blank input.
    ///
    /// # Errors
    ///
    /// - [`ChatError::SendInProgress`] if another exchange is in flight; the
    ///   transcript is left untouched and no request is issued.
    /// - [`ChatError::Internal`] when called outside a tokio runtime.
    pub fn submit(&self, query: &str) -> Result<Option<PendingSend>> {
        let query = query.trim();
        if query.is_empty() {
            tracing::debug!("[ChatController] Ignoring empty query");
            return Ok(None);
        }

        let runtime = Handle::try_current()
            .map_err(|_| ChatError::internal("Chat exchanges require a tokio runtime"))?;

        let request = {
            let mut inner = self.lock();
            if inner.is_pending {
                tracing::warn!("[ChatController] Rejected send while another is in flight");
                return Err(ChatError::SendInProgress);
            }

            inner.error = None;
            inner.messages.push(Message::user(query));
            inner.is_pending = true;
            inner.draft.clear();
            let selected_text = inner.staged_selection.take();
            self.persist(&inner);

            ChatRequest::new(query)
                .with_session_id(inner.session_id.clone())
                .with_selected_text(selected_text)
                .with_top_k(self.config.top_k)
        };

        let controller = self.clone();
        let handle = runtime.spawn(async move { controller.run_exchange(request).await });
        Ok(Some(PendingSend { handle }))
    }

    /// Sends `query` and waits for the transcript to be updated.
    ///
    /// Transport failures are not errors here: they come back as
    /// [`SendOutcome::Failed`] after the banner and failure notice are set.
    pub async fn send_message(&self, query: &str) -> Result<SendOutcome> {
        match self.submit(query)? {
            Some(pending) => pending.wait().await,
            None => Ok(SendOutcome::Ignored),
        }
    }

    /// Re-queries with the marker-stripped text of a clarification option.
    pub async fn select_clarification(&self, option: &ClarificationOption) -> Result<SendOutcome> {
        tracing::debug!("[ChatController] Clarification selected: {}", option.label);
        self.send_message(&option.query).await
    }

    async fn run_exchange(&self, request: ChatRequest) -> SendOutcome {
        let mut guard = ExchangeGuard::new(self);
        let result = self.transport.send(request).await;
        guard.disarm();

        let mut inner = self.lock();
        let outcome = match result {
            Ok(response) => self.apply_answer(&mut inner, response),
            Err(error) => self.record_failure(&mut inner, error),
        };
        inner.is_pending = false;
        self.persist(&inner);
        outcome
    }

    fn record_failure(&self, inner: &mut ControllerInner, error: ChatError) -> SendOutcome {
        tracing::error!(
            status = ?error.status(),
            retryable = error.is_retryable(),
            "[ChatController] Chat exchange failed: {}",
            error
        );
        inner.error = Some(error.to_string());
        let message = Message::assistant(self.config.failure_notice.clone());
        inner.messages.push(message.clone());
        SendOutcome::Failed { message, error }
    }

    fn apply_answer(&self, inner: &mut ControllerInner, response: ChatResponse) -> SendOutcome {
        match inner.session_id.as_deref() {
            None if !response.session_id.is_empty() => {
                tracing::info!(
                    session_id = %response.session_id,
                    "[ChatController] Adopted session id"
                );
                inner.session_id = Some(response.session_id.clone());
            }
            Some(current) if current != response.session_id => {
                tracing::warn!(
                    current = %current,
                    returned = %response.session_id,
                    "[ChatController] Backend returned a different session id, keeping current"
                );
            }
            _ => {}
        }

        let interpretation = self
            .interpreter
            .interpret(&response.answer, response.confidence);
        let citations = if interpretation.is_failure() {
            Vec::new()
        } else {
            response.citations
        };

        tracing::info!(
            confidence = response.confidence,
            citations = citations.len(),
            "[ChatController] Answer received"
        );

        let message = Message::answer(response.answer, citations, response.confidence);
        inner.messages.push(message.clone());
        SendOutcome::Answered {
            message,
            interpretation,
        }
    }

    // ============================================================================
    // Visibility, draft and error banner
    // ============================================================================

    /// Opens the chat with `Explain: <text>` staged as the draft.
    ///
    /// Does not send. Returns `false` (and changes nothing) for blank text.
    pub fn open_with_selected_text(&self, text: &str) -> bool {
        let text = text.trim();
        if text.is_empty() {
            tracing::debug!("[ChatController] Ignoring empty selection");
            return false;
        }

        let selection = match text.char_indices().nth(self.config.max_selected_chars) {
            Some((cut, _)) => text[..cut].trim_end(),
            None => text,
        };

        let mut inner = self.lock();
        inner.draft = format!("{SELECTION_PREFIX}{selection}");
        inner.staged_selection = Some(selection.to_string());
        inner.is_open = true;
        true
    }

    pub fn draft(&self) -> String {
        self.lock().draft.clone()
    }

    /// Replaces the draft. Clearing it also drops any staged selection.
    pub fn set_draft(&self, draft: impl Into<String>) {
        let mut inner = self.lock();
        inner.draft = draft.into();
        if inner.draft.trim().is_empty() {
            inner.staged_selection = None;
        }
    }

    pub fn toggle_chat(&self) {
        let mut inner = self.lock();
        inner.is_open = !inner.is_open;
    }

    pub fn open_chat(&self) {
        self.lock().is_open = true;
    }

    /// Hides the chat. Never touches the transcript or an in-flight send.
    pub fn close_chat(&self) {
        self.lock().is_open = false;
    }

    /// Dismisses the error banner.
    pub fn clear_error(&self) {
        self.lock().error = None;
    }

    // ============================================================================
    // Read side
    // ============================================================================

    pub fn snapshot(&self) -> ChatView {
        let inner = self.lock();
        ChatView {
            messages: inner.messages.clone(),
            session_id: inner.session_id.clone(),
            is_open: inner.is_open,
            is_pending: inner.is_pending,
            error: inner.error.clone(),
            draft: inner.draft.clone(),
        }
    }

    pub fn state(&self) -> ControllerState {
        let inner = self.lock();
        if inner.is_pending {
            ControllerState::Sending
        } else if inner.error.is_some() {
            ControllerState::ErrorPresented
        } else if inner.is_open {
            ControllerState::Open
        } else {
            ControllerState::Idle
        }
    }

    pub fn messages(&self) -> Vec<Message> {
        self.lock().messages.clone()
    }

    pub fn session_id(&self) -> Option<String> {
        self.lock().session_id.clone()
    }

    pub fn is_open(&self) -> bool {
        self.lock().is_open
    }

    pub fn is_pending(&self) -> bool {
        self.lock().is_pending
    }

    pub fn error(&self) -> Option<String> {
        self.lock().error.clone()
    }
}
