//! Agent chat transcript synchronisation.

use std::sync::Arc;
use tradewind_core::Result;
use tradewind_core::backend::BackendApi;
use tradewind_core::chat::ChatThread;
use tradewind_core::session::AuthToken;
use tradewind_infrastructure::LocalStore;

#[derive(Clone)]
pub struct ChatSync {
    backend: Arc<dyn BackendApi>,
    local: LocalStore,
}

impl ChatSync {
    pub fn new(backend: Arc<dyn BackendApi>, local: LocalStore) -> Self {
        Self { backend, local }
    }

    /// Sends one message; returns the assistant's reply.
    pub async fn send(&self, token: &AuthToken, content: &str) -> Result<String> {
        self.backend.send_chat(token, content).await
    }

    /// The backend's authoritative transcript.
    pub async fn history(&self, token: &AuthToken) -> Result<ChatThread> {
        let messages = self.backend.chat_history(token).await?;
        tracing::debug!("[Chat] Loaded {} messages", messages.len());
        Ok(ChatThread::new(messages))
    }

    pub fn persist(&self, thread: &ChatThread) -> Result<()> {
        self.local.save_chat(thread)
    }

    /// Persists `thread`, logging instead of failing.
    pub fn persist_best_effort(&self, thread: &ChatThread) {
        if let Err(e) = self.persist(thread) {
            tracing::warn!("[Chat] Failed to persist transcript: {}", e);
        }
    }
}
