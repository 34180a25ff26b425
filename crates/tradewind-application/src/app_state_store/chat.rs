//! Chat transcript operations.

use super::{AppStateStore, scoped};
use crate::in_flight::Operation;
use tradewind_core::chat::{ChatMessage, ChatRole, ChatThread};
use tradewind_core::{Result, TradewindError};

impl AppStateStore {
    /// Appends `content` to the transcript right away, sends it, and appends
    /// the assistant's reply once it arrives.
    ///
    /// If sending fails the optimistic message stays and no reply is added.
    pub async fn add_message(&self, content: impl Into<String>, role: ChatRole) -> Result<()> {
        let content = content.into();
        if content.trim().is_empty() {
            return Err(TradewindError::validation("message is empty"));
        }
        let ctx = self.session_context("add_message")?;
        ctx.require_wallet()?;
        if !ctx.has_user {
            return Err(TradewindError::validation("add_message requires a user profile"));
        }

        self.update(|state| state.chat.push(ChatMessage::new(role, content.clone())));

        let sent = scoped(&ctx.cancel, "add_message", self.inner.chat.send(&ctx.token, &content)).await;
        let reply = match sent {
            Ok(reply) => reply,
            Err(e) => {
                tracing::warn!("[Chat] Send failed, keeping optimistic message: {}", e);
                return self.expire_on_auth(Err(e));
            }
        };

        let mut transcript = ChatThread::default();
        let committed = self.update_session(ctx.id, |state| {
            state.chat.push(ChatMessage::assistant(reply));
            transcript = state.chat.clone();
        });
        if !committed {
            return Err(TradewindError::cancelled("add_message"));
        }
        self.inner.chat.persist_best_effort(&transcript);
        Ok(())
    }

    /// Replaces the transcript with the backend's copy.
    ///
    /// A no-op without a session, user profile and connected wallet.
    pub async fn load_messages(&self) -> Result<()> {
        let op = Operation::LoadMessages;
        let _permit = self.inner.guard.try_acquire(op)?;

        let ctx = match self.session_context("load_messages") {
            Ok(ctx) if ctx.has_user && ctx.wallet.is_some() => ctx,
            _ => {
                tracing::debug!("[Chat] Skipping load: no session");
                return Ok(());
            }
        };

        let loaded = scoped(&ctx.cancel, op, self.inner.chat.history(&ctx.token)).await;
        let thread = self.expire_on_auth(loaded)?;

        if !self.update_session(ctx.id, |state| state.chat = thread.clone()) {
            return Err(TradewindError::cancelled(op));
        }
        self.inner.chat.persist_best_effort(&thread);
        Ok(())
    }

    /// Empties the transcript and persists the empty state.
    pub fn clear_messages(&self) -> Result<()> {
        self.update(|state| state.chat.clear());
        self.inner.chat.persist(&ChatThread::default())
    }
}
