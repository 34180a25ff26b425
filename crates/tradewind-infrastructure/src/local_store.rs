//! Typed access to the client's persisted local state.
//!
//! Each value is stored as a JSON string under a fixed key (see
//! `tradewind_core::storage::keys`), so the layout stays readable by any
//! other client sharing the same store.

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tradewind_core::Result;
use tradewind_core::chat::ChatThread;
use tradewind_core::session::AuthToken;
use tradewind_core::storage::{KeyValueStore, keys};
use tradewind_core::viewing_key::ViewingKeys;

#[derive(Clone)]
pub struct LocalStore {
    backend: Arc<dyn KeyValueStore>,
}

impl LocalStore {
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        Self { backend }
    }

    fn read<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.backend.get(key)? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    fn write<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let raw = serde_json::to_string(value)?;
        self.backend.set(key, raw)
    }

    // ============================================================================
    // Chat transcript
    // ============================================================================

    pub fn load_chat(&self) -> Result<Option<ChatThread>> {
        self.read(keys::CHAT_MESSAGES)
    }

    pub fn save_chat(&self, thread: &ChatThread) -> Result<()> {
        self.write(keys::CHAT_MESSAGES, thread)
    }

    // ============================================================================
    // Viewing keys
    // ============================================================================

    pub fn load_viewing_keys(&self) -> Result<Option<ViewingKeys>> {
        self.read(keys::VIEWING_KEYS)
    }

    pub fn save_viewing_keys(&self, keys: &ViewingKeys) -> Result<()> {
        self.write(keys::VIEWING_KEYS, keys)
    }

    // ============================================================================
    // Auto-reconnect preference
    // ============================================================================

    /// Unset counts as `false`.
    pub fn auto_connect(&self) -> Result<bool> {
        Ok(self.read::<bool>(keys::AUTO_CONNECT)?.unwrap_or(false))
    }

    pub fn set_auto_connect(&self, enabled: bool) -> Result<()> {
        if enabled {
            self.write(keys::AUTO_CONNECT, &true)
        } else {
            self.backend.remove(keys::AUTO_CONNECT)
        }
    }

    // ============================================================================
    // Session token
    // ============================================================================

    pub fn load_token(&self) -> Result<Option<AuthToken>> {
        Ok(self
            .read::<AuthToken>(keys::AUTH_TOKEN)?
            .filter(|token| !token.is_empty()))
    }

    pub fn save_token(&self, token: &AuthToken) -> Result<()> {
        self.write(keys::AUTH_TOKEN, token)
    }

    pub fn clear_token(&self) -> Result<()> {
        self.backend.remove(keys::AUTH_TOKEN)
    }
}
