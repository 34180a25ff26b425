//! Viewing key persistence with backend-first writes.

use std::sync::Arc;
use tradewind_core::Result;
use tradewind_core::backend::{BackendApi, ViewingKeysPayload};
use tradewind_core::session::AuthToken;
use tradewind_core::viewing_key::ViewingKeys;
use tradewind_infrastructure::LocalStore;

#[derive(Clone)]
pub struct ViewingKeyStore {
    backend: Arc<dyn BackendApi>,
    local: LocalStore,
}

impl ViewingKeyStore {
    pub fn new(backend: Arc<dyn BackendApi>, local: LocalStore) -> Self {
        Self { backend, local }
    }

    /// Reads the locally persisted keys. No network call.
    ///
    /// Absent or unreadable keys are `None`.
    pub fn load(&self) -> Option<ViewingKeys> {
        match self.local.load_viewing_keys() {
            Ok(keys) => keys,
            Err(e) => {
                tracing::warn!("[ViewingKeys] Ignoring unreadable persisted keys: {}", e);
                None
            }
        }
    }

    /// Registers `keys` with the backend, then persists them locally.
    ///
    /// Nothing is written locally unless the backend acknowledged.
    pub async fn set(&self, token: &AuthToken, keys: &ViewingKeys) -> Result<()> {
        keys.ensure_complete()?;
        let payload = ViewingKeysPayload::from_keys(keys)?;

        self.backend.set_viewing_keys(token, &payload).await?;
        tracing::info!("[ViewingKeys] Backend acknowledged new keys");

        self.local.save_viewing_keys(keys)
    }
}
