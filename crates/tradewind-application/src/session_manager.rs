//! Session token lifecycle: restore, login, logout.

use crate::wallet_connector::WalletConnector;
use std::sync::Arc;
use tradewind_core::backend::{BackendApi, LoginRequest};
use tradewind_core::session::{AuthToken, TokenStatus};
use tradewind_core::user::UserProfile;
use tradewind_core::wallet::ConnectedWallet;
use tradewind_core::{Result, TradewindError};
use tradewind_infrastructure::LocalStore;

/// Text the wallet signs to prove control of `address` at `timestamp_ms`.
pub fn login_challenge_message(address: &str, timestamp_ms: i64) -> String {
    format!(
        "Login to Secret Trading App\nTimestamp: {}\nWallet: {}",
        timestamp_ms, address
    )
}

#[derive(Clone)]
pub struct SessionManager {
    backend: Arc<dyn BackendApi>,
    local: LocalStore,
}

impl SessionManager {
    pub fn new(backend: Arc<dyn BackendApi>, local: LocalStore) -> Self {
        Self { backend, local }
    }

    /// Returns the persisted token if it is still usable for `address`.
    ///
    /// An expired, foreign or unreadable token is logged out and `None` is
    /// returned.
    pub fn restore_token(&self, address: &str) -> Option<AuthToken> {
        let token = match self.local.load_token() {
            Ok(token) => token?,
            Err(e) => {
                tracing::warn!("[Session] Ignoring unreadable persisted token: {}", e);
                self.logout();
                return None;
            }
        };

        let now = chrono::Utc::now().timestamp();
        match token.status_for(address, now) {
            TokenStatus::Valid => {
                tracing::debug!("[Session] Reusing persisted token for {}", address);
                Some(token)
            }
            status => {
                tracing::info!("[Session] Persisted token is {}, logging out", status);
                self.logout();
                None
            }
        }
    }

    /// Challenge/response login with the wallet's signer.
    pub async fn login(
        &self,
        connector: &WalletConnector,
        wallet: &ConnectedWallet,
    ) -> Result<(AuthToken, UserProfile)> {
        let timestamp = chrono::Utc::now().timestamp_millis();
        let message = login_challenge_message(wallet.address(), timestamp);
        let signature = connector.sign(wallet, &message).await?;

        let response = self
            .backend
            .login(&LoginRequest {
                wallet_address: wallet.address().to_string(),
                timestamp,
                signature,
            })
            .await?;

        if response.token.is_empty() {
            return Err(TradewindError::auth_failure("backend issued an empty token"));
        }

        if let Err(e) = self.local.save_token(&response.token) {
            tracing::warn!("[Session] Failed to persist token: {}", e);
        }

        tracing::info!("[Session] Logged in as {}", wallet.address());
        Ok((response.token, response.user))
    }

    /// Forgets the persisted token. Never fails.
    pub fn logout(&self) {
        if let Err(e) = self.local.clear_token() {
            tracing::warn!("[Session] Failed to clear persisted token: {}", e);
        }
    }

    pub async fn fetch_user(&self, token: &AuthToken) -> Result<UserProfile> {
        self.backend.user_info(token).await
    }

    /// Tells the backend the allowance grants are in place.
    pub async fn confirm_spend_authorization(&self, token: &AuthToken) -> Result<()> {
        self.backend.authorize_spend(token).await
    }

    pub async fn fetch_agent_address(&self, token: &AuthToken) -> Result<String> {
        let address = self.backend.agent_address(token).await?;
        let address = address.trim();
        if address.is_empty() {
            return Err(TradewindError::validation("backend returned an empty agent address"));
        }
        Ok(address.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use base64::Engine;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use tradewind_core::backend::{LoginResponse, ViewingKeysPayload};
    use tradewind_core::chat::ChatMessage;
    use tradewind_infrastructure::MemoryKeyValueStore;

    /// Backend that must not be reached.
    struct OfflineBackend;

    fn offline<T>() -> Result<T> {
        Err(TradewindError::internal("backend should not be called"))
    }

    #[async_trait]
    impl BackendApi for OfflineBackend {
        async fn login(&self, _: &LoginRequest) -> Result<LoginResponse> {
            offline()
        }
        async fn user_info(&self, _: &AuthToken) -> Result<UserProfile> {
            offline()
        }
        async fn set_viewing_keys(&self, _: &AuthToken, _: &ViewingKeysPayload) -> Result<()> {
            offline()
        }
        async fn authorize_spend(&self, _: &AuthToken) -> Result<()> {
            offline()
        }
        async fn agent_address(&self, _: &AuthToken) -> Result<String> {
            offline()
        }
        async fn chat_history(&self, _: &AuthToken) -> Result<Vec<ChatMessage>> {
            offline()
        }
        async fn send_chat(&self, _: &AuthToken, _: &str) -> Result<String> {
            offline()
        }
    }

    fn jwt(sub: &str, exp: i64) -> AuthToken {
        let payload = URL_SAFE_NO_PAD.encode(serde_json::json!({"sub": sub, "exp": exp}).to_string());
        AuthToken::new(format!("e30.{}.sig", payload))
    }

    fn manager() -> (SessionManager, LocalStore) {
        let local = LocalStore::new(Arc::new(MemoryKeyValueStore::new()));
        (SessionManager::new(Arc::new(OfflineBackend), local.clone()), local)
    }

    #[test]
    fn test_challenge_message_format() {
        assert_eq!(
            login_challenge_message("secret1abc", 1_700_000_000_000),
            "Login to Secret Trading App\nTimestamp: 1700000000000\nWallet: secret1abc"
        );
    }

    #[test]
    fn test_restore_valid_token() {
        let (manager, local) = manager();
        let token = jwt("secret1abc", 4_000_000_000);
        local.save_token(&token).unwrap();

        assert_eq!(manager.restore_token("secret1abc"), Some(token));
        assert!(local.load_token().unwrap().is_some());
    }

    #[test]
    fn test_restore_expired_token_logs_out() {
        let (manager, local) = manager();
        local.save_token(&jwt("secret1abc", 1)).unwrap();

        assert_eq!(manager.restore_token("secret1abc"), None);
        assert_eq!(local.load_token().unwrap(), None);
    }

    #[test]
    fn test_restore_foreign_token_logs_out() {
        let (manager, local) = manager();
        local.save_token(&jwt("secret1other", 4_000_000_000)).unwrap();

        assert_eq!(manager.restore_token("secret1abc"), None);
        assert_eq!(local.load_token().unwrap(), None);
    }

    #[test]
    fn test_restore_without_token() {
        let (manager, _) = manager();
        assert_eq!(manager.restore_token("secret1abc"), None);
    }
}
