//! Application state aggregate.
//!
//! `AppState` is the single source of truth the presentation layer observes.
//! It is only ever replaced or mutated as a whole by the application layer's
//! store, so any reader sees a consistent combination of fields.

use crate::balance::Balance;
use crate::chat::ChatThread;
use crate::session::{AuthToken, Session};
use crate::trade::TradeState;
use crate::user::UserProfile;
use crate::viewing_key::ViewingKeys;
use crate::wallet::{ConnectPhase, ConnectedWallet, WalletConnection};

#[derive(Debug, Clone, Default)]
pub struct AppState {
    /// Where the connect state machine currently is.
    pub phase: ConnectPhase,
    pub wallet: WalletConnection,
    pub session: Option<Session>,
    /// On-chain address of the agent delegated by the backend.
    pub agent_address: Option<String>,
    pub viewing_keys: Option<ViewingKeys>,
    pub balance: Balance,
    pub chat: ChatThread,
    pub trade: TradeState,
    /// UI busy flag; not a source of truth for correctness.
    pub is_loading: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn token(&self) -> Option<&AuthToken> {
        self.session.as_ref().map(Session::token)
    }

    pub fn user(&self) -> Option<&UserProfile> {
        self.session.as_ref().and_then(|session| session.user.as_ref())
    }

    pub fn session_id(&self) -> Option<u64> {
        self.session.as_ref().map(Session::id)
    }

    pub fn connected_wallet(&self) -> Option<&ConnectedWallet> {
        self.wallet.connected()
    }

    pub fn is_connected(&self) -> bool {
        self.wallet.is_connected()
    }

    /// Commits a wallet connection and its session together.
    pub fn commit_connection(&mut self, wallet: ConnectedWallet, session: Session) {
        self.wallet = WalletConnection::Connected(wallet);
        self.session = Some(session);
        self.phase = ConnectPhase::Connected;
    }

    /// Drops everything bound to the wallet session.
    ///
    /// The chat transcript and viewing keys are not session-bound and are
    /// left in place.
    pub fn reset_connection(&mut self) {
        self.phase = ConnectPhase::Disconnected;
        self.wallet = WalletConnection::Disconnected;
        self.session = None;
        self.agent_address = None;
        self.balance = Balance::zero();
        self.trade = TradeState::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::TrackedAsset;
    use crate::balance::BalanceEntry;
    use crate::chat::ChatMessage;
    use crate::wallet::{ChainDescriptor, EncryptionHandle, SignerHandle};

    fn wallet() -> ConnectedWallet {
        ConnectedWallet::new(
            "secret1user",
            SignerHandle::new("secret-4", ()),
            EncryptionHandle::new(()),
            ChainDescriptor::secret_network("secret-4", "https://lcd.example"),
        )
        .unwrap()
    }

    #[test]
    fn test_new() {
        let state = AppState::new();
        assert_eq!(state.phase, ConnectPhase::Disconnected);
        assert!(!state.is_connected());
        assert!(state.session.is_none());
        assert!(state.balance.is_zero());
        assert!(state.chat.is_empty());
        assert!(!state.is_loading);
    }

    #[test]
    fn test_commit_connection_sets_wallet_and_session_together() {
        let mut state = AppState::new();
        state.commit_connection(wallet(), Session::new(1, AuthToken::new("t"), None));
        assert!(state.is_connected());
        assert_eq!(state.session_id(), Some(1));
        assert_eq!(state.phase, ConnectPhase::Connected);
    }

    #[test]
    fn test_reset_connection_keeps_chat() {
        let mut state = AppState::new();
        state.commit_connection(wallet(), Session::new(1, AuthToken::new("t"), None));
        state.chat.push(ChatMessage::user("hi"));
        state
            .balance
            .set(TrackedAsset::SScrt, BalanceEntry::Amount("3".to_string()));
        state.trade.is_convinced = true;
        state.agent_address = Some("secret1agent".to_string());

        state.reset_connection();

        assert!(!state.is_connected());
        assert!(state.session.is_none());
        assert!(state.agent_address.is_none());
        assert!(state.balance.is_zero());
        assert_eq!(state.trade, TradeState::default());
        assert_eq!(state.chat.len(), 1);
    }
}
