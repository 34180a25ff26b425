//! Shared fixtures for `AppStateStore` scenario tests.

#![allow(dead_code)]

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::{Notify, mpsc};
use tradewind_application::{AppStateStore, Collaborators, Notice, Settlement};
use tradewind_core::asset::TrackedAsset;
use tradewind_core::backend::{BackendApi, LoginRequest, LoginResponse, ViewingKeysPayload};
use tradewind_core::chain::{ChainClient, ContractExecution, ContractQuery, TxReceipt};
use tradewind_core::chat::ChatMessage;
use tradewind_core::config::ClientConfig;
use tradewind_core::session::AuthToken;
use tradewind_core::user::UserProfile;
use tradewind_core::viewing_key::ViewingKeys;
use tradewind_core::wallet::{
    ChainDescriptor, ConnectedWallet, EncryptionHandle, SignerHandle, WalletAccount,
    WalletExtension,
};
use tradewind_core::{Result, TradewindError};
use tradewind_infrastructure::{LocalStore, MemoryKeyValueStore};

pub const ADDRESS: &str = "secret1user";
pub const AGENT: &str = "secret1abc";
/// 2096-10-02, far enough for any test run.
pub const FAR_FUTURE: i64 = 4_000_000_000;

pub fn jwt(sub: &str, exp: i64) -> AuthToken {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(json!({"sub": sub, "exp": exp}).to_string());
    AuthToken::new(format!("{}.{}.sig", header, payload))
}

pub fn viewing_keys() -> ViewingKeys {
    ViewingKeys::new([
        (TrackedAsset::SScrt, "vk-scrt".to_string()),
        (TrackedAsset::SUsdc, "vk-usdc".to_string()),
    ])
}

pub fn test_config() -> ClientConfig {
    ClientConfig {
        wallet_ready_timeout_ms: 200,
        wallet_poll_interval_ms: 10,
        settlement_delay_ms: 3_000,
        ..ClientConfig::default()
    }
}

// ============================================================================
// Wallet extension
// ============================================================================

pub struct MockWallet {
    pub installed: AtomicBool,
    pub ready: AtomicBool,
    pub signed: Mutex<Vec<String>>,
}

impl MockWallet {
    pub fn new() -> Self {
        Self {
            installed: AtomicBool::new(true),
            ready: AtomicBool::new(true),
            signed: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl WalletExtension for MockWallet {
    fn is_installed(&self) -> bool {
        self.installed.load(Ordering::SeqCst)
    }

    fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    async fn suggest_chain(&self, _chain: &ChainDescriptor) -> Result<()> {
        Ok(())
    }

    async fn enable(&self, _chain_id: &str) -> Result<()> {
        Ok(())
    }

    async fn offline_signer(&self, chain_id: &str) -> Result<SignerHandle> {
        Ok(SignerHandle::new(chain_id, ()))
    }

    async fn accounts(&self, _signer: &SignerHandle) -> Result<Vec<WalletAccount>> {
        Ok(vec![WalletAccount {
            address: ADDRESS.to_string(),
        }])
    }

    async fn encryption_utils(&self, _chain_id: &str) -> Result<EncryptionHandle> {
        Ok(EncryptionHandle::new(()))
    }

    async fn sign_arbitrary(&self, _chain_id: &str, _signer: &str, data: &str) -> Result<String> {
        self.signed.lock().unwrap().push(data.to_string());
        Ok("c2lnbmF0dXJl".to_string())
    }
}

// ============================================================================
// Chain client
// ============================================================================

pub struct MockChain {
    /// Balance query responses keyed by contract address
    pub balances: Mutex<HashMap<String, Result<Value>>>,
    /// 0-based index of the execution that fails
    pub fail_execution_at: Mutex<Option<usize>>,
    pub queries: Mutex<Vec<ContractQuery>>,
    pub executions: Mutex<Vec<ContractExecution>>,
}

impl MockChain {
    pub fn new() -> Self {
        let balances = HashMap::from([
            (
                TrackedAsset::SScrt.contract_address().to_string(),
                Ok(json!({"balance": {"amount": "1500000"}})),
            ),
            (
                TrackedAsset::SUsdc.contract_address().to_string(),
                Ok(json!({"balance": {"amount": "2000000"}})),
            ),
        ]);
        Self {
            balances: Mutex::new(balances),
            fail_execution_at: Mutex::new(None),
            queries: Mutex::new(Vec::new()),
            executions: Mutex::new(Vec::new()),
        }
    }

    pub fn query_count(&self) -> usize {
        self.queries.lock().unwrap().len()
    }
}

#[async_trait]
impl ChainClient for MockChain {
    async fn query_contract(&self, _wallet: &ConnectedWallet, query: &ContractQuery) -> Result<Value> {
        self.queries.lock().unwrap().push(query.clone());
        self.balances
            .lock()
            .unwrap()
            .get(&query.contract_address)
            .cloned()
            .unwrap_or_else(|| Err(TradewindError::chain("unknown contract")))
    }

    async fn execute_contract(
        &self,
        _wallet: &ConnectedWallet,
        execution: &ContractExecution,
    ) -> Result<TxReceipt> {
        let mut executions = self.executions.lock().unwrap();
        let index = executions.len();
        executions.push(execution.clone());
        if *self.fail_execution_at.lock().unwrap() == Some(index) {
            return Err(TradewindError::chain("allowance transaction failed"));
        }
        Ok(TxReceipt {
            tx_hash: format!("TX{}", index),
        })
    }
}

// ============================================================================
// Backend
// ============================================================================

pub struct MockBackend {
    pub login_token: Mutex<AuthToken>,
    pub user: Mutex<UserProfile>,
    pub history: Mutex<Vec<ChatMessage>>,
    /// Injected failures keyed by method name
    pub failures: Mutex<HashMap<&'static str, TradewindError>>,
    /// When set, `send_chat` waits for a notification before replying
    pub chat_gate: Mutex<Option<Arc<Notify>>>,
    /// When set, `user_info` waits for a notification before answering
    pub user_gate: Mutex<Option<Arc<Notify>>>,
    pub calls: Mutex<Vec<&'static str>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self {
            login_token: Mutex::new(jwt(ADDRESS, FAR_FUTURE)),
            user: Mutex::new(UserProfile::new(ADDRESS)),
            history: Mutex::new(vec![
                ChatMessage::user("convince me"),
                ChatMessage::assistant("SCRT is undervalued"),
            ]),
            failures: Mutex::new(HashMap::new()),
            chat_gate: Mutex::new(None),
            user_gate: Mutex::new(None),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn fail(&self, method: &'static str, err: TradewindError) {
        self.failures.lock().unwrap().insert(method, err);
    }

    pub fn recover(&self, method: &'static str) {
        self.failures.lock().unwrap().remove(method);
    }

    pub fn count(&self, method: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|call| **call == method)
            .count()
    }

    fn enter(&self, method: &'static str) -> Result<()> {
        self.calls.lock().unwrap().push(method);
        match self.failures.lock().unwrap().get(method) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl BackendApi for MockBackend {
    async fn login(&self, request: &LoginRequest) -> Result<LoginResponse> {
        // Suspend once so concurrent callers interleave here.
        tokio::task::yield_now().await;
        self.enter("login")?;
        let mut user = self.user.lock().unwrap().clone();
        user.wallet_address = request.wallet_address.clone();
        Ok(LoginResponse {
            user,
            token: self.login_token.lock().unwrap().clone(),
        })
    }

    async fn user_info(&self, _token: &AuthToken) -> Result<UserProfile> {
        let gate = self.user_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        self.enter("user_info")?;
        Ok(self.user.lock().unwrap().clone())
    }

    async fn set_viewing_keys(&self, _token: &AuthToken, _keys: &ViewingKeysPayload) -> Result<()> {
        self.enter("set_viewing_keys")
    }

    async fn authorize_spend(&self, _token: &AuthToken) -> Result<()> {
        self.enter("authorize_spend")
    }

    async fn agent_address(&self, _token: &AuthToken) -> Result<String> {
        self.enter("agent_address")?;
        Ok(AGENT.to_string())
    }

    async fn chat_history(&self, _token: &AuthToken) -> Result<Vec<ChatMessage>> {
        self.enter("chat_history")?;
        Ok(self.history.lock().unwrap().clone())
    }

    async fn send_chat(&self, _token: &AuthToken, message: &str) -> Result<String> {
        let gate = self.chat_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        self.enter("send_chat")?;
        Ok(format!("echo: {}", message))
    }
}

// ============================================================================
// Settlement
// ============================================================================

pub struct FailingSettlement;

#[async_trait]
impl Settlement for FailingSettlement {
    async fn settle(&self) -> Result<String> {
        tokio::task::yield_now().await;
        Err(TradewindError::internal("settlement engine crashed"))
    }
}

// ============================================================================
// Harness
// ============================================================================

pub struct Harness {
    pub store: AppStateStore,
    pub wallet: Arc<MockWallet>,
    pub chain: Arc<MockChain>,
    pub backend: Arc<MockBackend>,
    pub storage: Arc<MemoryKeyValueStore>,
    pub notices: mpsc::UnboundedReceiver<Notice>,
}

impl Harness {
    pub fn new() -> Self {
        Self::build(None)
    }

    pub fn with_settlement(settlement: Arc<dyn Settlement>) -> Self {
        Self::build(Some(settlement))
    }

    fn build(settlement: Option<Arc<dyn Settlement>>) -> Self {
        let wallet = Arc::new(MockWallet::new());
        let chain = Arc::new(MockChain::new());
        let backend = Arc::new(MockBackend::new());
        let storage = Arc::new(MemoryKeyValueStore::new());
        let (tx, notices) = mpsc::unbounded_channel();

        let mut builder = AppStateStore::builder(
            Collaborators {
                wallet: wallet.clone(),
                chain: chain.clone(),
                backend: backend.clone(),
                storage: storage.clone(),
            },
            test_config(),
        )
        .notices(tx);
        if let Some(settlement) = settlement {
            builder = builder.settlement(settlement);
        }

        Self {
            store: builder.build(),
            wallet,
            chain,
            backend,
            storage,
            notices,
        }
    }

    /// Typed view of what the store persisted.
    pub fn local(&self) -> LocalStore {
        LocalStore::new(self.storage.clone())
    }

    pub fn persist_viewing_keys(&self) {
        self.local().save_viewing_keys(&viewing_keys()).unwrap();
    }

    pub fn drain_notices(&mut self) -> Vec<Notice> {
        let mut notices = Vec::new();
        while let Ok(notice) = self.notices.try_recv() {
            notices.push(notice);
        }
        notices
    }

    /// Connects and asserts the session came up without degradation.
    pub async fn connect(&self) {
        let outcome = self.store.connect_wallet().await.unwrap();
        assert!(!outcome.is_degraded(), "degraded connect: {:?}", outcome.degraded);
    }
}
