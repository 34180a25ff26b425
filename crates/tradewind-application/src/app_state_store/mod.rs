//! The application state store.
//!
//! `AppStateStore` is the single entry point the presentation layer calls.
//! It owns the `AppState` and composes the wallet, session, viewing-key,
//! balance, chat and trade services into atomically applied state changes.
//!
//! - Every mutation is one closure applied to the whole state, so observers
//!   never see half of an operation.
//! - Each committed session gets a cancellation scope; disconnecting cancels
//!   work still running for it and bumps the scope generation, so late
//!   results are discarded.
//! - Duplicate concurrent invocations of the same operation are rejected by
//!   the `InFlightGuard`.

mod assets;
mod chat;
mod connect;
mod trading;

pub use connect::ConnectOutcome;

use crate::balance_fetcher::BalanceFetcher;
use crate::chat_sync::ChatSync;
use crate::in_flight::InFlightGuard;
use crate::notice::{Notice, NoticeKind, NoticeSink};
use crate::session_manager::SessionManager;
use crate::trade::{Settlement, SimulatedSettlement, TradeOrchestrator};
use crate::viewing_keys::ViewingKeyStore;
use crate::wallet_connector::WalletConnector;
use std::future::Future;
use std::sync::{Arc, Mutex};
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use tradewind_core::backend::BackendApi;
use tradewind_core::chain::ChainClient;
use tradewind_core::config::ClientConfig;
use tradewind_core::session::AuthToken;
use tradewind_core::state::AppState;
use tradewind_core::storage::KeyValueStore;
use tradewind_core::wallet::{ConnectedWallet, WalletExtension};
use tradewind_core::{Result, TradewindError};
use tradewind_infrastructure::{ConfigService, FileKeyValueStore, LocalStore, TradewindPaths};
use tradewind_interaction::HttpBackendClient;

/// External systems the store talks to.
#[derive(Clone)]
pub struct Collaborators {
    pub wallet: Arc<dyn WalletExtension>,
    pub chain: Arc<dyn ChainClient>,
    pub backend: Arc<dyn BackendApi>,
    pub storage: Arc<dyn KeyValueStore>,
}

pub struct AppStateStoreBuilder {
    collaborators: Collaborators,
    config: ClientConfig,
    settlement: Option<Arc<dyn Settlement>>,
    notices: NoticeSink,
}

impl AppStateStoreBuilder {
    /// Replaces the simulated settlement.
    pub fn settlement(mut self, settlement: Arc<dyn Settlement>) -> Self {
        self.settlement = Some(settlement);
        self
    }

    /// Emits user-visible notices on `sender`.
    pub fn notices(mut self, sender: mpsc::UnboundedSender<Notice>) -> Self {
        self.notices = NoticeSink::new(sender);
        self
    }

    pub fn build(self) -> AppStateStore {
        let Collaborators {
            wallet,
            chain,
            backend,
            storage,
        } = self.collaborators;
        let config = self.config;

        let local = LocalStore::new(storage);
        let settlement = self
            .settlement
            .unwrap_or_else(|| Arc::new(SimulatedSettlement::new(config.settlement_delay())));
        let (state, _) = watch::channel(AppState::new());

        AppStateStore {
            inner: Arc::new(Inner {
                state,
                scope: Mutex::new(SessionScope::new(0)),
                guard: InFlightGuard::new(),
                notices: self.notices,
                connector: WalletConnector::new(wallet, &config),
                sessions: SessionManager::new(backend.clone(), local.clone()),
                viewing_keys: ViewingKeyStore::new(backend.clone(), local.clone()),
                balances: BalanceFetcher::new(chain.clone()),
                chat: ChatSync::new(backend, local.clone()),
                trade: TradeOrchestrator::new(chain, settlement, &config),
                local,
            }),
        }
    }
}

/// Cancellation scope of the current (or next) session.
struct SessionScope {
    generation: u64,
    cancel: CancellationToken,
}

impl SessionScope {
    fn new(generation: u64) -> Self {
        Self {
            generation,
            cancel: CancellationToken::new(),
        }
    }
}

struct Inner {
    state: watch::Sender<AppState>,
    scope: Mutex<SessionScope>,
    guard: InFlightGuard,
    notices: NoticeSink,
    connector: WalletConnector,
    sessions: SessionManager,
    viewing_keys: ViewingKeyStore,
    balances: BalanceFetcher,
    chat: ChatSync,
    trade: TradeOrchestrator,
    local: LocalStore,
}

/// What a session-bound operation needs, captured in one consistent read.
struct SessionContext {
    id: u64,
    token: AuthToken,
    wallet: Option<ConnectedWallet>,
    has_user: bool,
    cancel: CancellationToken,
}

impl SessionContext {
    fn require_wallet(&self) -> Result<&ConnectedWallet> {
        self.wallet
            .as_ref()
            .ok_or_else(|| TradewindError::validation("wallet is not connected"))
    }
}

/// Cheaply clonable handle to the shared store.
#[derive(Clone)]
pub struct AppStateStore {
    inner: Arc<Inner>,
}

impl AppStateStore {
    pub fn builder(collaborators: Collaborators, config: ClientConfig) -> AppStateStoreBuilder {
        AppStateStoreBuilder {
            collaborators,
            config,
            settlement: None,
            notices: NoticeSink::disabled(),
        }
    }

    pub fn new(collaborators: Collaborators, config: ClientConfig) -> Self {
        Self::builder(collaborators, config).build()
    }

    /// Wires the HTTP backend and the file-backed local store under `paths`,
    /// configured from `config.toml` and the environment.
    pub fn open(
        wallet: Arc<dyn WalletExtension>,
        chain: Arc<dyn ChainClient>,
        paths: &TradewindPaths,
    ) -> Result<Self> {
        let config = ConfigService::new(paths).get_config()?;
        let backend = HttpBackendClient::from_config(&config)?;
        tracing::info!("[Store] Backend at {}", config.backend_url);

        Ok(Self::new(
            Collaborators {
                wallet,
                chain,
                backend: Arc::new(backend),
                storage: Arc::new(FileKeyValueStore::open(paths)),
            },
            config,
        ))
    }

    // ============================================================================
    // Observation
    // ============================================================================

    /// Receiver that observes every whole-state transition.
    pub fn subscribe(&self) -> watch::Receiver<AppState> {
        self.inner.state.subscribe()
    }

    pub fn snapshot(&self) -> AppState {
        self.inner.state.borrow().clone()
    }

    // ============================================================================
    // Plain state setters
    // ============================================================================

    /// Presentation-driven busy flag.
    pub fn set_loading(&self, loading: bool) {
        self.update(|state| state.is_loading = loading);
    }

    // ============================================================================
    // Internal helpers
    // ============================================================================

    fn update(&self, f: impl FnOnce(&mut AppState)) {
        self.inner.state.send_modify(f);
    }

    /// Applies `f` only while session `id` is still current.
    fn update_session(&self, id: u64, f: impl FnOnce(&mut AppState)) -> bool {
        self.inner.state.send_if_modified(|state| {
            if state.session_id() == Some(id) {
                f(state);
                true
            } else {
                false
            }
        })
    }

    fn read<T>(&self, f: impl FnOnce(&AppState) -> T) -> T {
        f(&self.inner.state.borrow())
    }

    fn lock_scope(&self) -> Result<std::sync::MutexGuard<'_, SessionScope>> {
        self.inner
            .scope
            .lock()
            .map_err(|_| TradewindError::internal("session scope lock poisoned"))
    }

    /// The current session, or a `Validation` error naming `operation`.
    fn session_context(&self, operation: &str) -> Result<SessionContext> {
        let scope = self.lock_scope()?;
        self.read(|state| {
            let session = state.session.as_ref().ok_or_else(|| {
                TradewindError::validation(format!("{} requires an authenticated session", operation))
            })?;
            Ok(SessionContext {
                id: session.id(),
                token: session.token().clone(),
                wallet: state.connected_wallet().cloned(),
                has_user: session.user.is_some(),
                cancel: scope.cancel.clone(),
            })
        })
    }

    /// Cancels the current scope and opens the next one; `reset` runs while
    /// the scope is held so no commit can interleave.
    fn end_scope(&self, reset: impl FnOnce(&mut AppState)) {
        let mut scope = match self.inner.scope.lock() {
            Ok(scope) => scope,
            Err(poisoned) => poisoned.into_inner(),
        };
        scope.cancel.cancel();
        *scope = SessionScope::new(scope.generation + 1);
        self.update(reset);
    }

    /// Drops the session after the backend rejected its token.
    fn expire_on_auth<T>(&self, result: Result<T>) -> Result<T> {
        if let Err(TradewindError::AuthExpired) = &result {
            tracing::warn!("[Session] Token rejected by backend, ending session");
            self.end_scope(|state| {
                state.reset_connection();
                state.is_loading = false;
            });
            self.inner.sessions.logout();
            self.notify(Notice::new(NoticeKind::SessionExpired, "Session expired. Logging out."));
        }
        result
    }

    fn notify(&self, notice: Notice) {
        self.inner.notices.emit(notice);
    }
}

/// Runs `fut` unless `cancel` fires first.
async fn scoped<T, F>(cancel: &CancellationToken, operation: impl ToString, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(TradewindError::cancelled(operation)),
        result = fut => result,
    }
}
