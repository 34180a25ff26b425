//! Connect state machine, session teardown, and profile fetches.

use super::{AppStateStore, scoped};
use crate::in_flight::Operation;
use crate::notice::Notice;
use tokio_util::sync::CancellationToken;
use tradewind_core::session::Session;
use tradewind_core::user::UserProfile;
use tradewind_core::wallet::ConnectPhase;
use tradewind_core::{Result, TradewindError};

/// Result of a successful `connect_wallet`.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectOutcome {
    pub address: String,
    pub session_id: u64,
    /// A wallet was already connected; nothing was done.
    pub already_connected: bool,
    /// The persisted token was reused instead of logging in again.
    pub resumed_token: bool,
    /// Post-connect fetches that failed. The session stands regardless.
    pub degraded: Vec<(Operation, TradewindError)>,
}

impl ConnectOutcome {
    pub fn is_degraded(&self) -> bool {
        !self.degraded.is_empty()
    }
}

struct Established {
    session_id: u64,
    address: String,
    resumed_token: bool,
}

impl AppStateStore {
    /// Connects the wallet and establishes an authenticated session.
    ///
    /// Failure before the session is committed rolls everything back and
    /// emits a notice. Failures of the post-connect fetches (profile, agent
    /// address) only show up in `ConnectOutcome::degraded`. If the session is
    /// disconnected before setup finishes the result is `Cancelled` and the
    /// auto-connect flag is left as the disconnect set it.
    pub async fn connect_wallet(&self) -> Result<ConnectOutcome> {
        let _permit = self.inner.guard.try_acquire(Operation::ConnectWallet)?;

        let connected = self.read(|state| {
            state
                .connected_wallet()
                .map(|wallet| (wallet.address().to_string(), state.session_id()))
        });
        if let Some((address, Some(session_id))) = connected {
            tracing::debug!("[Connect] {} already connected", address);
            return Ok(ConnectOutcome {
                address,
                session_id,
                already_connected: true,
                resumed_token: false,
                degraded: Vec::new(),
            });
        }
        self.inner.connector.ensure_present()?;

        let (generation, cancel) = {
            let scope = self.lock_scope()?;
            (scope.generation, scope.cancel.clone())
        };

        self.update(|state| {
            state.is_loading = true;
            state.phase = ConnectPhase::Connecting;
        });

        let established = match self.establish(generation, &cancel).await {
            Ok(established) => established,
            Err(e) => {
                tracing::error!("[Connect] Failed: {}", e);
                self.rollback();
                if !e.is_cancelled() {
                    self.notify(Notice::connect_failed(&e));
                }
                return Err(e);
            }
        };

        // Best-effort dependent initialisation; the session stands either way.
        self.load_viewing_keys();
        let (user, agent) = tokio::join!(self.fetch_user_inner(), self.fetch_agent_address_inner());
        let mut degraded = Vec::new();
        if let Err(e) = user {
            tracing::warn!("[Connect] Profile fetch failed: {}", e);
            degraded.push((Operation::FetchUser, e));
        }
        if let Err(e) = agent {
            tracing::warn!("[Connect] Agent address fetch failed: {}", e);
            degraded.push((Operation::FetchAgentAddress, e));
        }

        // Held while the flag is written so a disconnect clears it afterwards.
        let scope = self.lock_scope()?;
        if scope.generation != established.session_id {
            drop(scope);
            self.update(|state| state.is_loading = false);
            tracing::info!("[Connect] Session {} ended during setup", established.session_id);
            return Err(TradewindError::cancelled(Operation::ConnectWallet));
        }
        if let Err(e) = self.inner.local.set_auto_connect(true) {
            tracing::warn!("[Connect] Failed to persist auto-connect flag: {}", e);
        }
        drop(scope);
        self.update(|state| state.is_loading = false);

        tracing::info!(
            "[Connect] Connected {} (session {}, {} degraded)",
            established.address,
            established.session_id,
            degraded.len()
        );
        Ok(ConnectOutcome {
            address: established.address,
            session_id: established.session_id,
            already_connected: false,
            resumed_token: established.resumed_token,
            degraded,
        })
    }

    /// Wallet negotiation, token check or login, and the atomic commit.
    async fn establish(&self, generation: u64, cancel: &CancellationToken) -> Result<Established> {
        let op = Operation::ConnectWallet;
        let wallet = scoped(cancel, op, self.inner.connector.connect()).await?;

        self.update(|state| state.phase = ConnectPhase::Authenticating);

        let (token, user, resumed_token) = match self.inner.sessions.restore_token(wallet.address()) {
            Some(token) => (token, None, true),
            None => {
                let (token, user) = scoped(
                    cancel,
                    op,
                    self.inner.sessions.login(&self.inner.connector, &wallet),
                )
                .await?;
                (token, Some(user), false)
            }
        };

        let address = wallet.address().to_string();
        let scope = self.lock_scope()?;
        if scope.generation != generation {
            return Err(TradewindError::cancelled(op));
        }
        let session = Session::new(generation, token, user);
        self.update(|state| state.commit_connection(wallet, session));
        drop(scope);

        Ok(Established {
            session_id: generation,
            address,
            resumed_token,
        })
    }

    /// Undoes a failed connect: nothing of it stays observable.
    fn rollback(&self) {
        self.end_scope(|state| {
            state.reset_connection();
            state.is_loading = false;
        });
        self.inner.sessions.logout();
    }

    /// Resets wallet, session, balance and trade state and forgets the
    /// persisted token. Callable in any state.
    ///
    /// Work still running for the old session is cancelled. Viewing keys
    /// and the chat transcript are kept.
    pub fn disconnect_wallet(&self) {
        self.end_scope(|state| state.reset_connection());
        self.inner.sessions.logout();
        if let Err(e) = self.inner.local.set_auto_connect(false) {
            tracing::warn!("[Connect] Failed to clear auto-connect flag: {}", e);
        }
        tracing::info!("[Connect] Disconnected");
    }

    /// Whether the user asked to be reconnected automatically.
    pub fn get_auto_connect(&self) -> bool {
        self.inner.local.auto_connect().unwrap_or_else(|e| {
            tracing::warn!("[Connect] Unreadable auto-connect flag: {}", e);
            false
        })
    }

    /// Reconnects if the auto-connect flag is set; `Ok(None)` otherwise.
    pub async fn resume(&self) -> Result<Option<ConnectOutcome>> {
        if !self.get_auto_connect() {
            return Ok(None);
        }
        self.connect_wallet().await.map(Some)
    }

    /// Refreshes the user profile of the current session.
    pub async fn fetch_user(&self) -> Result<UserProfile> {
        let result = self.fetch_user_inner().await;
        self.expire_on_auth(result)
    }

    async fn fetch_user_inner(&self) -> Result<UserProfile> {
        let op = Operation::FetchUser;
        let _permit = self.inner.guard.try_acquire(op)?;
        let ctx = self.session_context("fetch_user")?;

        let user = scoped(&ctx.cancel, op, self.inner.sessions.fetch_user(&ctx.token)).await?;

        let committed = self.update_session(ctx.id, |state| {
            if let Some(session) = state.session.as_mut() {
                session.user = Some(user.clone());
            }
        });
        if !committed {
            return Err(TradewindError::cancelled(op));
        }
        Ok(user)
    }

    /// Fetches the agent address delegated to the current session.
    pub async fn fetch_agent_address(&self) -> Result<String> {
        let result = self.fetch_agent_address_inner().await;
        self.expire_on_auth(result)
    }

    async fn fetch_agent_address_inner(&self) -> Result<String> {
        let op = Operation::FetchAgentAddress;
        let _permit = self.inner.guard.try_acquire(op)?;
        let ctx = self.session_context("fetch_agent_address")?;
        ctx.require_wallet()?;

        let address = scoped(
            &ctx.cancel,
            op,
            self.inner.sessions.fetch_agent_address(&ctx.token),
        )
        .await?;

        if !self.update_session(ctx.id, |state| state.agent_address = Some(address.clone())) {
            return Err(TradewindError::cancelled(op));
        }
        Ok(address)
    }
}
