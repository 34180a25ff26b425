//! Viewing keys, balances and spend authorization.

use super::{AppStateStore, scoped};
use crate::in_flight::Operation;
use crate::notice::{Notice, NoticeKind};
use tradewind_core::balance::Balance;
use tradewind_core::viewing_key::ViewingKeys;
use tradewind_core::{Result, TradewindError};

impl AppStateStore {
    /// Loads persisted viewing keys into state. Absent keys are not an error
    /// and leave the current value untouched.
    pub fn load_viewing_keys(&self) -> bool {
        match self.inner.viewing_keys.load() {
            Some(keys) => {
                self.update(|state| state.viewing_keys = Some(keys));
                true
            }
            None => {
                tracing::debug!("[ViewingKeys] Nothing persisted");
                false
            }
        }
    }

    /// Registers new viewing keys with the backend, then persists them and
    /// puts them in state.
    ///
    /// On failure nothing local changes.
    pub async fn set_viewing_keys(&self, keys: ViewingKeys) -> Result<()> {
        let op = Operation::SetViewingKeys;
        let _permit = self.inner.guard.try_acquire(op)?;
        let ctx = self.session_context("set_viewing_keys")?;
        keys.ensure_complete()?;

        let result = scoped(&ctx.cancel, op, self.inner.viewing_keys.set(&ctx.token, &keys)).await;
        if let Err(e) = result {
            tracing::error!("[ViewingKeys] Failed to set keys: {}", e);
            if !e.is_cancelled() {
                self.notify(Notice::new(
                    NoticeKind::ViewingKeysRejected,
                    "Failed to set viewing keys",
                ));
            }
            return self.expire_on_auth(Err(e));
        }

        self.update(|state| state.viewing_keys = Some(keys));
        Ok(())
    }

    /// Replaces the whole balance mapping.
    pub fn update_balances(&self, balance: Balance) {
        self.update(|state| state.balance = balance);
    }

    /// Re-queries every tracked asset and replaces the balance mapping.
    ///
    /// Without a connected wallet or viewing keys this is a no-op and no
    /// query is sent.
    pub async fn fetch_balances(&self) -> Result<()> {
        let op = Operation::FetchBalances;
        let _permit = self.inner.guard.try_acquire(op)?;

        let target = self.read(|state| {
            match (state.connected_wallet(), state.viewing_keys.as_ref(), state.session_id()) {
                (Some(wallet), Some(keys), Some(id)) => Some((wallet.clone(), keys.clone(), id)),
                _ => None,
            }
        });
        let Some((wallet, keys, session_id)) = target else {
            tracing::debug!("[Balance] Skipping fetch: not connected or no viewing keys");
            return Ok(());
        };

        let cancel = self.lock_scope()?.cancel.clone();
        let balance = scoped(&cancel, op, async {
            Ok(self.inner.balances.fetch(&wallet, &keys).await)
        })
        .await?;

        if balance.has_errors() {
            tracing::warn!("[Balance] Fetched with per-asset errors");
        }
        if !self.update_session(session_id, |state| state.balance = balance) {
            return Err(TradewindError::cancelled(op));
        }
        Ok(())
    }

    /// Grants the agent an allowance on every tracked asset, then confirms
    /// with the backend.
    ///
    /// Grants are not rolled back. If one succeeded before another failed,
    /// the error is `PartialAuthorization`, the backend is not called and the
    /// caller has to retry.
    pub async fn authorize_spend(&self) -> Result<()> {
        let op = Operation::AuthorizeSpend;
        let _permit = self.inner.guard.try_acquire(op)?;
        let ctx = self.session_context("authorize_spend")?;
        let wallet = ctx.require_wallet()?.clone();
        let agent = self
            .read(|state| state.agent_address.clone())
            .ok_or_else(|| TradewindError::validation("agent address is not known yet"))?;

        let granted = scoped(
            &ctx.cancel,
            op,
            self.inner.trade.grant_allowances(&wallet, &agent),
        )
        .await;
        if let Err(e) = granted {
            if e.is_partial_authorization() {
                self.notify(Notice::new(NoticeKind::PartialAuthorization, e.to_string()));
            }
            return Err(e);
        }

        let confirmed = scoped(
            &ctx.cancel,
            op,
            self.inner.sessions.confirm_spend_authorization(&ctx.token),
        )
        .await;
        self.expire_on_auth(confirmed)?;

        if !self.update_session(ctx.id, |state| state.trade.spend_authorized = true) {
            return Err(TradewindError::cancelled(op));
        }
        tracing::info!("[Authorize] Spend authorized for agent {}", agent);

        // Pick up the backend's allowance flags.
        if let Err(e) = self.fetch_user().await {
            tracing::warn!("[Authorize] Profile refresh failed: {}", e);
        }
        Ok(())
    }
}
