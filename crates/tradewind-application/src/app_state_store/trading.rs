//! Simulated trade.

use super::{AppStateStore, scoped};
use crate::in_flight::Operation;
use crate::notice::{Notice, NoticeKind};
use tradewind_core::{Result, TradewindError};

/// Clears `is_trading` and `is_loading` when dropped unless disarmed.
struct TradingFlags<'a> {
    store: &'a AppStateStore,
    armed: bool,
}

impl TradingFlags<'_> {
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for TradingFlags<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.store.update(|state| {
                state.trade.is_trading = false;
                state.is_loading = false;
            });
        }
    }
}

impl AppStateStore {
    /// Records whether the user has been convinced to trade.
    pub fn set_convinced(&self, convinced: bool) {
        self.update(|state| state.trade.is_convinced = convinced);
    }

    /// Runs the settlement and records its summary.
    ///
    /// `is_trading` and `is_loading` are cleared whatever the outcome. On
    /// success a balance refresh is started in the background; its result
    /// does not affect the trade's.
    pub async fn start_trading(&self) -> Result<String> {
        let op = Operation::StartTrading;
        let _permit = self.inner.guard.try_acquire(op)?;
        let ctx = self.session_context("start_trading")?;
        ctx.require_wallet()?;

        self.update(|state| {
            state.trade.is_trading = true;
            state.is_loading = true;
        });
        let flags = TradingFlags {
            store: self,
            armed: true,
        };

        let summary = match scoped(&ctx.cancel, op, self.inner.trade.settle()).await {
            Ok(summary) => summary,
            Err(e) => {
                drop(flags);
                tracing::error!("[Trade] Settlement failed: {}", e);
                if !e.is_cancelled() {
                    self.notify(Notice::new(NoticeKind::TradeFailed, e.to_string()));
                }
                return Err(e);
            }
        };

        let committed = self.update_session(ctx.id, |state| {
            state.trade.is_trading = false;
            state.trade.last_trade_result = Some(summary.clone());
            state.is_loading = false;
        });
        if !committed {
            drop(flags);
            return Err(TradewindError::cancelled(op));
        }
        flags.disarm();
        tracing::info!("[Trade] {}", summary);

        self.spawn_balance_refresh();
        Ok(summary)
    }

    fn spawn_balance_refresh(&self) {
        let store = self.clone();
        tokio::spawn(async move {
            if let Err(e) = store.fetch_balances().await {
                tracing::warn!("[Trade] Post-trade balance refresh failed: {}", e);
            }
        });
    }
}
