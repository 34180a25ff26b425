//! Per-operation in-flight guard.
//!
//! At most one invocation of each `Operation` runs at a time; a duplicate is
//! rejected with `TradewindError::Busy` instead of racing the first one.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use strum::{Display, EnumIter};
use tradewind_core::{Result, TradewindError};

/// High-level operations that are deduplicated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum Operation {
    ConnectWallet,
    FetchBalances,
    AuthorizeSpend,
    SetViewingKeys,
    LoadMessages,
    StartTrading,
    FetchUser,
    FetchAgentAddress,
}

#[derive(Debug, Clone, Default)]
pub struct InFlightGuard {
    active: Arc<Mutex<HashSet<Operation>>>,
}

impl InFlightGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims `operation`; the claim is released when the permit drops.
    pub fn try_acquire(&self, operation: Operation) -> Result<InFlightPermit> {
        let mut active = self
            .active
            .lock()
            .map_err(|_| TradewindError::internal("in-flight registry lock poisoned"))?;
        if !active.insert(operation) {
            tracing::debug!("[InFlight] rejected duplicate {}", operation);
            return Err(TradewindError::busy(operation));
        }
        Ok(InFlightPermit {
            operation,
            active: Arc::clone(&self.active),
        })
    }

    pub fn is_in_flight(&self, operation: Operation) -> bool {
        self.active
            .lock()
            .map(|active| active.contains(&operation))
            .unwrap_or(false)
    }
}

/// Proof that an operation is registered as running.
#[derive(Debug)]
pub struct InFlightPermit {
    operation: Operation,
    active: Arc<Mutex<HashSet<Operation>>>,
}

impl InFlightPermit {
    pub fn operation(&self) -> Operation {
        self.operation
    }
}

impl Drop for InFlightPermit {
    fn drop(&mut self) {
        // Release even if another thread panicked while holding the lock.
        let mut active = match self.active.lock() {
            Ok(active) => active,
            Err(poisoned) => poisoned.into_inner(),
        };
        active.remove(&self.operation);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_duplicate_is_busy() {
        let guard = InFlightGuard::new();
        let permit = guard.try_acquire(Operation::ConnectWallet).unwrap();

        let err = guard.try_acquire(Operation::ConnectWallet).unwrap_err();
        assert!(err.is_busy());
        assert_eq!(err.to_string(), "Operation already in progress: connect_wallet");

        drop(permit);
        assert!(guard.try_acquire(Operation::ConnectWallet).is_ok());
    }

    #[test]
    fn test_distinct_operations_do_not_block_each_other() {
        let guard = InFlightGuard::new();
        let _permits: Vec<_> = Operation::iter()
            .map(|op| guard.try_acquire(op).unwrap())
            .collect();
        assert!(Operation::iter().all(|op| guard.is_in_flight(op)));
    }

    #[test]
    fn test_clones_share_registry() {
        let guard = InFlightGuard::new();
        let other = guard.clone();
        let permit = guard.try_acquire(Operation::StartTrading).unwrap();
        assert_eq!(permit.operation(), Operation::StartTrading);
        assert!(other.try_acquire(Operation::StartTrading).is_err());
    }
}
