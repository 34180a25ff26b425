//! Client configuration model.

use crate::wallet::ChainDescriptor;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root configuration, read from `config.toml`.
///
/// Every field has a default so a partial file (or none) is valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL of the backend service
    pub backend_url: String,
    /// Timeout applied to every backend request
    pub request_timeout_ms: u64,
    /// Chain id passed to the wallet extension
    pub chain_id: String,
    /// REST endpoint of the chain, registered with the extension
    pub lcd_url: String,
    /// Upper bound on waiting for the extension to become ready
    pub wallet_ready_timeout_ms: u64,
    /// Poll interval while waiting for the extension
    pub wallet_poll_interval_ms: u64,
    /// Fixed latency of the settlement simulation
    pub settlement_delay_ms: u64,
    /// Raw amount granted to the agent per asset
    pub allowance_amount: String,
    /// Gas limit for each allowance grant
    pub allowance_gas_limit: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            backend_url: "http://localhost:8000".to_string(),
            request_timeout_ms: 30_000,
            chain_id: "secret-4".to_string(),
            lcd_url: "https://rpc.ankr.com/http/scrt_cosmos".to_string(),
            wallet_ready_timeout_ms: 5_000,
            wallet_poll_interval_ms: 50,
            settlement_delay_ms: 3_000,
            allowance_amount: "8000000".to_string(),
            allowance_gas_limit: 5_000_000,
        }
    }
}

impl ClientConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn wallet_ready_timeout(&self) -> Duration {
        Duration::from_millis(self.wallet_ready_timeout_ms)
    }

    pub fn wallet_poll_interval(&self) -> Duration {
        Duration::from_millis(self.wallet_poll_interval_ms.max(1))
    }

    pub fn settlement_delay(&self) -> Duration {
        Duration::from_millis(self.settlement_delay_ms)
    }

    pub fn chain_descriptor(&self) -> ChainDescriptor {
        ChainDescriptor::secret_network(&self.chain_id, &self.lcd_url)
    }
}
