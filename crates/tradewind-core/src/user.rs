//! UserProfile domain model.
//!
//! Mirrors the record the backend keeps per wallet: the wallet address the
//! profile is bound to, the viewing keys the backend has on file, and whether
//! the agent's spend allowances were confirmed on-chain.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// User profile as returned by `/api/user/info` and the login handshake.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Wallet address the profile belongs to
    pub wallet_address: String,
    /// sSCRT viewing key recorded by the backend
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sscrt_key: Option<String>,
    /// sUSDC viewing key recorded by the backend
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub susdc_key: Option<String>,
    /// Agent allowance on sSCRT confirmed by the backend
    #[serde(default)]
    pub sscrt_allowed: bool,
    /// Agent allowance on sUSDC confirmed by the backend
    #[serde(default)]
    pub susdc_allowed: bool,
    /// Fields this client does not interpret
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UserProfile {
    pub fn new(wallet_address: impl Into<String>) -> Self {
        Self {
            wallet_address: wallet_address.into(),
            ..Self::default()
        }
    }

    /// True when the backend has confirmed allowances for every asset.
    pub fn is_spend_authorized(&self) -> bool {
        self.sscrt_allowed && self.susdc_allowed
    }

    pub fn has_viewing_keys(&self) -> bool {
        self.sscrt_key.as_deref().is_some_and(|k| !k.is_empty())
            && self.susdc_key.as_deref().is_some_and(|k| !k.is_empty())
    }
}
