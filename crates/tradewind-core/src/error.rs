//! Error types for the Tradewind client.

use crate::asset::TrackedAsset;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A shared error type for the entire Tradewind client.
///
/// Every operation of the orchestration layer returns this type. The first
/// group of variants is the failure taxonomy callers are expected to branch
/// on; the second group covers the ambient plumbing (storage, config, ...).
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TradewindError {
    /// Wallet extension missing or not ready within the readiness timeout
    #[error("Wallet unavailable: {reason}")]
    WalletUnavailable { reason: String },

    /// The session token expired or was rejected by the backend
    #[error("Authentication expired")]
    AuthExpired,

    /// Login challenge rejected or malformed login response
    #[error("Authentication failed: {0}")]
    AuthFailure(String),

    /// A backend endpoint failed (transport, timeout, or non-success status)
    #[error("Network failure on {endpoint}: {message}")]
    Network { endpoint: String, message: String },

    /// Viewing keys are required but were never loaded or set
    #[error("Viewing key missing{}", asset_suffix(.asset))]
    ViewingKeyMissing { asset: Option<TrackedAsset> },

    /// Some allowance grants succeeded before one failed; nothing is rolled back
    #[error("Partial authorization: granted {granted:?}, failed on {failed}: {message}")]
    PartialAuthorization {
        granted: Vec<TrackedAsset>,
        failed: TrackedAsset,
        message: String,
    },

    /// A required precondition (token, address, connection) is missing
    #[error("Validation failed: {0}")]
    Validation(String),

    // ========================================================================
    // Ambient variants
    // ========================================================================
    /// A duplicate invocation of an operation that is already in flight
    #[error("Operation already in progress: {operation}")]
    Busy { operation: String },

    /// The session scope ended (disconnect) while the operation was running
    #[error("Operation cancelled: {operation}")]
    Cancelled { operation: String },

    /// Chain query or transaction failure
    #[error("Chain error: {message}")]
    Chain { message: String },

    /// Local persistence failure
    #[error("Storage error: {0}")]
    Storage(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization { format: String, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

fn asset_suffix(asset: &Option<TrackedAsset>) -> String {
    match asset {
        Some(asset) => format!(" for {}", asset),
        None => String::new(),
    }
}

impl TradewindError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    pub fn wallet_unavailable(reason: impl Into<String>) -> Self {
        Self::WalletUnavailable {
            reason: reason.into(),
        }
    }

    pub fn auth_failure(message: impl Into<String>) -> Self {
        Self::AuthFailure(message.into())
    }

    /// Creates a Network error tagged with the endpoint that failed
    pub fn network(endpoint: impl ToString, message: impl Into<String>) -> Self {
        Self::Network {
            endpoint: endpoint.to_string(),
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn busy(operation: impl ToString) -> Self {
        Self::Busy {
            operation: operation.to_string(),
        }
    }

    pub fn cancelled(operation: impl ToString) -> Self {
        Self::Cancelled {
            operation: operation.to_string(),
        }
    }

    pub fn chain(message: impl Into<String>) -> Self {
        Self::Chain {
            message: message.into(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage(message.into())
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    pub fn is_wallet_unavailable(&self) -> bool {
        matches!(self, Self::WalletUnavailable { .. })
    }

    /// True for failures that mean the session itself is no longer valid.
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::AuthExpired | Self::AuthFailure(_))
    }

    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network { .. })
    }

    pub fn is_busy(&self) -> bool {
        matches!(self, Self::Busy { .. })
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }

    pub fn is_partial_authorization(&self) -> bool {
        matches!(self, Self::PartialAuthorization { .. })
    }

    /// Returns the endpoint of a Network error.
    pub fn endpoint(&self) -> Option<&str> {
        match self {
            Self::Network { endpoint, .. } => Some(endpoint),
            _ => None,
        }
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for TradewindError {
    fn from(err: std::io::Error) -> Self {
        Self::Storage(format!("{} (kind: {:?})", err, err.kind()))
    }
}

impl From<serde_json::Error> for TradewindError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for TradewindError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for TradewindError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<anyhow::Error> for TradewindError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// A type alias for `Result<T, TradewindError>`.
pub type Result<T> = std::result::Result<T, TradewindError>;
