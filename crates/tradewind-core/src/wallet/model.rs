//! Wallet connection domain model.

use crate::error::{Result, TradewindError};
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Chain metadata registered with the wallet extension.
///
/// Held as an opaque capability alongside the signer; never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainDescriptor {
    pub chain_id: String,
    pub chain_name: String,
    pub rest_endpoint: String,
    pub bech32_prefix: String,
}

impl ChainDescriptor {
    pub fn secret_network(chain_id: impl Into<String>, rest_endpoint: impl Into<String>) -> Self {
        Self {
            chain_id: chain_id.into(),
            chain_name: "secretnetwork".to_string(),
            rest_endpoint: rest_endpoint.into(),
            bech32_prefix: "secret".to_string(),
        }
    }
}

/// Type-erased handle to an object owned by the wallet extension.
///
/// Chain client implementations downcast it to the concrete signer or
/// encryption-utility type they were built against.
#[derive(Clone)]
struct OpaqueHandle(Arc<dyn Any + Send + Sync>);

impl OpaqueHandle {
    fn new<T: Any + Send + Sync>(inner: T) -> Self {
        Self(Arc::new(inner))
    }

    fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref::<T>()
    }
}

/// Transaction signer obtained from the wallet extension.
#[derive(Clone)]
pub struct SignerHandle {
    chain_id: String,
    inner: OpaqueHandle,
}

impl SignerHandle {
    pub fn new<T: Any + Send + Sync>(chain_id: impl Into<String>, signer: T) -> Self {
        Self {
            chain_id: chain_id.into(),
            inner: OpaqueHandle::new(signer),
        }
    }

    pub fn chain_id(&self) -> &str {
        &self.chain_id
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.inner.downcast_ref()
    }
}

impl fmt::Debug for SignerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignerHandle")
            .field("chain_id", &self.chain_id)
            .finish_non_exhaustive()
    }
}

/// Encryption utilities used to encrypt contract queries for the chain.
#[derive(Clone)]
pub struct EncryptionHandle {
    inner: OpaqueHandle,
}

impl EncryptionHandle {
    pub fn new<T: Any + Send + Sync>(utils: T) -> Self {
        Self {
            inner: OpaqueHandle::new(utils),
        }
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.inner.downcast_ref()
    }
}

impl fmt::Debug for EncryptionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncryptionHandle").finish_non_exhaustive()
    }
}

/// Everything obtained from a successful wallet negotiation.
///
/// The address is validated on construction, so a `ConnectedWallet` always
/// has a non-empty address and a signer.
#[derive(Debug, Clone)]
pub struct ConnectedWallet {
    address: String,
    signer: SignerHandle,
    encryption: EncryptionHandle,
    chain: ChainDescriptor,
}

impl ConnectedWallet {
    pub fn new(
        address: impl Into<String>,
        signer: SignerHandle,
        encryption: EncryptionHandle,
        chain: ChainDescriptor,
    ) -> Result<Self> {
        let address = address.into();
        if address.trim().is_empty() {
            return Err(TradewindError::validation(
                "wallet returned an empty account address",
            ));
        }
        if signer.chain_id() != chain.chain_id {
            return Err(TradewindError::validation(format!(
                "signer is bound to chain {} but {} was requested",
                signer.chain_id(),
                chain.chain_id
            )));
        }
        Ok(Self {
            address,
            signer,
            encryption,
            chain,
        })
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn signer(&self) -> &SignerHandle {
        &self.signer
    }

    pub fn encryption(&self) -> &EncryptionHandle {
        &self.encryption
    }

    pub fn chain(&self) -> &ChainDescriptor {
        &self.chain
    }
}

/// Wallet connection status.
#[derive(Debug, Clone, Default)]
pub enum WalletConnection {
    #[default]
    Disconnected,
    Connected(ConnectedWallet),
}

impl WalletConnection {
    pub fn is_connected(&self) -> bool {
        matches!(self, WalletConnection::Connected(_))
    }

    pub fn connected(&self) -> Option<&ConnectedWallet> {
        match self {
            WalletConnection::Connected(wallet) => Some(wallet),
            WalletConnection::Disconnected => None,
        }
    }

    pub fn address(&self) -> Option<&str> {
        self.connected().map(ConnectedWallet::address)
    }
}

/// Progress of the connect state machine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, strum::Display)]
pub enum ConnectPhase {
    #[default]
    Disconnected,
    Connecting,
    Authenticating,
    Connected,
}
