//! Wallet extension capability interface.

use super::model::{ChainDescriptor, EncryptionHandle, SignerHandle};
use crate::error::Result;
use async_trait::async_trait;

/// An account exposed by the extension's signer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalletAccount {
    pub address: String,
}

/// The browser wallet extension, seen as a set of capabilities.
///
/// Implementations bridge to the real extension; the orchestration layer
/// only sequences these calls and never inspects the handles it receives.
#[async_trait]
pub trait WalletExtension: Send + Sync {
    /// Whether the extension is installed at all.
    fn is_installed(&self) -> bool;

    /// Whether the extension has finished injecting its signer and
    /// encryption-utility entry points.
    fn is_ready(&self) -> bool;

    /// Registers the chain with the extension.
    async fn suggest_chain(&self, chain: &ChainDescriptor) -> Result<()>;

    /// Asks the user to enable the chain for this site.
    async fn enable(&self, chain_id: &str) -> Result<()>;

    /// Returns the amino-only offline signer for the chain.
    async fn offline_signer(&self, chain_id: &str) -> Result<SignerHandle>;

    /// Lists the accounts controlled by `signer`.
    async fn accounts(&self, signer: &SignerHandle) -> Result<Vec<WalletAccount>>;

    /// Returns the extension's encryption utilities for the chain.
    async fn encryption_utils(&self, chain_id: &str) -> Result<EncryptionHandle>;

    /// Signs arbitrary text with the account key; returns the encoded signature.
    async fn sign_arbitrary(&self, chain_id: &str, signer_address: &str, data: &str)
    -> Result<String>;
}
