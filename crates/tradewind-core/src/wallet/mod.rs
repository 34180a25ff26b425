//! Wallet domain module.
//!
//! - `model`: connection variant, capability handles, connect phases
//! - `extension`: the browser wallet extension interface

mod extension;
mod model;

pub use extension::{WalletAccount, WalletExtension};
pub use model::{
    ChainDescriptor, ConnectPhase, ConnectedWallet, EncryptionHandle, SignerHandle,
    WalletConnection,
};
