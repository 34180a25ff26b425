//! Wallet extension negotiation.

use std::sync::Arc;
use std::time::Duration;
use tradewind_core::config::ClientConfig;
use tradewind_core::wallet::{ChainDescriptor, ConnectedWallet, WalletExtension};
use tradewind_core::{Result, TradewindError};

/// Negotiates a `ConnectedWallet` from the browser wallet extension.
#[derive(Clone)]
pub struct WalletConnector {
    extension: Arc<dyn WalletExtension>,
    chain: ChainDescriptor,
    ready_timeout: Duration,
    poll_interval: Duration,
}

impl WalletConnector {
    pub fn new(extension: Arc<dyn WalletExtension>, config: &ClientConfig) -> Self {
        Self {
            extension,
            chain: config.chain_descriptor(),
            ready_timeout: config.wallet_ready_timeout(),
            poll_interval: config.wallet_poll_interval(),
        }
    }

    pub fn chain(&self) -> &ChainDescriptor {
        &self.chain
    }

    /// Fails fast when no extension is installed.
    pub fn ensure_present(&self) -> Result<()> {
        if self.extension.is_installed() {
            Ok(())
        } else {
            Err(TradewindError::wallet_unavailable(
                "wallet extension is not installed",
            ))
        }
    }

    /// Waits until the extension reports ready, for at most the configured
    /// readiness timeout.
    pub async fn wait_ready(&self) -> Result<()> {
        if self.extension.is_ready() {
            return Ok(());
        }

        let poll = async {
            loop {
                tokio::time::sleep(self.poll_interval).await;
                if self.extension.is_ready() {
                    break;
                }
            }
        };

        tokio::time::timeout(self.ready_timeout, poll)
            .await
            .map_err(|_| {
                TradewindError::wallet_unavailable(format!(
                    "wallet extension not ready after {} ms",
                    self.ready_timeout.as_millis()
                ))
            })
    }

    /// Runs the full negotiation: readiness, chain registration, enable,
    /// signer, account, and encryption utilities.
    pub async fn connect(&self) -> Result<ConnectedWallet> {
        self.ensure_present()?;
        self.wait_ready().await?;

        let chain_id = self.chain.chain_id.as_str();
        self.extension.suggest_chain(&self.chain).await?;
        self.extension.enable(chain_id).await?;

        let signer = self.extension.offline_signer(chain_id).await?;
        let account = self
            .extension
            .accounts(&signer)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| TradewindError::wallet_unavailable("wallet exposes no accounts"))?;
        let encryption = self.extension.encryption_utils(chain_id).await?;

        let wallet = ConnectedWallet::new(account.address, signer, encryption, self.chain.clone())?;
        tracing::info!("[Connect] wallet {} enabled on {}", wallet.address(), chain_id);
        Ok(wallet)
    }

    /// Signs `message` with the connected account.
    pub async fn sign(&self, wallet: &ConnectedWallet, message: &str) -> Result<String> {
        self.extension
            .sign_arbitrary(&wallet.chain().chain_id, wallet.address(), message)
            .await
    }
}
