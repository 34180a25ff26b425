//! Spend authorization and the simulated trade.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tradewind_core::asset::TrackedAsset;
use tradewind_core::chain::{ChainClient, TxReceipt, increase_allowance};
use tradewind_core::config::ClientConfig;
use tradewind_core::trade::SIMULATED_TRADE_SUMMARY;
use tradewind_core::wallet::ConnectedWallet;
use tradewind_core::{Result, TradewindError};

/// Executes a trade and reports a summary.
#[async_trait]
pub trait Settlement: Send + Sync {
    async fn settle(&self) -> Result<String>;
}

/// Fixed-latency stand-in for on-chain settlement.
#[derive(Debug, Clone)]
pub struct SimulatedSettlement {
    delay: Duration,
}

impl SimulatedSettlement {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl Settlement for SimulatedSettlement {
    async fn settle(&self) -> Result<String> {
        tokio::time::sleep(self.delay).await;
        Ok(SIMULATED_TRADE_SUMMARY.to_string())
    }
}

#[derive(Clone)]
pub struct TradeOrchestrator {
    chain: Arc<dyn ChainClient>,
    settlement: Arc<dyn Settlement>,
    allowance_amount: String,
    allowance_gas_limit: u64,
}

impl TradeOrchestrator {
    pub fn new(
        chain: Arc<dyn ChainClient>,
        settlement: Arc<dyn Settlement>,
        config: &ClientConfig,
    ) -> Self {
        Self {
            chain,
            settlement,
            allowance_amount: config.allowance_amount.clone(),
            allowance_gas_limit: config.allowance_gas_limit,
        }
    }

    /// Grants `agent` an allowance on every tracked asset, in order.
    ///
    /// Grants are not rolled back. A failure after at least one success is
    /// reported as `PartialAuthorization`; a failure on the first grant is
    /// returned as is.
    pub async fn grant_allowances(
        &self,
        wallet: &ConnectedWallet,
        agent: &str,
    ) -> Result<Vec<TxReceipt>> {
        let mut receipts = Vec::new();
        let mut granted = Vec::new();

        for asset in TrackedAsset::all() {
            let execution = increase_allowance(
                asset,
                wallet.address(),
                agent,
                &self.allowance_amount,
                self.allowance_gas_limit,
            );
            match self.chain.execute_contract(wallet, &execution).await {
                Ok(receipt) => {
                    tracing::info!("[Authorize] {} allowance granted ({})", asset, receipt.tx_hash);
                    granted.push(asset);
                    receipts.push(receipt);
                }
                Err(e) if granted.is_empty() => return Err(e),
                Err(e) => {
                    tracing::error!(
                        "[Authorize] {} allowance failed after {:?} succeeded: {}",
                        asset,
                        granted,
                        e
                    );
                    return Err(TradewindError::PartialAuthorization {
                        granted,
                        failed: asset,
                        message: e.to_string(),
                    });
                }
            }
        }

        Ok(receipts)
    }

    pub async fn settle(&self) -> Result<String> {
        self.settlement.settle().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;
    use std::sync::Mutex;
    use tradewind_core::chain::{ContractExecution, ContractQuery};
    use tradewind_core::wallet::{ChainDescriptor, EncryptionHandle, SignerHandle};

    /// Fails the execution at `fail_at` (0-based), succeeds otherwise.
    struct ScriptedChain {
        fail_at: Option<usize>,
        executions: Mutex<Vec<ContractExecution>>,
    }

    #[async_trait]
    impl ChainClient for ScriptedChain {
        async fn query_contract(&self, _: &ConnectedWallet, _: &ContractQuery) -> Result<Value> {
            Err(TradewindError::chain("not supported"))
        }

        async fn execute_contract(&self, _: &ConnectedWallet, execution: &ContractExecution) -> Result<TxReceipt> {
            let mut executions = self.executions.lock().unwrap();
            let index = executions.len();
            executions.push(execution.clone());
            if self.fail_at == Some(index) {
                return Err(TradewindError::chain("out of gas"));
            }
            Ok(TxReceipt {
                tx_hash: format!("hash{}", index),
            })
        }
    }

    fn orchestrator(fail_at: Option<usize>) -> (TradeOrchestrator, Arc<ScriptedChain>) {
        let chain = Arc::new(ScriptedChain {
            fail_at,
            executions: Mutex::new(Vec::new()),
        });
        let settlement = Arc::new(SimulatedSettlement::new(Duration::from_millis(3_000)));
        (
            TradeOrchestrator::new(chain.clone(), settlement, &ClientConfig::default()),
            chain,
        )
    }

    fn wallet() -> ConnectedWallet {
        ConnectedWallet::new(
            "secret1user",
            SignerHandle::new("secret-4", ()),
            EncryptionHandle::new(()),
            ChainDescriptor::secret_network("secret-4", "https://lcd.example"),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_grants_every_asset_in_order() {
        let (orchestrator, chain) = orchestrator(None);
        let receipts = orchestrator.grant_allowances(&wallet(), "secret1abc").await.unwrap();
        assert_eq!(receipts.len(), 2);

        let executions = chain.executions.lock().unwrap();
        assert_eq!(executions[0].contract_address, TrackedAsset::SScrt.contract_address());
        assert_eq!(executions[1].contract_address, TrackedAsset::SUsdc.contract_address());
        assert!(executions.iter().all(|e| e.gas_limit == 5_000_000));
        assert!(executions.iter().all(|e| e.msg["increase_allowance"]["amount"] == "8000000"));
    }

    #[tokio::test]
    async fn test_second_grant_failure_is_partial() {
        let (orchestrator, _) = orchestrator(Some(1));
        let err = orchestrator.grant_allowances(&wallet(), "secret1abc").await.unwrap_err();
        assert_eq!(
            err,
            TradewindError::PartialAuthorization {
                granted: vec![TrackedAsset::SScrt],
                failed: TrackedAsset::SUsdc,
                message: "Chain error: out of gas".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_first_grant_failure_stops_immediately() {
        let (orchestrator, chain) = orchestrator(Some(0));
        let err = orchestrator.grant_allowances(&wallet(), "secret1abc").await.unwrap_err();
        assert!(matches!(err, TradewindError::Chain { .. }));
        assert_eq!(chain.executions.lock().unwrap().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_simulated_settlement_takes_the_configured_delay() {
        let (orchestrator, _) = orchestrator(None);
        let started = tokio::time::Instant::now();
        let summary = orchestrator.settle().await.unwrap();
        assert_eq!(summary, SIMULATED_TRADE_SUMMARY);
        assert!(started.elapsed() >= Duration::from_millis(3_000));
    }
}
