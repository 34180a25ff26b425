//! Confidential balance queries.

use futures::future::join_all;
use std::sync::Arc;
use tradewind_core::Result;
use tradewind_core::asset::TrackedAsset;
use tradewind_core::balance::{Balance, BalanceEntry, to_display_amount};
use tradewind_core::chain::{ChainClient, balance_query, parse_balance_response};
use tradewind_core::viewing_key::ViewingKeys;
use tradewind_core::wallet::ConnectedWallet;

#[derive(Clone)]
pub struct BalanceFetcher {
    chain: Arc<dyn ChainClient>,
}

impl BalanceFetcher {
    pub fn new(chain: Arc<dyn ChainClient>) -> Self {
        Self { chain }
    }

    /// Queries every tracked asset concurrently.
    ///
    /// A failed asset becomes `BalanceEntry::Error`; the others are kept.
    pub async fn fetch(&self, wallet: &ConnectedWallet, keys: &ViewingKeys) -> Balance {
        let queries = TrackedAsset::all().map(|asset| async move {
            let entry = match self.fetch_asset(wallet, keys, asset).await {
                Ok(amount) => BalanceEntry::Amount(amount),
                Err(e) => {
                    tracing::warn!("[Balance] {} query failed: {}", asset, e);
                    BalanceEntry::Error
                }
            };
            (asset, entry)
        });

        Balance::from_entries(join_all(queries).await)
    }

    /// Display amount of one asset.
    pub async fn fetch_asset(
        &self,
        wallet: &ConnectedWallet,
        keys: &ViewingKeys,
        asset: TrackedAsset,
    ) -> Result<String> {
        let key = keys.require(asset)?;
        let query = balance_query(asset, wallet.address(), key);
        let response = self.chain.query_contract(wallet, &query).await?;
        let raw = parse_balance_response(&response)?;
        to_display_amount(&raw, asset.decimals())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::{Value, json};
    use std::sync::Mutex;
    use tradewind_core::TradewindError;
    use tradewind_core::chain::{ContractExecution, ContractQuery, TxReceipt};
    use tradewind_core::wallet::{ChainDescriptor, EncryptionHandle, SignerHandle};

    /// Answers balance queries by contract address.
    struct MockChain {
        responses: Vec<(&'static str, Result<Value>)>,
        queries: Mutex<Vec<ContractQuery>>,
    }

    #[async_trait]
    impl ChainClient for MockChain {
        async fn query_contract(&self, _wallet: &ConnectedWallet, query: &ContractQuery) -> Result<Value> {
            self.queries.lock().unwrap().push(query.clone());
            self.responses
                .iter()
                .find(|(address, _)| *address == query.contract_address)
                .map(|(_, response)| response.clone())
                .unwrap_or_else(|| Err(TradewindError::chain("unknown contract")))
        }

        async fn execute_contract(&self, _: &ConnectedWallet, _: &ContractExecution) -> Result<TxReceipt> {
            Err(TradewindError::chain("not supported"))
        }
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

    fn keys() -> ViewingKeys {
        ViewingKeys::new([
            (TrackedAsset::SScrt, "k-scrt".to_string()),
            (TrackedAsset::SUsdc, "k-usdc".to_string()),
        ])
    }

    #[tokio::test]
    async fn test_fetch_converts_amounts() {
        let chain = Arc::new(MockChain {
            responses: vec![
                (TrackedAsset::SScrt.contract_address(), Ok(json!({"balance": {"amount": "1500000"}}))),
                (TrackedAsset::SUsdc.contract_address(), Ok(json!({"balance": {"amount": "0"}}))),
            ],
            queries: Mutex::new(Vec::new()),
        });
        let balance = BalanceFetcher::new(chain.clone()).fetch(&wallet(), &keys()).await;

        assert_eq!(balance.amount(TrackedAsset::SScrt), Some("1.5"));
        assert_eq!(balance.amount(TrackedAsset::SUsdc), Some("0"));

        let queries = chain.queries.lock().unwrap();
        assert_eq!(queries.len(), 2);
        assert!(queries.iter().any(|q| q.query["balance"]["key"] == "k-usdc"));
    }

    #[tokio::test]
    async fn test_one_failed_asset_does_not_abort_the_other() {
        let chain = Arc::new(MockChain {
            responses: vec![
                (TrackedAsset::SScrt.contract_address(), Err(TradewindError::chain("rpc down"))),
                (TrackedAsset::SUsdc.contract_address(), Ok(json!({"balance": {"amount": "2000000"}}))),
            ],
            queries: Mutex::new(Vec::new()),
        });
        let balance = BalanceFetcher::new(chain).fetch(&wallet(), &keys()).await;

        assert!(balance.get(TrackedAsset::SScrt).is_error());
        assert_eq!(balance.amount(TrackedAsset::SUsdc), Some("2"));
    }

    #[tokio::test]
    async fn test_missing_key_for_one_asset() {
        let chain = Arc::new(MockChain {
            responses: vec![(TrackedAsset::SScrt.contract_address(), Ok(json!({"balance": {"amount": "7"}})))],
            queries: Mutex::new(Vec::new()),
        });
        let partial = ViewingKeys::new([(TrackedAsset::SScrt, "k-scrt".to_string())]);
        let balance = BalanceFetcher::new(chain.clone()).fetch(&wallet(), &partial).await;

        assert_eq!(balance.amount(TrackedAsset::SScrt), Some("0.000007"));
        assert!(balance.get(TrackedAsset::SUsdc).is_error());
        assert_eq!(chain.queries.lock().unwrap().len(), 1);
    }
}
