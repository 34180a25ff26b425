//! Chain client capability and SNIP-20 message shapes.
//!
//! The chain client itself (query encryption, transaction broadcast) is an
//! external collaborator. This module owns the messages the client sends and
//! the parsing of what comes back.

use crate::asset::TrackedAsset;
use crate::error::{Result, TradewindError};
use crate::wallet::ConnectedWallet;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// An encrypted smart-contract query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContractQuery {
    pub contract_address: String,
    pub code_hash: Option<String>,
    pub query: Value,
}

/// A signed smart-contract execution.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContractExecution {
    pub sender: String,
    pub contract_address: String,
    pub code_hash: Option<String>,
    pub msg: Value,
    pub gas_limit: u64,
}

/// Result of a broadcast transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxReceipt {
    pub tx_hash: String,
}

/// Encrypted query and transaction client for the chain.
///
/// Both operations run with the connected wallet's capabilities: queries are
/// encrypted with its encryption utilities, executions are signed by its
/// signer.
#[async_trait]
pub trait ChainClient: Send + Sync {
    async fn query_contract(&self, wallet: &ConnectedWallet, query: &ContractQuery) -> Result<Value>;

    async fn execute_contract(
        &self,
        wallet: &ConnectedWallet,
        execution: &ContractExecution,
    ) -> Result<TxReceipt>;
}

/// SNIP-20 `balance` query authenticated by a viewing key.
pub fn balance_query(asset: TrackedAsset, address: &str, viewing_key: &str) -> ContractQuery {
    ContractQuery {
        contract_address: asset.contract_address().to_string(),
        code_hash: asset.code_hash().map(str::to_string),
        query: json!({
            "balance": {
                "address": address,
                "key": viewing_key,
            }
        }),
    }
}

/// Extracts the raw amount from a `{"balance": {"amount": "..."}}` response.
pub fn parse_balance_response(response: &Value) -> Result<String> {
    #[derive(Deserialize)]
    struct BalanceResponse {
        balance: BalanceAmount,
    }
    #[derive(Deserialize)]
    struct BalanceAmount {
        amount: String,
    }

    // Contracts answer an invalid viewing key with a `viewing_key_error`
    // object instead of a balance.
    if let Some(message) = response
        .get("viewing_key_error")
        .and_then(|err| err.get("msg"))
        .and_then(Value::as_str)
    {
        return Err(TradewindError::chain(format!("viewing key rejected: {message}")));
    }

    let parsed: BalanceResponse = serde_json::from_value(response.clone())
        .map_err(|e| TradewindError::chain(format!("unexpected balance response: {e}")))?;
    Ok(parsed.balance.amount)
}

/// SNIP-20 `increase_allowance` execution granting `spender` up to `amount`.
pub fn increase_allowance(
    asset: TrackedAsset,
    sender: &str,
    spender: &str,
    amount: &str,
    gas_limit: u64,
) -> ContractExecution {
    ContractExecution {
        sender: sender.to_string(),
        contract_address: asset.contract_address().to_string(),
        code_hash: asset.code_hash().map(str::to_string),
        msg: json!({
            "increase_allowance": {
                "spender": spender,
                "amount": amount,
            }
        }),
        gas_limit,
    }
}
