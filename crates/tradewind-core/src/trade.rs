//! Simulated trade state.

use serde::{Deserialize, Serialize};

/// Summary recorded after a successful settlement simulation.
pub const SIMULATED_TRADE_SUMMARY: &str =
    "Trade executed successfully! Bought 10 SCRT with 50 sUSDC";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeState {
    /// The user told the agent it has convinced them to trade.
    pub is_convinced: bool,
    /// A settlement simulation is running.
    pub is_trading: bool,
    /// Summary of the last completed trade.
    pub last_trade_result: Option<String>,
    /// Both allowance grants and the backend confirmation succeeded.
    pub spend_authorized: bool,
}
