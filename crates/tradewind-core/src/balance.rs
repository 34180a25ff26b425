//! Confidential balances keyed by tracked asset.

use crate::asset::TrackedAsset;
use crate::error::{Result, TradewindError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Display value for a single asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "amount", rename_all = "snake_case")]
pub enum BalanceEntry {
    /// Decimal display amount, e.g. `"12.5"`.
    Amount(String),
    /// The query for this asset failed; other assets are unaffected.
    Error,
}

impl BalanceEntry {
    pub fn zero() -> Self {
        BalanceEntry::Amount("0".to_string())
    }

    pub fn amount(&self) -> Option<&str> {
        match self {
            BalanceEntry::Amount(amount) => Some(amount),
            BalanceEntry::Error => None,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, BalanceEntry::Error)
    }
}

impl fmt::Display for BalanceEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BalanceEntry::Amount(amount) => f.write_str(amount),
            BalanceEntry::Error => f.write_str("Error"),
        }
    }
}

/// Mapping from tracked asset to its display balance.
///
/// Always holds an entry for every tracked asset; a fresh mapping is zero
/// for all of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    from = "BTreeMap<TrackedAsset, BalanceEntry>",
    into = "BTreeMap<TrackedAsset, BalanceEntry>"
)]
pub struct Balance {
    entries: BTreeMap<TrackedAsset, BalanceEntry>,
}

impl Default for Balance {
    fn default() -> Self {
        Self::zero()
    }
}

impl Balance {
    pub fn zero() -> Self {
        Self {
            entries: TrackedAsset::all()
                .map(|asset| (asset, BalanceEntry::zero()))
                .collect(),
        }
    }

    /// Builds a mapping from fetched entries; assets without an entry are zero.
    pub fn from_entries(entries: impl IntoIterator<Item = (TrackedAsset, BalanceEntry)>) -> Self {
        let mut balance = Self::zero();
        balance.entries.extend(entries);
        balance
    }

    pub fn get(&self, asset: TrackedAsset) -> &BalanceEntry {
        // Every tracked asset is populated by construction.
        &self.entries[&asset]
    }

    pub fn amount(&self, asset: TrackedAsset) -> Option<&str> {
        self.get(asset).amount()
    }

    pub fn set(&mut self, asset: TrackedAsset, entry: BalanceEntry) {
        self.entries.insert(asset, entry);
    }

    pub fn iter(&self) -> impl Iterator<Item = (TrackedAsset, &BalanceEntry)> {
        self.entries.iter().map(|(asset, entry)| (*asset, entry))
    }

    pub fn is_zero(&self) -> bool {
        self.entries
            .values()
            .all(|entry| entry.amount().is_some_and(|amount| amount == "0"))
    }

    pub fn has_errors(&self) -> bool {
        self.entries.values().any(BalanceEntry::is_error)
    }
}

/// Missing assets are filled in as zero.
impl From<BTreeMap<TrackedAsset, BalanceEntry>> for Balance {
    fn from(entries: BTreeMap<TrackedAsset, BalanceEntry>) -> Self {
        Self::from_entries(entries)
    }
}

impl From<Balance> for BTreeMap<TrackedAsset, BalanceEntry> {
    fn from(balance: Balance) -> Self {
        balance.entries
    }
}

/// Converts a raw on-chain integer amount into a display amount.
///
/// Uses integer arithmetic only; trailing fractional zeros are trimmed, so
/// `("1500000", 6)` becomes `"1.5"` and `("0", 6)` stays `"0"`.
pub fn to_display_amount(raw: &str, decimals: u32) -> Result<String> {
    let value: u128 = raw.trim().parse().map_err(|_| {
        TradewindError::validation(format!("raw amount is not an unsigned integer: {raw:?}"))
    })?;
    let scale = 10u128
        .checked_pow(decimals)
        .ok_or_else(|| TradewindError::validation(format!("unsupported decimals: {decimals}")))?;

    let whole = value / scale;
    let fraction = value % scale;
    if fraction == 0 {
        return Ok(whole.to_string());
    }

    let digits = format!("{:0width$}", fraction, width = decimals as usize);
    Ok(format!("{}.{}", whole, digits.trim_end_matches('0')))
}
