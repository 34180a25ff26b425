//! Per-asset viewing keys.

use crate::asset::TrackedAsset;
use crate::error::{Result, TradewindError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Mapping from tracked asset to the secret key that authorizes balance
/// queries against that asset's contract.
///
/// Serialized as `{"sSCRT": "...", "sUSDC": "..."}`.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ViewingKeys {
    keys: BTreeMap<TrackedAsset, String>,
}

impl ViewingKeys {
    pub fn new(keys: impl IntoIterator<Item = (TrackedAsset, String)>) -> Self {
        Self {
            keys: keys.into_iter().collect(),
        }
    }

    pub fn get(&self, asset: TrackedAsset) -> Option<&str> {
        self.keys
            .get(&asset)
            .map(String::as_str)
            .filter(|key| !key.is_empty())
    }

    /// Returns the key for `asset` or a `ViewingKeyMissing` error.
    pub fn require(&self, asset: TrackedAsset) -> Result<&str> {
        self.get(asset)
            .ok_or(TradewindError::ViewingKeyMissing { asset: Some(asset) })
    }

    /// True when every tracked asset has a non-empty key.
    pub fn is_complete(&self) -> bool {
        TrackedAsset::all().all(|asset| self.get(asset).is_some())
    }

    /// Fails with the first tracked asset lacking a key.
    pub fn ensure_complete(&self) -> Result<()> {
        for asset in TrackedAsset::all() {
            self.require(asset)?;
        }
        Ok(())
    }
}

impl fmt::Debug for ViewingKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Keys are secrets; only show which assets are covered.
        f.debug_struct("ViewingKeys")
            .field("assets", &self.keys.keys().collect::<Vec<_>>())
            .finish()
    }
}
