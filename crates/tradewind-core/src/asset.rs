//! Tracked confidential assets.
//!
//! The client monitors a fixed set of SNIP-20 tokens. Each one is identified
//! by its contract address and, where known, the code hash used to skip the
//! on-chain code-hash lookup when querying.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator};

/// A confidential-balance token type this client monitors.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
    EnumString,
    AsRefStr,
)]
pub enum TrackedAsset {
    /// Secret SCRT
    #[serde(rename = "sSCRT")]
    #[strum(serialize = "sSCRT")]
    SScrt,
    /// Secret USDC
    #[serde(rename = "sUSDC")]
    #[strum(serialize = "sUSDC")]
    SUsdc,
}

impl TrackedAsset {
    /// All tracked assets in their canonical order.
    pub fn all() -> impl Iterator<Item = TrackedAsset> {
        Self::iter()
    }

    pub fn contract_address(self) -> &'static str {
        match self {
            TrackedAsset::SScrt => "secret1k0jntykt7e4g3y88ltc60czgjuqdy4c9e8fzek",
            TrackedAsset::SUsdc => "secret1vkq022x4q8t8kx9de3r84u669l65xnwf2lg3e6",
        }
    }

    /// Code hash of the token contract, if pinned.
    ///
    /// `None` leaves the lookup to the chain client.
    pub fn code_hash(self) -> Option<&'static str> {
        match self {
            TrackedAsset::SScrt => None,
            TrackedAsset::SUsdc => {
                Some("638a3e1d50175fbcb8373cf801565283e3eb23d88a9b7b7f99fcc5eb1e6b561e")
            }
        }
    }

    pub fn decimals(self) -> u32 {
        6
    }

    /// Divisor that turns a raw on-chain amount into a display amount.
    pub fn scale(self) -> u128 {
        10u128.pow(self.decimals())
    }
}
