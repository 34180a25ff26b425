//! Backend session token.
//!
//! The backend issues a JWT whose `sub` claim is the wallet address it was
//! issued for and whose `exp` claim is the expiry in unix seconds. The client
//! never verifies the signature; it only reads the claims to decide whether a
//! persisted token is still worth presenting.

use crate::error::{Result, TradewindError};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Bearer token for backend-authenticated calls.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuthToken(String);

/// Claims read from the token payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TokenClaims {
    /// Wallet address the token is bound to
    pub sub: Option<String>,
    /// Expiry, unix seconds
    pub exp: Option<i64>,
}

impl TokenClaims {
    pub fn is_expired_at(&self, now_secs: i64) -> bool {
        self.exp.is_some_and(|exp| exp <= now_secs)
    }
}

/// Outcome of checking a persisted token against the connecting wallet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum TokenStatus {
    Valid,
    Expired,
    WrongWallet,
    Malformed,
}

impl AuthToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// Value for the `Authorization` header.
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.0)
    }

    /// Decodes the payload segment of the JWT.
    pub fn claims(&self) -> Result<TokenClaims> {
        let payload = self
            .0
            .split('.')
            .nth(1)
            .filter(|segment| !segment.is_empty())
            .ok_or_else(|| TradewindError::auth_failure("token is not a JWT"))?;
        let bytes = URL_SAFE_NO_PAD
            .decode(payload.trim_end_matches('='))
            .map_err(|e| TradewindError::auth_failure(format!("token payload is not base64: {e}")))?;
        serde_json::from_slice(&bytes)
            .map_err(|e| TradewindError::auth_failure(format!("token payload is not JSON: {e}")))
    }

    /// Wallet address the token was issued for, if it can be read.
    pub fn wallet_address(&self) -> Option<String> {
        self.claims().ok().and_then(|claims| claims.sub)
    }

    /// Decides whether the token may be reused for `address` at `now_secs`.
    ///
    /// A token that does not name a wallet is accepted for any wallet.
    pub fn status_for(&self, address: &str, now_secs: i64) -> TokenStatus {
        let claims = match self.claims() {
            Ok(claims) => claims,
            Err(_) => return TokenStatus::Malformed,
        };
        if claims.is_expired_at(now_secs) {
            return TokenStatus::Expired;
        }
        match claims.sub.as_deref() {
            Some(sub) if sub != address => TokenStatus::WrongWallet,
            _ => TokenStatus::Valid,
        }
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthToken(..)")
    }
}
