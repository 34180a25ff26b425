//! Local key-value persistence interface.

use crate::error::Result;

/// Keys under which the client persists its local state.
pub mod keys {
    pub const CHAT_MESSAGES: &str = "chatMessages";
    pub const VIEWING_KEYS: &str = "viewingKeys";
    pub const AUTO_CONNECT: &str = "walletAutoConnect";
    pub const AUTH_TOKEN: &str = "authToken";
}

/// An opaque key → JSON-string store.
///
/// Calls are synchronous; a successful `set` is durable when it returns.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;

    fn set(&self, key: &str, value: String) -> Result<()>;

    /// Removes `key`; removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<()>;
}
