//! Domain layer for Tradewind.
//!
//! Holds the application state model and the interfaces of every external
//! collaborator (wallet extension, chain client, backend service, local
//! storage). Nothing in this crate performs I/O.

pub mod asset;
pub mod backend;
pub mod balance;
pub mod chain;
pub mod chat;
pub mod config;
pub mod error;
pub mod session;
pub mod state;
pub mod storage;
pub mod trade;
pub mod user;
pub mod viewing_key;
pub mod wallet;

// Re-export common error type
pub use error::{Result, TradewindError};
