//! Application layer for Tradewind.
//!
//! This crate sequences the wallet, chain and backend collaborators into the
//! client's use cases. `AppStateStore` is the entry point; the services it
//! composes are public so they can be reused on their own.

pub mod app_state_store;
pub mod balance_fetcher;
pub mod chat_sync;
pub mod in_flight;
pub mod notice;
pub mod session_manager;
pub mod telemetry;
pub mod trade;
pub mod viewing_keys;
pub mod wallet_connector;

pub use app_state_store::{AppStateStore, AppStateStoreBuilder, Collaborators, ConnectOutcome};
pub use in_flight::{InFlightGuard, Operation};
pub use notice::{Notice, NoticeKind};
pub use trade::{Settlement, SimulatedSettlement};
