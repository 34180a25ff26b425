pub mod config_service;
pub mod kv_store;
pub mod local_store;
pub mod paths;
pub mod storage;

pub use crate::config_service::ConfigService;
pub use crate::kv_store::{FileKeyValueStore, MemoryKeyValueStore};
pub use crate::local_store::LocalStore;
pub use crate::paths::TradewindPaths;
