//! Unified path management for tradewind files.
//!
//! ```text
//! ~/.config/tradewind/         # Config directory
//! ├── config.toml              # Client configuration
//! └── local_store.json         # Key → JSON-string local store
//! ```

use std::path::{Path, PathBuf};

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Platform config directory could not be determined.
    ConfigDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::ConfigDirNotFound => write!(f, "Cannot find config directory"),
        }
    }
}

impl std::error::Error for PathError {}

impl From<PathError> for tradewind_core::TradewindError {
    fn from(err: PathError) -> Self {
        tradewind_core::TradewindError::config(err.to_string())
    }
}

const APP_DIR: &str = "tradewind";
const CONFIG_FILE: &str = "config.toml";
const LOCAL_STORE_FILE: &str = "local_store.json";

/// Path resolver rooted either at the platform config directory or at an
/// explicit base (tests, portable installs).
#[derive(Debug, Clone)]
pub struct TradewindPaths {
    base: PathBuf,
}

impl TradewindPaths {
    /// Resolves `<platform config dir>/tradewind`.
    pub fn platform() -> Result<Self, PathError> {
        let base = dirs::config_dir()
            .ok_or(PathError::ConfigDirNotFound)?
            .join(APP_DIR);
        Ok(Self { base })
    }

    /// Uses `base` as the tradewind directory.
    pub fn with_base(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base
    }

    pub fn config_file(&self) -> PathBuf {
        self.base.join(CONFIG_FILE)
    }

    pub fn local_store_file(&self) -> PathBuf {
        self.base.join(LOCAL_STORE_FILE)
    }
}
