//! Configuration service implementation.
//!
//! Loads `ClientConfig` from `config.toml` and applies `TRADEWIND_*`
//! environment overrides on top.

use crate::paths::TradewindPaths;
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};
use tradewind_core::config::ClientConfig;
use tradewind_core::{Result, TradewindError};

pub const ENV_BACKEND_URL: &str = "TRADEWIND_BACKEND_URL";
pub const ENV_CHAIN_ID: &str = "TRADEWIND_CHAIN_ID";
pub const ENV_REQUEST_TIMEOUT_MS: &str = "TRADEWIND_REQUEST_TIMEOUT_MS";
pub const ENV_WALLET_READY_TIMEOUT_MS: &str = "TRADEWIND_WALLET_READY_TIMEOUT_MS";

type EnvLookup = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Configuration service that loads and caches the client configuration.
#[derive(Clone)]
pub struct ConfigService {
    path: PathBuf,
    env: EnvLookup,
    /// Uses RwLock for thread-safe lazy loading.
    config: Arc<RwLock<Option<ClientConfig>>>,
}

impl ConfigService {
    /// Reads `config.toml` under `paths` with the process environment.
    pub fn new(paths: &TradewindPaths) -> Self {
        Self::with_env(paths.config_file(), |key| std::env::var(key).ok())
    }

    /// Reads `path` with a custom environment lookup.
    pub fn with_env<F>(path: PathBuf, env: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        Self {
            path,
            env: Arc::new(env),
            config: Arc::new(RwLock::new(None)),
        }
    }

    /// Gets the configuration, loading it on first access.
    pub fn get_config(&self) -> Result<ClientConfig> {
        {
            let read_lock = self
                .config
                .read()
                .map_err(|_| TradewindError::internal("config cache lock poisoned"))?;
            if let Some(ref cached) = *read_lock {
                return Ok(cached.clone());
            }
        }

        let loaded = self.load_config()?;

        {
            let mut write_lock = self
                .config
                .write()
                .map_err(|_| TradewindError::internal("config cache lock poisoned"))?;
            *write_lock = Some(loaded.clone());
        }

        Ok(loaded)
    }

    /// Invalidates the cache, forcing a reload on next access.
    pub fn invalidate_cache(&self) {
        if let Ok(mut write_lock) = self.config.write() {
            *write_lock = None;
        }
    }

    fn load_config(&self) -> Result<ClientConfig> {
        let mut config = if self.path.exists() {
            let content = fs::read_to_string(&self.path)?;
            toml::from_str(&content).map_err(|e| {
                TradewindError::config(format!("{}: {}", self.path.display(), e))
            })?
        } else {
            tracing::debug!(
                "[Config] {} not found, using defaults",
                self.path.display()
            );
            ClientConfig::default()
        };

        self.apply_env(&mut config)?;
        Ok(config)
    }

    fn apply_env(&self, config: &mut ClientConfig) -> Result<()> {
        if let Some(url) = (self.env)(ENV_BACKEND_URL) {
            config.backend_url = url;
        }
        if let Some(chain_id) = (self.env)(ENV_CHAIN_ID) {
            config.chain_id = chain_id;
        }
        if let Some(ms) = self.env_millis(ENV_REQUEST_TIMEOUT_MS)? {
            config.request_timeout_ms = ms;
        }
        if let Some(ms) = self.env_millis(ENV_WALLET_READY_TIMEOUT_MS)? {
            config.wallet_ready_timeout_ms = ms;
        }
        Ok(())
    }

    fn env_millis(&self, key: &str) -> Result<Option<u64>> {
        match (self.env)(key) {
            Some(raw) => raw
                .trim()
                .parse()
                .map(Some)
                .map_err(|_| TradewindError::config(format!("{key} must be milliseconds, got {raw:?}"))),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let service = ConfigService::with_env(temp_dir.path().join("config.toml"), no_env);
        assert_eq!(service.get_config().unwrap(), ClientConfig::default());
    }

    #[test]
    fn test_file_values_are_read() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "backend_url = \"https://agent.example\"\nsettlement_delay_ms = 10\n").unwrap();

        let config = ConfigService::with_env(path, no_env).get_config().unwrap();
        assert_eq!(config.backend_url, "https://agent.example");
        assert_eq!(config.settlement_delay_ms, 10);
        assert_eq!(config.request_timeout_ms, 30_000);
    }

    #[test]
    fn test_env_overrides_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "chain_id = \"pulsar-3\"\n").unwrap();

        let env: HashMap<&str, &str> = HashMap::from([
            (ENV_CHAIN_ID, "secret-4"),
            (ENV_WALLET_READY_TIMEOUT_MS, "250"),
        ]);
        let service = ConfigService::with_env(path, move |key| env.get(key).map(|v| v.to_string()));

        let config = service.get_config().unwrap();
        assert_eq!(config.chain_id, "secret-4");
        assert_eq!(config.wallet_ready_timeout_ms, 250);
    }

    #[test]
    fn test_bad_env_value_is_config_error() {
        let temp_dir = TempDir::new().unwrap();
        let service = ConfigService::with_env(temp_dir.path().join("config.toml"), |key| {
            (key == ENV_REQUEST_TIMEOUT_MS).then(|| "soon".to_string())
        });
        assert!(matches!(service.get_config(), Err(TradewindError::Config(_))));
    }

    #[test]
    fn test_unparsable_file_is_config_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "backend_url = [").unwrap();
        let service = ConfigService::with_env(path, no_env);
        assert!(matches!(service.get_config(), Err(TradewindError::Config(_))));
    }

    #[test]
    fn test_cache_and_invalidate() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        let service = ConfigService::with_env(path.clone(), no_env);
        assert_eq!(service.get_config().unwrap().settlement_delay_ms, 3_000);

        fs::write(&path, "settlement_delay_ms = 5\n").unwrap();
        assert_eq!(service.get_config().unwrap().settlement_delay_ms, 3_000);

        service.invalidate_cache();
        assert_eq!(service.get_config().unwrap().settlement_delay_ms, 5);
    }
}
