//! Configuration types for hello-vault

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{Error, Lovelace, Network};

/// Config file looked up in the working directory
pub const CONFIG_FILE: &str = "hello-vault.toml";

/// Environment variable selecting the network
pub const NETWORK_ENV: &str = "HELLO_VAULT_NETWORK";

/// Chain query provider (Koios) configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Koios base URL. Falls back to the public endpoint of the network.
    pub url: Option<String>,

    /// Bearer token for authenticated Koios tiers (optional)
    pub api_key: String,
}

/// Compiled contract configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContractConfig {
    /// Text-envelope JSON produced by the contract compiler
    pub artifact_path: PathBuf,

    /// Amount sent to the script address by the lock action
    pub lock_amount: Lovelace,
}

impl Default for ContractConfig {
    fn default() -> Self {
        Self {
            artifact_path: PathBuf::from("contract/hello_validator.plutus.json"),
            lock_amount: 2_000_000,
        }
    }
}

/// Confirmation polling configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    pub poll_interval_secs: u64,
    pub timeout_secs: u64,
    pub min_confirmations: u64,
}

impl Default for WatchConfig {
    fn default() -> Self {
        // 100 polls, 5 seconds apart
        Self {
            poll_interval_secs: 5,
            timeout_secs: 500,
            min_confirmations: 1,
        }
    }
}

/// Wallet bridge configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// How long a wallet request waits for the browser before failing
    pub request_ttl_secs: u64,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            request_ttl_secs: 300,
        }
    }
}

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Network (mainnet, preprod or preview)
    pub network: Network,

    /// Chain query provider settings
    pub provider: ProviderConfig,

    /// Contract artifact and lock amount
    pub contract: ContractConfig,

    /// Confirmation watcher settings
    pub watch: WatchConfig,

    /// Wallet bridge settings
    pub bridge: BridgeConfig,

    /// API server port
    pub api_port: u16,
}

fn default_api_port() -> u16 {
    19080
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            network: Network::Preprod,
            provider: ProviderConfig::default(),
            contract: ContractConfig::default(),
            watch: WatchConfig::default(),
            bridge: BridgeConfig::default(),
            api_port: default_api_port(),
        }
    }
}

impl AppConfig {
    /// Load `hello-vault.toml` from the working directory if present, then
    /// apply the network override from the environment.
    pub fn load() -> Result<Self, Error> {
        let path = Path::new(CONFIG_FILE);
        let mut config = if path.exists() {
            Self::from_file(path)?
        } else {
            tracing::debug!("No {} found, using defaults", CONFIG_FILE);
            Self::default()
        };

        if let Ok(network) = std::env::var(NETWORK_ENV) {
            config.network = network
                .parse()
                .map_err(|e: String| Error::Config(format!("{}: {}", NETWORK_ENV, e)))?;
        }

        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, Error> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read {}: {}", path.display(), e)))?;
        Self::from_toml(&raw)
    }

    pub fn from_toml(raw: &str) -> Result<Self, Error> {
        toml::from_str(raw).map_err(|e| Error::Config(format!("Invalid config: {}", e)))
    }

    /// Koios base URL, explicit or derived from the network
    pub fn provider_url(&self) -> String {
        self.provider
            .url
            .clone()
            .unwrap_or_else(|| self.network.default_koios_url().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.network, Network::Preprod);
        assert_eq!(config.api_port, 19080);
        assert_eq!(config.contract.lock_amount, 2_000_000);
        assert_eq!(config.watch.poll_interval_secs, 5);
        assert_eq!(config.provider_url(), "https://preprod.koios.rest/api/v1");
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = AppConfig::from_toml(
            r#"
            network = "preview"

            [watch]
            timeout_secs = 60
            "#,
        )
        .unwrap();
        assert_eq!(config.network, Network::Preview);
        assert_eq!(config.watch.timeout_secs, 60);
        assert_eq!(config.watch.poll_interval_secs, 5);
        assert_eq!(config.provider_url(), "https://preview.koios.rest/api/v1");
    }

    #[test]
    fn test_explicit_provider_url_wins() {
        let config = AppConfig::from_toml(
            r#"
            [provider]
            url = "http://127.0.0.1:8053/api/v1"
            "#,
        )
        .unwrap();
        assert_eq!(config.provider_url(), "http://127.0.0.1:8053/api/v1");
    }

    #[test]
    fn test_invalid_toml() {
        assert!(matches!(
            AppConfig::from_toml("network = 12"),
            Err(Error::Config(_))
        ));
    }
}
