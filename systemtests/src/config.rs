//! Named network configurations.
//!
//! The configuration file is a JSON object mapping a network name to its
//! [`Configuration`]:
//!
//! ```json
//! {
//!   "localnet": {
//!     "network_id": "localnet",
//!     "proxy_url": "http://localhost:7950",
//!     "explorer_url": "http://localhost:3002",
//!     "sponsor_secret_key": "<64 hex chars>",
//!     "users_mnemonic": "<24 words>",
//!     "config_file_custom_currencies": "systemtests/localnet-custom-currencies.json"
//!   }
//! }
//! ```

use {
    crate::error::ConfigError,
    serde::Deserialize,
    shardnet_sdk::factories::TransactionsFactoryConfig,
    std::{
        collections::BTreeMap,
        fmt,
        path::{Path, PathBuf},
    },
};

pub const DEFAULT_CONFIG_PATH: &str = "systemtests/config.json";

#[derive(Clone, Deserialize)]
pub struct Configuration {
    pub network_id: String,
    pub proxy_url: String,
    pub explorer_url: String,
    /// Hex-encoded 32-byte ed25519 secret key of the sponsor.
    pub sponsor_secret_key: String,
    pub users_mnemonic: String,
    /// JSON array whose first entry's `symbol` names the custom token.
    pub config_file_custom_currencies: PathBuf,
    #[serde(default)]
    pub known_contracts: Vec<String>,
    #[serde(default = "default_num_shards")]
    pub num_shards: u32,
    #[serde(default = "default_num_users")]
    pub num_users: u32,
    #[serde(default = "default_contracts_dir")]
    pub contracts_dir: PathBuf,
}

fn default_num_shards() -> u32 {
    3
}

fn default_num_users() -> u32 {
    32
}

fn default_contracts_dir() -> PathBuf {
    PathBuf::from("systemtests/contracts")
}

impl Configuration {
    /// Gas schedule for this network, keyed by its chain id.
    pub fn factory_config(&self) -> TransactionsFactoryConfig {
        TransactionsFactoryConfig::new(&self.network_id)
    }
}

impl fmt::Debug for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Configuration")
            .field("network_id", &self.network_id)
            .field("proxy_url", &self.proxy_url)
            .field("explorer_url", &self.explorer_url)
            .field("config_file_custom_currencies", &self.config_file_custom_currencies)
            .field("known_contracts", &self.known_contracts)
            .field("num_shards", &self.num_shards)
            .field("num_users", &self.num_users)
            .field("contracts_dir", &self.contracts_dir)
            .finish_non_exhaustive()
    }
}

pub fn load_configurations(path: &Path) -> Result<BTreeMap<String, Configuration>, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Load `path` and pick the configuration named `network`.
pub fn load_configuration(path: &Path, network: &str) -> Result<Configuration, ConfigError> {
    let mut configurations = load_configurations(path)?;
    configurations
        .remove(network)
        .ok_or_else(|| ConfigError::UnknownNetwork {
            name: network.to_string(),
            available: configurations.keys().cloned().collect::<Vec<_>>().join(", "),
        })
}

/// Contracts shipped with the test battery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestContract {
    Adder,
    Dummy,
}

impl TestContract {
    pub fn file_name(self) -> &'static str {
        match self {
            Self::Adder => "adder.wasm",
            Self::Dummy => "dummy.wasm",
        }
    }
}

#[derive(Debug, Deserialize)]
struct CurrencyEntry {
    symbol: String,
}

/// Custom token used by token-transfer scenarios.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomCurrencies {
    pub currency: String,
}

impl CustomCurrencies {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let entries: Vec<CurrencyEntry> =
            serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        entries
            .into_iter()
            .next()
            .map(|entry| Self {
                currency: entry.symbol,
            })
            .ok_or_else(|| ConfigError::NoCustomCurrency(path.to_path_buf()))
    }
}
