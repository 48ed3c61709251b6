//! Error types for the scenario driver.
//!
//! Nothing is recovered locally: every variant surfaces to the driver, which
//! stops the run.

use {
    shardnet_sdk::{Address, NetworkError, SdkError},
    std::path::PathBuf,
    thiserror::Error,
};

/// A requested account or contract has no registry entry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    #[error("no user at index {index} in shard {shard}")]
    User { shard: u32, index: usize },

    #[error("not enough users in shard {shard}: wanted {wanted}, have {available}")]
    UserRange {
        shard: u32,
        wanted: String,
        available: usize,
    },

    #[error("no known contract at index {index} in shard {shard}")]
    Contract { shard: u32, index: usize },

    #[error("address {0} is not managed by this run")]
    UnknownAddress(Address),
}

/// Structurally invalid scenario input, detected before any nonce is reserved.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("relayed v3 needs one receiver per sender: got {senders} senders and {receivers} receivers")]
    MismatchedInnerTransactions { senders: usize, receivers: usize },

    #[error("relayed v3 needs at least one inner transaction")]
    NoInnerTransactions,
}

/// Configuration could not be loaded or is unusable.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("unknown network {name:?}, available: {available}")]
    UnknownNetwork { name: String, available: String },

    #[error("invalid {what}: {source}")]
    KeyMaterial {
        what: String,
        #[source]
        source: SdkError,
    },

    #[error("invalid known contract {address:?}: {source}")]
    KnownContract {
        address: String,
        #[source]
        source: SdkError,
    },

    #[error("custom currencies file {0} lists no currency")]
    NoCustomCurrency(PathBuf),

    #[error("no custom currency configured for token transfers")]
    MissingCustomCurrency,
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Lookup(#[from] LookupError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("network fault: {0}")]
    Network(#[from] NetworkError),

    #[error(transparent)]
    Sdk(#[from] SdkError),

    #[error("nonces of {0} are exhausted")]
    NonceOverflow(Address),

    /// A completed transaction lacks the outcome the scenario relies on.
    #[error("transaction {hash}: {reason}")]
    Outcome { hash: String, reason: String },
}

pub type Result<T> = std::result::Result<T, Error>;
