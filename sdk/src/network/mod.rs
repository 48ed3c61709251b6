//! Access to a running network through its HTTP proxy.

pub mod awaiter;
pub mod proxy;

use {
    crate::{address::Address, error::NetworkError, transaction::SignedTransaction},
    std::fmt,
};

pub use {awaiter::TransactionAwaiter, proxy::ProxyNetworkProvider};

/// Result type for network calls.
pub type NetworkResult<T> = std::result::Result<T, NetworkError>;

/// Capabilities the test driver needs from the network.
pub trait NetworkProvider {
    fn get_account(&self, address: &Address) -> NetworkResult<AccountOnNetwork>;

    /// Submit one signed transaction, returning its hash.
    fn send_transaction(&self, transaction: &SignedTransaction) -> NetworkResult<String>;

    /// Submit a batch. The result is aligned with `transactions`: the hash the
    /// network assigned, or `None` where it rejected the transaction.
    fn send_transactions(
        &self,
        transactions: &[SignedTransaction],
    ) -> NetworkResult<Vec<Option<String>>>;

    /// Fetch a transaction; `with_process_status` asks for the richer
    /// processing status instead of the raw one.
    fn get_transaction(
        &self,
        hash: &str,
        with_process_status: bool,
    ) -> NetworkResult<TransactionOnNetwork>;
}

/// Account state as reported by the network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountOnNetwork {
    pub address: Address,
    pub nonce: u64,
    pub balance: u128,
}

/// Processing status of a transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionStatus(String);

impl TransactionStatus {
    pub fn new(status: &str) -> Self {
        Self(status.to_ascii_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_successful(&self) -> bool {
        matches!(self.0.as_str(), "success" | "successful" | "executed")
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.0.as_str(), "fail" | "failed" | "unsuccessful" | "invalid")
    }

    /// Terminal states; anything else is still pending.
    pub fn is_completed(&self) -> bool {
        self.is_successful() || self.is_failed()
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A log event emitted while processing a transaction or its contract results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionEvent {
    pub address: Option<Address>,
    pub identifier: String,
    pub topics: Vec<Vec<u8>>,
}

/// A transaction as observed on the network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionOnNetwork {
    pub hash: String,
    pub status: TransactionStatus,
    /// Events of the transaction followed by those of its contract results.
    pub events: Vec<TransactionEvent>,
}

impl TransactionOnNetwork {
    pub fn events(&self) -> impl Iterator<Item = &TransactionEvent> {
        self.events.iter()
    }
}
