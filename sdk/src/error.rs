//! Error types for the SDK.

use thiserror::Error;

/// Errors raised while handling keys, addresses or transaction composition.
#[derive(Error, Debug)]
pub enum SdkError {
    /// The mnemonic phrase could not be parsed.
    #[error("invalid mnemonic: {0}")]
    InvalidMnemonic(String),

    /// SLIP-0010 derivation of a child key failed.
    #[error("key derivation failed for index {index}: {reason}")]
    KeyDerivation { index: u32, reason: String },

    /// Secret key material is malformed.
    #[error("invalid secret key: {0}")]
    InvalidSecretKey(String),

    /// An address string or buffer could not be decoded.
    #[error("invalid address {input:?}: {reason}")]
    InvalidAddress { input: String, reason: String },

    /// A transaction was handed to a signer that does not own its sender.
    #[error("signer {signer} cannot sign for sender {sender}")]
    SignerMismatch { signer: String, sender: String },

    /// Relayed composition precondition was not met.
    #[error("invalid relayed transaction: {0}")]
    InvalidRelayedTransaction(String),

    /// Contract bytecode could not be read.
    #[error("cannot read bytecode from {path}: {source}")]
    Bytecode {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Serializing a transaction failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Failures talking to the network proxy.
#[derive(Error, Debug)]
pub enum NetworkError {
    /// Transport-level failure (connection refused, TLS, timeout in the client).
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The proxy answered with an error payload.
    #[error("proxy error at {url}: {code}: {message}")]
    Api {
        url: String,
        code: String,
        message: String,
    },

    /// The proxy answered with something we could not interpret.
    #[error("unexpected response from {url}: {reason}")]
    UnexpectedResponse { url: String, reason: String },

    /// A transaction did not reach a terminal status in time.
    #[error("transaction {hash} not completed after {elapsed_secs}s")]
    Timeout { hash: String, elapsed_secs: u64 },
}

/// Convenience result type for SDK operations.
pub type Result<T> = std::result::Result<T, SdkError>;
