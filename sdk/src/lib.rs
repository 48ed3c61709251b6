//! # shardnet-sdk
//!
//! Client-side building blocks for driving a sharded network:
//!
//! - [`keys`]: mnemonic derivation and ed25519 signing;
//! - [`address`]: address encoding, shard computation, contract addresses;
//! - [`transaction`]: the draft → finalized → signed transaction lifecycle;
//! - [`factories`]: transfers, contract deployments and calls, token issuance,
//!   relayed envelopes (v1, v2, v3);
//! - [`network`]: the proxy client and the completion awaiter.

pub mod address;
pub mod error;
pub mod factories;
pub mod keys;
pub mod network;
pub mod transaction;

pub use {
    address::{Address, AddressComputer, METACHAIN_ID},
    error::{NetworkError, SdkError},
    keys::{UserSecretKey, UserSigner},
    network::{
        AccountOnNetwork, NetworkProvider, NetworkResult, ProxyNetworkProvider,
        TransactionAwaiter, TransactionEvent, TransactionOnNetwork, TransactionStatus,
    },
    transaction::{FinalizedTransaction, SignedTransaction, TransactionDraft, TransactionWire},
};
