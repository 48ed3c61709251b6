//! End-to-end transaction scenarios against a live sharded network.
//!
//! The engine keeps a fixed pool of accounts per shard ([`accounts`]), hands
//! out nonces ([`nonces`]), assembles plain and relayed transactions
//! ([`assembler`]) and submits them ([`coordinator`]). [`setup`] prepares a
//! fresh network and [`scenarios`] runs the exploratory battery.

pub mod accounts;
pub mod assembler;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod nonces;
pub mod scenarios;
pub mod session;
pub mod setup;

#[cfg(test)]
pub(crate) mod test_utils;

pub use error::{Error, Result};
