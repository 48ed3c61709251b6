//! Factories turning structured parameters into transaction drafts.

pub mod args;
pub mod config;
pub mod relayed;
pub mod smart_contracts;
pub mod token_management;
pub mod transfers;

pub use {
    config::TransactionsFactoryConfig,
    relayed::RelayedTransactionsFactory,
    smart_contracts::{load_bytecode, CodeMetadata, SmartContractTransactionsFactory},
    token_management::{
        parse_issue_fungible, IssueFungibleParams, TokenManagementTransactionsFactory,
    },
    transfers::{Token, TokenTransfer, TransferTransactionsFactory, NATIVE_TOKEN_IDENTIFIER},
};
