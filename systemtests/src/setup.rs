//! One-off preparation of a network before scenarios can run.

use {
    crate::{
        assembler::TransactionAssembler,
        coordinator::{Coordinator, Submitted},
        error::{Error, Result},
    },
    log::*,
    shardnet_sdk::{factories::parse_issue_fungible, Address, NetworkProvider},
};

/// Name and ticker of the token issued during setup.
pub const CUSTOM_CURRENCY_NAME: &str = "ROSETTA";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SetupOptions {
    pub with_token_airdrops: bool,
    pub with_contract_deployments: bool,
}

pub fn run<P: NetworkProvider + ?Sized>(
    assembler: &mut TransactionAssembler<P>,
    coordinator: &Coordinator<P>,
    options: SetupOptions,
) -> Result<()> {
    info!("Do airdrops for native currency...");
    do_airdrops_for_native_currency(assembler, coordinator)?;

    info!("Issue custom currency...");
    let token_identifier = issue_custom_currency(assembler, coordinator, CUSTOM_CURRENCY_NAME)?;
    info!("Token identifier: {token_identifier}");

    if options.with_token_airdrops {
        info!("Do airdrops for custom currencies...");
        let transactions = assembler.create_airdrops_for_custom_currencies()?;
        let submitted = coordinator.send_many(&transactions)?;
        coordinator.await_completed(&submitted)?;
    }

    if options.with_contract_deployments {
        info!("Deploy contracts...");
        for contract in do_contract_deployments(assembler, coordinator)? {
            info!("Deployed contract: {contract}");
        }
    }
    Ok(())
}

pub fn do_airdrops_for_native_currency<P: NetworkProvider + ?Sized>(
    assembler: &mut TransactionAssembler<P>,
    coordinator: &Coordinator<P>,
) -> Result<()> {
    let transactions = assembler.create_airdrops_for_native_currency()?;
    let submitted = coordinator.send_many(&transactions)?;
    coordinator.await_completed(&submitted)?;
    Ok(())
}

/// Issue the custom token and return the identifier the network assigned.
pub fn issue_custom_currency<P: NetworkProvider + ?Sized>(
    assembler: &mut TransactionAssembler<P>,
    coordinator: &Coordinator<P>,
    name: &str,
) -> Result<String> {
    let transaction = assembler.create_issue_fungible(name)?;
    let hash = coordinator.send(&transaction)?;

    let outcome = coordinator
        .await_completed(&[Submitted::new(&transaction, hash.clone())])?
        .into_iter()
        .next()
        .ok_or_else(|| Error::Outcome {
            hash,
            reason: "no outcome returned".to_string(),
        })?;

    parse_issue_fungible(&outcome)
        .into_iter()
        .next()
        .ok_or_else(|| Error::Outcome {
            reason: format!("no issue event (status {})", outcome.status),
            hash: outcome.hash,
        })
}

/// Deploy one adder per shard and return the addresses of the contracts
/// whose deployment the network accepted.
pub fn do_contract_deployments<P: NetworkProvider + ?Sized>(
    assembler: &mut TransactionAssembler<P>,
    coordinator: &Coordinator<P>,
) -> Result<Vec<Address>> {
    let (transactions, contracts): (Vec<_>, Vec<_>) =
        assembler.create_contract_deployments()?.into_iter().unzip();
    let submitted = coordinator.send_many(&transactions)?;
    coordinator.await_completed(&submitted)?;

    Ok(transactions
        .iter()
        .zip(contracts)
        .filter(|(transaction, _)| {
            submitted
                .iter()
                .any(|accepted| accepted.transaction == *transaction)
        })
        .map(|(_, contract)| contract)
        .collect())
}
