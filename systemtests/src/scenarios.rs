//! The exploratory scenario battery.
//!
//! Scenarios run strictly in order and each submits exactly one transaction.
//! Several are expected to fail on chain (insufficient balance, non-payable
//! receivers, signal errors); they are built and submitted like the others.
//! The scenarios marked as needing spica depend on relayed v3 and developer
//! rewards support, and are skipped when the network lacks it.

use {
    crate::{
        accounts::{Account, AccountRegistry},
        assembler::TransactionAssembler,
        coordinator::Coordinator,
        error::Result,
    },
    log::*,
    shardnet_sdk::{Address, NetworkProvider, SignedTransaction},
    std::rc::Rc,
};

const RELAYED_AMOUNT: u128 = 42;
const EXCESSIVE_RELAYED_AMOUNT: u128 = 1_000_000_000_000_000_000_000;
const ONE_COIN: u128 = 1_000_000_000_000_000_000;
const CONTRACT_TRANSFER_AMOUNT: u128 = 10_000_000_000_000_000;
const DEPLOYMENT_WITH_SIGNAL_ERROR_AMOUNT: u128 = 77;

struct Battery<'a, P: ?Sized> {
    assembler: &'a mut TransactionAssembler<P>,
    coordinator: &'a Coordinator<P>,
    accounts: Rc<AccountRegistry>,
    hashes: Vec<String>,
}

impl<P: NetworkProvider + ?Sized> Battery<'_, P> {
    fn scenario<F>(&mut self, title: &str, build: F) -> Result<()>
    where
        F: FnOnce(&mut TransactionAssembler<P>, &AccountRegistry) -> Result<SignedTransaction>,
    {
        info!("{title}");
        let transaction = build(&mut *self.assembler, self.accounts.as_ref())?;
        self.hashes.push(self.coordinator.send(&transaction)?);
        Ok(())
    }
}

fn addresses(accounts: &[Account]) -> Vec<Address> {
    accounts.iter().map(|account| account.address).collect()
}

/// Run every scenario, returning the submitted hashes in order.
pub fn run<P: NetworkProvider + ?Sized>(
    assembler: &mut TransactionAssembler<P>,
    coordinator: &Coordinator<P>,
    with_spica: bool,
) -> Result<Vec<String>> {
    let accounts = assembler.registry();
    let mut battery = Battery {
        assembler,
        coordinator,
        accounts,
        hashes: Vec::new(),
    };

    battery.scenario("Intra-shard, simple MoveBalance with refund", |a, accounts| {
        a.create_simple_move_balance_with_refund(
            accounts.get_user(0, 0)?,
            &accounts.get_user(0, 1)?.address,
        )
    })?;

    battery.scenario("Cross-shard, simple MoveBalance with refund", |a, accounts| {
        a.create_simple_move_balance_with_refund(
            accounts.get_user(0, 1)?,
            &accounts.get_user(1, 0)?.address,
        )
    })?;

    battery.scenario("Intra-shard, invalid MoveBalance with refund", |a, accounts| {
        a.create_invalid_move_balance_with_refund(
            accounts.get_user(0, 2)?,
            &accounts.get_user(0, 3)?.address,
        )
    })?;

    battery.scenario("Cross-shard, invalid MoveBalance with refund", |a, accounts| {
        a.create_invalid_move_balance_with_refund(
            accounts.get_user(0, 4)?,
            &accounts.get_user(1, 1)?.address,
        )
    })?;

    battery.scenario(
        "Intra-shard, sending value to non-payable contract",
        |a, accounts| {
            a.create_simple_move_balance_with_refund(
                accounts.get_user(0, 0)?,
                accounts.get_contract(0, 0)?,
            )
        },
    )?;

    battery.scenario(
        "Cross-shard, sending value to non-payable contract",
        |a, accounts| {
            a.create_simple_move_balance_with_refund(
                accounts.get_user(0, 1)?,
                accounts.get_contract(1, 0)?,
            )
        },
    )?;

    battery.scenario(
        "Intra-shard, native transfer within MultiESDTTransfer",
        |a, accounts| {
            a.create_native_transfer_within_multiesdt(
                accounts.get_user(0, 0)?,
                &accounts.get_user(0, 1)?.address,
            )
        },
    )?;

    battery.scenario(
        "Cross-shard, native transfer within MultiESDTTransfer",
        |a, accounts| {
            a.create_native_transfer_within_multiesdt(
                accounts.get_user(0, 1)?,
                &accounts.get_user(1, 0)?.address,
            )
        },
    )?;

    battery.scenario(
        "Intra-shard, native transfer within MultiESDTTransfer, towards non-payable contract",
        |a, accounts| {
            a.create_native_transfer_within_multiesdt(
                accounts.get_user(0, 0)?,
                accounts.get_contract(0, 0)?,
            )
        },
    )?;

    battery.scenario(
        "Cross-shard, native transfer within MultiESDTTransfer, towards non-payable contract",
        |a, accounts| {
            a.create_native_transfer_within_multiesdt(
                accounts.get_user(0, 1)?,
                accounts.get_contract(1, 0)?,
            )
        },
    )?;

    battery.scenario(
        "Intra-shard, relayed v1 transaction with MoveBalance",
        |a, accounts| {
            a.create_relayed_v1_with_move_balance(
                accounts.get_user(0, 0)?,
                accounts.get_user(0, 1)?,
                &accounts.get_user(0, 2)?.address,
                RELAYED_AMOUNT,
            )
        },
    )?;

    battery.scenario(
        "Intra-shard, relayed v1 transaction with ESDT transfer",
        |a, accounts| {
            a.create_relayed_v1_with_esdt_transfer(
                accounts.get_user(0, 0)?,
                accounts.get_user(0, 1)?,
                &accounts.get_user(0, 2)?.address,
                RELAYED_AMOUNT,
            )
        },
    )?;

    battery.scenario(
        "Intra-shard, relayed v2 transaction with MoveBalance",
        |a, accounts| {
            a.create_relayed_v2_with_move_balance(
                accounts.get_user(0, 0)?,
                accounts.get_user(0, 1)?,
                &accounts.get_user(0, 2)?.address,
                RELAYED_AMOUNT,
            )
        },
    )?;

    if with_spica {
        for (title, receivers_shard, amount) in [
            (
                "Relayed v3, senders and receivers in same shard",
                0,
                RELAYED_AMOUNT,
            ),
            (
                "Relayed v3, senders and receivers in different shards",
                1,
                RELAYED_AMOUNT,
            ),
            (
                "Relayed v3, senders and receivers in same shard (insufficient balance)",
                0,
                EXCESSIVE_RELAYED_AMOUNT,
            ),
            (
                "Relayed v3, senders and receivers in different shards (insufficient balance)",
                1,
                EXCESSIVE_RELAYED_AMOUNT,
            ),
        ] {
            battery.scenario(title, |a, accounts| {
                a.create_relayed_v3_with_a_few_inner_move_balances(
                    accounts.get_user(0, 0)?,
                    accounts.get_users(0, 1..3)?,
                    &addresses(accounts.get_users(receivers_shard, 3..5)?),
                    amount,
                )
            })?;
        }

        battery.scenario(
            "Relayed v3, senders and receivers in same shard, sending to non-payable contract",
            |a, accounts| {
                a.create_relayed_v3_with_a_few_inner_move_balances(
                    accounts.get_user(0, 0)?,
                    accounts.get_users(0, 5..6)?,
                    &[*accounts.get_contract(0, 0)?],
                    ONE_COIN,
                )
            },
        )?;
    }

    battery.scenario(
        "Relayed v1 transaction with MoveBalance, towards a system address",
        |a, accounts| {
            a.create_relayed_v1_with_move_balance(
                accounts.get_user(1, 0)?,
                accounts.get_user(1, 9)?,
                &Address::TOKEN_SYSTEM_CONTRACT,
                ONE_COIN,
            )
        },
    )?;

    battery.scenario("Direct contract deployment with MoveBalance", |a, accounts| {
        a.create_contract_deployment_with_move_balance(
            accounts.get_user(0, 0)?,
            CONTRACT_TRANSFER_AMOUNT,
        )
    })?;

    battery.scenario(
        "Intra-shard, contract call with MoveBalance, with signal error",
        |a, accounts| {
            a.create_contract_call_with_move_balance_with_signal_error(
                accounts.get_user(0, 0)?,
                accounts.get_contract(0, 0)?,
                CONTRACT_TRANSFER_AMOUNT,
            )
        },
    )?;

    battery.scenario(
        "Cross-shard, contract call with MoveBalance, with signal error",
        |a, accounts| {
            a.create_contract_call_with_move_balance_with_signal_error(
                accounts.get_user(0, 0)?,
                accounts.get_contract(1, 0)?,
                CONTRACT_TRANSFER_AMOUNT,
            )
        },
    )?;

    battery.scenario(
        "Direct contract deployment with MoveBalance, with signal error",
        |a, accounts| {
            a.create_contract_deployment_with_move_balance_with_signal_error(
                accounts.get_user(0, 0)?,
                DEPLOYMENT_WITH_SIGNAL_ERROR_AMOUNT,
            )
        },
    )?;

    if with_spica {
        // TODO: claim developer rewards through parent-child contracts, and cross-shard after changing the owner.
        battery.scenario(
            "ClaimDeveloperRewards on directly owned contract",
            |a, accounts| {
                a.create_claim_developer_rewards_on_directly_owned_contract(
                    accounts.get_user(0, 0)?,
                    accounts.get_contract(0, 0)?,
                )
            },
        )?;
    }

    battery.scenario(
        "Intra-shard, relayed v1 transaction with contract call with MoveBalance, with signal error",
        |a, accounts| {
            a.create_relayed_v1_with_contract_call_with_move_balance_with_signal_error(
                accounts.get_user(0, 0)?,
                accounts.get_user(0, 1)?,
                accounts.get_contract(0, 0)?,
                1,
            )
        },
    )?;

    info!("{} scenarios submitted", battery.hashes.len());
    Ok(battery.hashes)
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::{
            error::{Error, LookupError},
            test_utils::{
                init_logging, test_assembler, test_assembler_without_contracts, test_coordinator,
            },
        },
        assert_matches::assert_matches,
        std::collections::HashMap,
    };

    const SPICA_SCENARIOS: usize = 6;
    const ALL_SCENARIOS: usize = 25;

    #[test]
    fn test_full_battery() {
        init_logging();
        let (network, mut assembler, _dir) = test_assembler();
        let coordinator = test_coordinator(&network);

        let hashes = run(&mut assembler, &coordinator, true).unwrap();
        let sent = network.sent();
        assert_eq!(hashes.len(), ALL_SCENARIOS);
        assert_eq!(sent.len(), ALL_SCENARIOS);
        assert_eq!(hashes, network.issued());
        assert!(sent.iter().all(SignedTransaction::verify_signature));

        // Top-level nonces of every sender strictly increase in submission order.
        let mut last_nonce: HashMap<Address, u64> = HashMap::new();
        for transaction in &sent {
            if let Some(previous) = last_nonce.insert(*transaction.sender(), transaction.nonce()) {
                assert!(transaction.nonce() > previous);
            }
        }

        let v3: Vec<&SignedTransaction> = sent
            .iter()
            .filter(|transaction| !transaction.inner_transactions().is_empty())
            .collect();
        assert_eq!(v3.len(), 5);
        assert!(v3
            .iter()
            .flat_map(|envelope| envelope.inner_transactions())
            .all(SignedTransaction::verify_signature));
    }

    #[test]
    fn test_battery_without_spica() {
        let (network, mut assembler, _dir) = test_assembler();
        let coordinator = test_coordinator(&network);

        let hashes = run(&mut assembler, &coordinator, false).unwrap();
        assert_eq!(hashes.len(), ALL_SCENARIOS - SPICA_SCENARIOS);
        assert!(network
            .sent()
            .iter()
            .all(|transaction| transaction.inner_transactions().is_empty()));
    }

    #[test]
    fn test_battery_stops_on_missing_contract() {
        let (network, mut assembler, _dir) = test_assembler_without_contracts();
        let coordinator = test_coordinator(&network);

        assert_matches!(
            run(&mut assembler, &coordinator, false),
            Err(Error::Lookup(LookupError::Contract { shard: 0, index: 0 }))
        );
        // The plain transfers before the first contract scenario went out.
        assert_eq!(network.sent().len(), 4);
    }

    #[test]
    fn test_battery_stops_on_first_failure() {
        let (network, mut assembler, _dir) = test_assembler();
        let coordinator = test_coordinator(&network);
        network.fail_requests(true);

        assert_matches!(
            run(&mut assembler, &coordinator, true),
            Err(Error::Network(_))
        );
        assert!(network.sent().is_empty());
    }
}
