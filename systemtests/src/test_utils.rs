//! Shared fixtures: an in-memory network and deterministic accounts.

use {
    crate::{
        accounts::AccountRegistry, assembler::TransactionAssembler, config::Configuration,
        config::TestContract, coordinator::Coordinator, nonces::NonceTracker,
    },
    shardnet_sdk::{
        factories::TransactionsFactoryConfig, AccountOnNetwork, Address, AddressComputer,
        NetworkError, NetworkProvider, NetworkResult, SignedTransaction, TransactionAwaiter,
        TransactionDraft, TransactionEvent, TransactionOnNetwork, TransactionStatus,
        UserSecretKey, UserSigner,
    },
    std::{
        cell::{Cell, RefCell},
        collections::{HashMap, HashSet},
        path::PathBuf,
        rc::Rc,
        time::Duration,
    },
    tempfile::TempDir,
};

pub const TEST_MNEMONIC: &str =
    "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";
pub const TEST_CHAIN_ID: &str = "localnet";
pub const TEST_CURRENCY: &str = "ROSETTA-3833de";

const TEST_NUM_SHARDS: u32 = 3;
const USERS_PER_SHARD: usize = 10;

pub fn init_logging() {
    let _ = env_logger::builder()
        .is_test(true)
        .filter_level(log::LevelFilter::Info)
        .try_init();
}

/// In-memory [`NetworkProvider`] recording every request it serves.
///
/// Unknown accounts have nonce 0. Accepted transactions get hashes of the
/// form `network-hash-{n}`, unrelated to their local hash, and only those
/// hashes can be polled. Every transaction is reported completed with the
/// configured status and events.
pub struct FakeNetwork {
    nonces: RefCell<HashMap<Address, u64>>,
    fetched: RefCell<Vec<Address>>,
    sent: RefCell<Vec<SignedTransaction>>,
    issued: RefCell<Vec<String>>,
    rejected_in_batch: RefCell<HashSet<usize>>,
    polled: RefCell<Vec<String>>,
    status: RefCell<TransactionStatus>,
    events: RefCell<Vec<TransactionEvent>>,
    failing: Cell<bool>,
}

impl Default for FakeNetwork {
    fn default() -> Self {
        Self {
            nonces: RefCell::default(),
            fetched: RefCell::default(),
            sent: RefCell::default(),
            issued: RefCell::default(),
            rejected_in_batch: RefCell::default(),
            polled: RefCell::default(),
            status: RefCell::new(TransactionStatus::new("success")),
            events: RefCell::default(),
            failing: Cell::new(false),
        }
    }
}

impl FakeNetwork {
    pub fn set_nonce(&self, address: &Address, nonce: u64) {
        self.nonces.borrow_mut().insert(*address, nonce);
    }

    pub fn set_status(&self, status: TransactionStatus) {
        *self.status.borrow_mut() = status;
    }

    pub fn set_events(&self, events: Vec<TransactionEvent>) {
        *self.events.borrow_mut() = events;
    }

    /// Reject the transactions at `indices` of every following batch.
    pub fn reject_in_batch(&self, indices: &[usize]) {
        *self.rejected_in_batch.borrow_mut() = indices.iter().copied().collect();
    }

    /// Make every request fail with an API error.
    pub fn fail_requests(&self, failing: bool) {
        self.failing.set(failing);
    }

    /// Accounts fetched so far, in request order.
    pub fn fetched(&self) -> Vec<Address> {
        self.fetched.borrow().clone()
    }

    pub fn sent(&self) -> Vec<SignedTransaction> {
        self.sent.borrow().clone()
    }

    /// Hashes handed out for accepted transactions, in acceptance order.
    pub fn issued(&self) -> Vec<String> {
        self.issued.borrow().clone()
    }

    pub fn polled(&self) -> Vec<String> {
        self.polled.borrow().clone()
    }

    fn check(&self, url: &str) -> NetworkResult<()> {
        if self.failing.get() {
            return Err(NetworkError::Api {
                url: url.to_string(),
                code: "internal_issue".to_string(),
                message: "fake network is down".to_string(),
            });
        }
        Ok(())
    }
}

impl NetworkProvider for FakeNetwork {
    fn get_account(&self, address: &Address) -> NetworkResult<AccountOnNetwork> {
        self.check("address")?;
        self.fetched.borrow_mut().push(*address);
        Ok(AccountOnNetwork {
            address: *address,
            nonce: self.nonces.borrow().get(address).copied().unwrap_or_default(),
            balance: 0,
        })
    }

    fn send_transaction(&self, transaction: &SignedTransaction) -> NetworkResult<String> {
        self.check("transaction/send")?;
        let hash = format!("network-hash-{}", self.issued.borrow().len());
        self.sent.borrow_mut().push(transaction.clone());
        self.issued.borrow_mut().push(hash.clone());
        Ok(hash)
    }

    fn send_transactions(
        &self,
        transactions: &[SignedTransaction],
    ) -> NetworkResult<Vec<Option<String>>> {
        self.check("transaction/send-multiple")?;
        let rejected = self.rejected_in_batch.borrow().clone();
        transactions
            .iter()
            .enumerate()
            .map(|(index, transaction)| {
                if rejected.contains(&index) {
                    Ok(None)
                } else {
                    self.send_transaction(transaction).map(Some)
                }
            })
            .collect()
    }

    fn get_transaction(
        &self,
        hash: &str,
        with_process_status: bool,
    ) -> NetworkResult<TransactionOnNetwork> {
        assert!(with_process_status);
        self.check("transaction")?;
        self.polled.borrow_mut().push(hash.to_string());
        if !self.issued.borrow().iter().any(|issued| issued == hash) {
            return Err(NetworkError::Api {
                url: format!("transaction/{hash}"),
                code: "not_found".to_string(),
                message: "transaction not found".to_string(),
            });
        }
        Ok(TransactionOnNetwork {
            hash: hash.to_string(),
            status: self.status.borrow().clone(),
            events: self.events.borrow().clone(),
        })
    }
}

pub fn test_configuration() -> Configuration {
    Configuration {
        network_id: TEST_CHAIN_ID.to_string(),
        proxy_url: "http://localhost:7950".to_string(),
        explorer_url: "http://localhost:3002".to_string(),
        sponsor_secret_key: "07".repeat(32),
        users_mnemonic: TEST_MNEMONIC.to_string(),
        config_file_custom_currencies: PathBuf::from("currencies.json"),
        known_contracts: vec![],
        num_shards: TEST_NUM_SHARDS,
        num_users: 4,
        contracts_dir: PathBuf::from("contracts"),
    }
}

fn signer(secret: [u8; 32]) -> UserSigner {
    UserSigner::new(UserSecretKey::from_bytes(&secret).unwrap())
}

/// Users from fixed secrets, `USERS_PER_SHARD` in every shard.
fn test_users() -> Vec<UserSigner> {
    let computer = AddressComputer::new(TEST_NUM_SHARDS);
    let mut per_shard = [0usize; TEST_NUM_SHARDS as usize];
    let mut users = Vec::new();
    let mut seed = 0u64;
    while per_shard.iter().any(|count| *count < USERS_PER_SHARD) {
        seed += 1;
        let mut secret = [0x11u8; 32];
        secret[..8].copy_from_slice(&seed.to_le_bytes());
        let user = signer(secret);
        let shard = computer.shard_of(user.address()) as usize;
        if per_shard[shard] < USERS_PER_SHARD {
            per_shard[shard] += 1;
            users.push(user);
        }
    }
    users
}

fn registry(with_contracts: bool) -> AccountRegistry {
    let computer = AddressComputer::new(TEST_NUM_SHARDS);
    let users = test_users();
    let contracts = if with_contracts {
        (0..TEST_NUM_SHARDS)
            .filter_map(|shard| {
                users
                    .iter()
                    .find(|user| computer.shard_of(user.address()) == shard)
                    .map(|deployer| computer.compute_contract_address(deployer.address(), 0))
            })
            .collect()
    } else {
        vec![]
    };
    AccountRegistry::new(signer([0x5a; 32]), users, contracts, computer)
}

/// Ten users and one known contract in each of three shards.
pub fn test_registry() -> AccountRegistry {
    registry(true)
}

fn write_contracts(dir: &TempDir) {
    for contract in [TestContract::Adder, TestContract::Dummy] {
        let mut bytecode = b"\0asm\x01\0\0\0".to_vec();
        bytecode.extend_from_slice(contract.file_name().as_bytes());
        std::fs::write(dir.path().join(contract.file_name()), bytecode).unwrap();
    }
}

fn assembler(
    with_contracts: bool,
) -> (Rc<FakeNetwork>, TransactionAssembler<FakeNetwork>, TempDir) {
    let network = Rc::new(FakeNetwork::default());
    let dir = tempfile::tempdir().unwrap();
    write_contracts(&dir);
    let assembler = TransactionAssembler::new(
        Rc::new(registry(with_contracts)),
        NonceTracker::new(network.clone()),
        TransactionsFactoryConfig::new(TEST_CHAIN_ID),
        dir.path().to_path_buf(),
    )
    .with_custom_currency(TEST_CURRENCY);
    (network, assembler, dir)
}

/// Assembler over [`test_registry`] with bytecode written to a temporary
/// directory, which lives as long as the returned handle.
pub fn test_assembler() -> (Rc<FakeNetwork>, TransactionAssembler<FakeNetwork>, TempDir) {
    assembler(true)
}

pub fn test_assembler_without_contracts(
) -> (Rc<FakeNetwork>, TransactionAssembler<FakeNetwork>, TempDir) {
    assembler(false)
}

pub fn test_coordinator(network: &Rc<FakeNetwork>) -> Coordinator<FakeNetwork> {
    Coordinator::new(
        network.clone(),
        "http://localhost:3002",
        TransactionAwaiter::new(Duration::ZERO, Duration::from_secs(5)),
    )
}

/// `count` signed transfers from one key, with nonces `0..count`.
pub fn signed_transfers(count: u64) -> Vec<SignedTransaction> {
    let sender = signer([0x42; 32]);
    (0..count)
        .map(|nonce| {
            let mut draft = TransactionDraft::new(*sender.address(), Address::new([1; 32]), TEST_CHAIN_ID);
            draft.value = u128::from(nonce) + 1;
            draft.gas_limit = 50_000;
            draft.finalize(nonce).sign(&sender).unwrap()
        })
        .collect()
}
