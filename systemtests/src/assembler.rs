//! Builds, nonces and signs every transaction shape the scenarios submit.
//!
//! Each builder follows the same steps: resolve the accounts, reserve the
//! relayer's nonce when there is one, build the body through an SDK factory,
//! adjust gas on the draft, assign the sender's nonce, sign, and finally wrap
//! relayed bodies in an envelope signed by the relayer.
//!
//! Relayer nonces are reserved before any inner nonce. When the relayer is
//! also an inner sender, its envelope therefore carries the lower nonce and
//! is processed first.

use {
    crate::{
        accounts::{Account, AccountRegistry},
        config::TestContract,
        error::{ConfigError, Result, ValidationError},
        nonces::NonceTracker,
    },
    log::*,
    shardnet_sdk::{
        factories::{
            load_bytecode, CodeMetadata, IssueFungibleParams, RelayedTransactionsFactory,
            SmartContractTransactionsFactory, Token, TokenManagementTransactionsFactory,
            TokenTransfer, TransactionsFactoryConfig, TransferTransactionsFactory,
        },
        Address, FinalizedTransaction, NetworkProvider, SignedTransaction, TransactionDraft,
    },
    std::{path::PathBuf, rc::Rc},
};

// ─── Amounts ───

const SIMPLE_TRANSFER_AMOUNT: u128 = 42;
/// More than any test account holds.
const EXCESSIVE_TRANSFER_AMOUNT: u128 = 1_000_000_000_000_000_000_000_000;
const CUSTOM_TOKEN_AMOUNT_WITHIN_MULTI_TRANSFER: u128 = 7;
const NATIVE_AIRDROP_AMOUNT: u128 = 1_000_000_000_000_000_000;
const CUSTOM_AIRDROP_AMOUNT: u128 = 1_000_000;

const CUSTOM_TOKEN_INITIAL_SUPPLY: u128 = 1_000_000_000;
const CUSTOM_TOKEN_DECIMALS: u32 = 2;

// ─── Gas ───

/// Added to plain transfers so that part of the gas is refunded.
const EXTRA_GAS_FOR_REFUND: u64 = 42_000;
const CONTRACT_GAS_LIMIT: u64 = 5_000_000;
const CLAIM_DEVELOPER_REWARDS_GAS_LIMIT: u64 = 8_000_000;
const RELAYED_V2_INNER_GAS_LIMIT: u64 = 100_000;

// ─── Contract arguments ───

const ADDER_INITIAL_VALUE: [u128; 1] = [0];
/// Rejected by the adder constructor and by every function of the test contracts.
const SIGNAL_ERROR_ARGUMENTS: [u128; 5] = [1, 2, 3, 4, 5];

pub struct TransactionAssembler<P: ?Sized> {
    registry: Rc<AccountRegistry>,
    nonces: NonceTracker<P>,
    transfers: TransferTransactionsFactory,
    contracts: SmartContractTransactionsFactory,
    token_management: TokenManagementTransactionsFactory,
    relayed: RelayedTransactionsFactory,
    contracts_dir: PathBuf,
    custom_currency: Option<String>,
}

impl<P: NetworkProvider + ?Sized> TransactionAssembler<P> {
    pub fn new(
        registry: Rc<AccountRegistry>,
        nonces: NonceTracker<P>,
        factory_config: TransactionsFactoryConfig,
        contracts_dir: PathBuf,
    ) -> Self {
        Self {
            registry,
            nonces,
            transfers: TransferTransactionsFactory::new(factory_config.clone()),
            contracts: SmartContractTransactionsFactory::new(factory_config.clone()),
            token_management: TokenManagementTransactionsFactory::new(factory_config.clone()),
            relayed: RelayedTransactionsFactory::new(factory_config),
            contracts_dir,
            custom_currency: None,
        }
    }

    /// Token used by the custom-token builders.
    pub fn with_custom_currency(mut self, currency: impl Into<String>) -> Self {
        self.custom_currency = Some(currency.into());
        self
    }

    pub fn registry(&self) -> Rc<AccountRegistry> {
        self.registry.clone()
    }

    pub fn nonces(&self) -> &NonceTracker<P> {
        &self.nonces
    }

    // ─── Setup ───

    /// One native transfer from the sponsor to every user.
    pub fn create_airdrops_for_native_currency(&mut self) -> Result<Vec<SignedTransaction>> {
        let registry = self.registry.clone();
        let sponsor = registry.sponsor();
        registry
            .users()
            .iter()
            .map(|user| {
                let draft = self.transfers.create_transaction_for_native_token_transfer(
                    &sponsor.address,
                    &user.address,
                    NATIVE_AIRDROP_AMOUNT,
                );
                self.finalize_and_sign(draft)
            })
            .collect()
    }

    /// Issue a fungible token named and ticked `name`, owned by the sponsor.
    pub fn create_issue_fungible(&mut self, name: &str) -> Result<SignedTransaction> {
        let params = IssueFungibleParams::with_all_capabilities(
            name,
            name,
            CUSTOM_TOKEN_INITIAL_SUPPLY,
            CUSTOM_TOKEN_DECIMALS,
        );
        let draft = self
            .token_management
            .create_transaction_for_issuing_fungible(&self.registry.sponsor().address, &params);
        self.finalize_and_sign(draft)
    }

    /// One custom-token transfer from the sponsor to every user.
    pub fn create_airdrops_for_custom_currencies(&mut self) -> Result<Vec<SignedTransaction>> {
        let token = Token::fungible(self.custom_currency()?);
        let registry = self.registry.clone();
        let sponsor = registry.sponsor();
        registry
            .users()
            .iter()
            .map(|user| {
                let draft = self.transfers.create_transaction_for_esdt_token_transfer(
                    &sponsor.address,
                    &user.address,
                    &[TokenTransfer::new(token.clone(), CUSTOM_AIRDROP_AMOUNT)],
                );
                self.finalize_and_sign(draft)
            })
            .collect()
    }

    /// Deploy the adder from user 0 of every shard. Each deployment comes with
    /// the address the contract will have.
    pub fn create_contract_deployments(&mut self) -> Result<Vec<(SignedTransaction, Address)>> {
        let bytecode = self.bytecode(TestContract::Adder)?;
        let registry = self.registry.clone();
        let computer = *registry.address_computer();

        let mut deployments = Vec::new();
        for shard in 0..computer.num_shards() {
            let deployer = registry.get_user(shard, 0)?;
            let draft = self.contracts.create_transaction_for_deploy(
                &deployer.address,
                &bytecode,
                CONTRACT_GAS_LIMIT,
                &ADDER_INITIAL_VALUE,
                0,
                CodeMetadata::default(),
            );
            let transaction = self.finalize_and_sign(draft)?;
            let contract = computer.compute_contract_address(&deployer.address, transaction.nonce());
            info!("shard {shard}: adder will be deployed at {contract}");
            deployments.push((transaction, contract));
        }
        Ok(deployments)
    }

    // ─── Transfers ───

    pub fn create_simple_move_balance_with_refund(
        &mut self,
        sender: &Account,
        receiver: &Address,
    ) -> Result<SignedTransaction> {
        let mut draft = self.transfers.create_transaction_for_native_token_transfer(
            &sender.address,
            receiver,
            SIMPLE_TRANSFER_AMOUNT,
        );
        draft.gas_limit = draft.gas_limit.saturating_add(EXTRA_GAS_FOR_REFUND);
        self.finalize_and_sign(draft)
    }

    /// Same as [`Self::create_simple_move_balance_with_refund`], for an amount
    /// the sender cannot afford.
    pub fn create_invalid_move_balance_with_refund(
        &mut self,
        sender: &Account,
        receiver: &Address,
    ) -> Result<SignedTransaction> {
        let mut draft = self.transfers.create_transaction_for_native_token_transfer(
            &sender.address,
            receiver,
            EXCESSIVE_TRANSFER_AMOUNT,
        );
        draft.gas_limit = draft.gas_limit.saturating_add(EXTRA_GAS_FOR_REFUND);
        self.finalize_and_sign(draft)
    }

    pub fn create_native_transfer_within_multiesdt(
        &mut self,
        sender: &Account,
        receiver: &Address,
    ) -> Result<SignedTransaction> {
        let token = Token::fungible(self.custom_currency()?);
        let draft = self.transfers.create_transaction_for_transfer(
            &sender.address,
            receiver,
            SIMPLE_TRANSFER_AMOUNT,
            &[TokenTransfer::new(token, CUSTOM_TOKEN_AMOUNT_WITHIN_MULTI_TRANSFER)],
        );
        self.finalize_and_sign(draft)
    }

    // ─── Relayed ───

    pub fn create_relayed_v1_with_move_balance(
        &mut self,
        relayer: &Account,
        sender: &Account,
        receiver: &Address,
        amount: u128,
    ) -> Result<SignedTransaction> {
        let relayer_nonce = self.reserve_relayer_nonce(relayer, [sender])?;

        let inner_draft = self.transfers.create_transaction_for_native_token_transfer(
            &sender.address,
            receiver,
            amount,
        );
        let inner = self.finalize_and_sign(inner_draft)?;

        let envelope = self
            .relayed
            .create_relayed_v1_transaction(&inner, &relayer.address)?;
        self.sign(envelope.finalize(relayer_nonce))
    }

    pub fn create_relayed_v1_with_esdt_transfer(
        &mut self,
        relayer: &Account,
        sender: &Account,
        receiver: &Address,
        amount: u128,
    ) -> Result<SignedTransaction> {
        let token = Token::fungible(self.custom_currency()?);
        let relayer_nonce = self.reserve_relayer_nonce(relayer, [sender])?;

        let inner_draft = self.transfers.create_transaction_for_esdt_token_transfer(
            &sender.address,
            receiver,
            &[TokenTransfer::new(token, amount)],
        );
        let inner = self.finalize_and_sign(inner_draft)?;

        let envelope = self
            .relayed
            .create_relayed_v1_transaction(&inner, &relayer.address)?;
        self.sign(envelope.finalize(relayer_nonce))
    }

    /// The inner transaction carries no gas; the envelope pays for its execution.
    pub fn create_relayed_v2_with_move_balance(
        &mut self,
        relayer: &Account,
        sender: &Account,
        receiver: &Address,
        amount: u128,
    ) -> Result<SignedTransaction> {
        let relayer_nonce = self.reserve_relayer_nonce(relayer, [sender])?;

        let mut inner_draft = self.transfers.create_transaction_for_native_token_transfer(
            &sender.address,
            receiver,
            amount,
        );
        inner_draft.gas_limit = 0;
        let inner = self.finalize_and_sign(inner_draft)?;

        let envelope = self.relayed.create_relayed_v2_transaction(
            &inner,
            RELAYED_V2_INNER_GAS_LIMIT,
            &relayer.address,
        )?;
        self.sign(envelope.finalize(relayer_nonce))
    }

    /// Pairs `senders[i]` with `receivers[i]`, one inner transfer each.
    pub fn create_relayed_v3_with_a_few_inner_move_balances(
        &mut self,
        relayer: &Account,
        senders: &[Account],
        receivers: &[Address],
        amount: u128,
    ) -> Result<SignedTransaction> {
        if senders.len() != receivers.len() {
            return Err(ValidationError::MismatchedInnerTransactions {
                senders: senders.len(),
                receivers: receivers.len(),
            }
            .into());
        }
        if senders.is_empty() {
            return Err(ValidationError::NoInnerTransactions.into());
        }
        let relayer_nonce = self.reserve_relayer_nonce(relayer, senders)?;

        let mut inner_transactions = Vec::with_capacity(senders.len());
        for (sender, receiver) in senders.iter().zip(receivers) {
            let mut inner_draft = self.transfers.create_transaction_for_native_token_transfer(
                &sender.address,
                receiver,
                amount,
            );
            inner_draft.relayer = Some(relayer.address);
            inner_transactions.push(self.finalize_and_sign(inner_draft)?);
        }

        let envelope = self
            .relayed
            .create_relayed_v3_transaction(&relayer.address, &inner_transactions)?;
        self.sign(envelope.finalize(relayer_nonce))
    }

    // ─── Contracts ───

    pub fn create_contract_deployment_with_move_balance(
        &mut self,
        sender: &Account,
        amount: u128,
    ) -> Result<SignedTransaction> {
        let bytecode = self.bytecode(TestContract::Dummy)?;
        let draft = self.contracts.create_transaction_for_deploy(
            &sender.address,
            &bytecode,
            CONTRACT_GAS_LIMIT,
            &ADDER_INITIAL_VALUE,
            amount,
            CodeMetadata::default(),
        );
        self.finalize_and_sign(draft)
    }

    pub fn create_contract_deployment_with_move_balance_with_signal_error(
        &mut self,
        sender: &Account,
        amount: u128,
    ) -> Result<SignedTransaction> {
        let bytecode = self.bytecode(TestContract::Adder)?;
        let draft = self.contracts.create_transaction_for_deploy(
            &sender.address,
            &bytecode,
            CONTRACT_GAS_LIMIT,
            &SIGNAL_ERROR_ARGUMENTS,
            amount,
            CodeMetadata::default(),
        );
        self.finalize_and_sign(draft)
    }

    pub fn create_contract_call_with_move_balance_with_signal_error(
        &mut self,
        sender: &Account,
        contract: &Address,
        amount: u128,
    ) -> Result<SignedTransaction> {
        let draft = self.contracts.create_transaction_for_execute(
            &sender.address,
            contract,
            "missingFunction",
            CONTRACT_GAS_LIMIT,
            &SIGNAL_ERROR_ARGUMENTS,
            amount,
        );
        self.finalize_and_sign(draft)
    }

    pub fn create_claim_developer_rewards_on_directly_owned_contract(
        &mut self,
        sender: &Account,
        contract: &Address,
    ) -> Result<SignedTransaction> {
        let draft = self.contracts.create_transaction_for_execute(
            &sender.address,
            contract,
            "ClaimDeveloperRewards",
            CLAIM_DEVELOPER_REWARDS_GAS_LIMIT,
            &[],
            0,
        );
        self.finalize_and_sign(draft)
    }

    pub fn create_relayed_v1_with_contract_call_with_move_balance_with_signal_error(
        &mut self,
        relayer: &Account,
        sender: &Account,
        contract: &Address,
        amount: u128,
    ) -> Result<SignedTransaction> {
        let relayer_nonce = self.reserve_relayer_nonce(relayer, [sender])?;

        let inner_draft = self.contracts.create_transaction_for_execute(
            &sender.address,
            contract,
            "add",
            CONTRACT_GAS_LIMIT,
            &SIGNAL_ERROR_ARGUMENTS,
            amount,
        );
        let inner = self.finalize_and_sign(inner_draft)?;

        let envelope = self
            .relayed
            .create_relayed_v1_transaction(&inner, &relayer.address)?;
        self.sign(envelope.finalize(relayer_nonce))
    }

    // ─── Nonces and signing ───

    /// Must run before any inner transaction of the same structure is nonced.
    /// Inner senders are resolved first, so a lookup failure reserves nothing.
    fn reserve_relayer_nonce<'a>(
        &mut self,
        relayer: &Account,
        inner_senders: impl IntoIterator<Item = &'a Account>,
    ) -> Result<u64> {
        for sender in inner_senders {
            self.registry.get_by_address(&sender.address)?;
        }
        let address = self.registry.get_by_address(&relayer.address)?.address;
        let nonce = self.nonces.get_then_increment(&address)?;
        debug!("relayer {address} reserved nonce {nonce}");
        Ok(nonce)
    }

    fn apply_nonce(&mut self, draft: TransactionDraft) -> Result<FinalizedTransaction> {
        let address = self.registry.get_by_address(&draft.sender)?.address;
        let nonce = self.nonces.get_then_increment(&address)?;
        Ok(draft.finalize(nonce))
    }

    fn sign(&self, transaction: FinalizedTransaction) -> Result<SignedTransaction> {
        let account = self.registry.get_by_address(transaction.sender())?;
        Ok(transaction.sign(&account.signer)?)
    }

    fn finalize_and_sign(&mut self, draft: TransactionDraft) -> Result<SignedTransaction> {
        let finalized = self.apply_nonce(draft)?;
        self.sign(finalized)
    }

    fn custom_currency(&self) -> Result<&str> {
        self.custom_currency
            .as_deref()
            .ok_or_else(|| ConfigError::MissingCustomCurrency.into())
    }

    fn bytecode(&self, contract: TestContract) -> Result<Vec<u8>> {
        Ok(load_bytecode(&self.contracts_dir.join(contract.file_name()))?)
    }
}
