use {
    super::{
        args::{build_data, encode_unsigned},
        config::TransactionsFactoryConfig,
    },
    crate::{
        address::Address,
        error::{Result, SdkError},
        transaction::TransactionDraft,
    },
    std::path::Path,
};

/// Flags stored alongside deployed code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodeMetadata {
    pub upgradeable: bool,
    pub readable: bool,
    pub payable: bool,
    pub payable_by_contract: bool,
}

impl Default for CodeMetadata {
    fn default() -> Self {
        Self {
            upgradeable: true,
            readable: true,
            payable: false,
            payable_by_contract: false,
        }
    }
}

impl CodeMetadata {
    pub fn to_bytes(self) -> [u8; 2] {
        let mut first = 0u8;
        let mut second = 0u8;
        if self.upgradeable {
            first |= 0x01;
        }
        if self.readable {
            first |= 0x04;
        }
        if self.payable {
            second |= 0x02;
        }
        if self.payable_by_contract {
            second |= 0x04;
        }
        [first, second]
    }
}

/// Marker for the WASM virtual machine in deploy payloads.
const VM_TYPE: &str = "0500";

pub fn load_bytecode(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).map_err(|source| SdkError::Bytecode {
        path: path.display().to_string(),
        source,
    })
}

/// Builds contract deployments and calls.
#[derive(Debug, Clone)]
pub struct SmartContractTransactionsFactory {
    config: TransactionsFactoryConfig,
}

impl SmartContractTransactionsFactory {
    pub fn new(config: TransactionsFactoryConfig) -> Self {
        Self { config }
    }

    pub fn create_transaction_for_deploy(
        &self,
        sender: &Address,
        bytecode: &[u8],
        gas_limit: u64,
        arguments: &[u128],
        native_transfer_amount: u128,
        metadata: CodeMetadata,
    ) -> TransactionDraft {
        let mut args = vec![
            hex::encode(bytecode),
            VM_TYPE.to_string(),
            hex::encode(metadata.to_bytes()),
        ];
        args.extend(arguments.iter().copied().map(encode_unsigned));
        let data = args.join("@").into_bytes();

        self.draft(sender, &Address::ZERO, data, gas_limit, native_transfer_amount)
    }

    pub fn create_transaction_for_execute(
        &self,
        sender: &Address,
        contract: &Address,
        function: &str,
        gas_limit: u64,
        arguments: &[u128],
        native_transfer_amount: u128,
    ) -> TransactionDraft {
        let data = build_data(function, arguments.iter().copied().map(encode_unsigned));
        self.draft(sender, contract, data, gas_limit, native_transfer_amount)
    }

    fn draft(
        &self,
        sender: &Address,
        receiver: &Address,
        data: Vec<u8>,
        gas_limit: u64,
        value: u128,
    ) -> TransactionDraft {
        let mut draft = TransactionDraft::new(*sender, *receiver, &self.config.chain_id);
        draft.gas_limit = gas_limit;
        draft.gas_price = self.config.min_gas_price;
        draft.value = value;
        draft.data = data;
        draft
    }
}
