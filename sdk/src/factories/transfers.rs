use {
    super::{
        args::{build_data, encode_str, encode_unsigned},
        config::TransactionsFactoryConfig,
    },
    crate::{address::Address, transaction::TransactionDraft},
};

/// Identifier under which the native currency travels inside multi-token transfers.
pub const NATIVE_TOKEN_IDENTIFIER: &str = "NATIVE-000000";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub identifier: String,
    /// Zero for fungible tokens.
    pub nonce: u64,
}

impl Token {
    pub fn fungible(identifier: &str) -> Self {
        Self {
            identifier: identifier.to_string(),
            nonce: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenTransfer {
    pub token: Token,
    pub amount: u128,
}

impl TokenTransfer {
    pub fn new(token: Token, amount: u128) -> Self {
        Self { token, amount }
    }
}

/// Builds native and token transfer transactions.
#[derive(Debug, Clone)]
pub struct TransferTransactionsFactory {
    config: TransactionsFactoryConfig,
}

impl TransferTransactionsFactory {
    pub fn new(config: TransactionsFactoryConfig) -> Self {
        Self { config }
    }

    pub fn create_transaction_for_native_token_transfer(
        &self,
        sender: &Address,
        receiver: &Address,
        native_amount: u128,
    ) -> TransactionDraft {
        let mut draft = self.draft(sender, receiver, Vec::new(), 0);
        draft.value = native_amount;
        draft
    }

    pub fn create_transaction_for_esdt_token_transfer(
        &self,
        sender: &Address,
        receiver: &Address,
        token_transfers: &[TokenTransfer],
    ) -> TransactionDraft {
        match token_transfers {
            [single] if single.token.nonce == 0 => {
                let data = build_data(
                    "ESDTTransfer",
                    [
                        encode_str(&single.token.identifier),
                        encode_unsigned(single.amount),
                    ],
                );
                let extra = self
                    .config
                    .gas_limit_esdt_transfer
                    .saturating_add(self.config.additional_gas_for_esdt_transfer);
                self.draft(sender, receiver, data, extra)
            }
            _ => self.multi_transfer(sender, receiver, token_transfers),
        }
    }

    /// Native amount and tokens in one transaction. A non-zero native amount
    /// next to tokens is carried as one more entry of a multi-token transfer.
    pub fn create_transaction_for_transfer(
        &self,
        sender: &Address,
        receiver: &Address,
        native_amount: u128,
        token_transfers: &[TokenTransfer],
    ) -> TransactionDraft {
        if token_transfers.is_empty() {
            return self.create_transaction_for_native_token_transfer(
                sender,
                receiver,
                native_amount,
            );
        }
        if native_amount == 0 {
            return self.create_transaction_for_esdt_token_transfer(
                sender,
                receiver,
                token_transfers,
            );
        }

        let mut transfers = token_transfers.to_vec();
        transfers.push(TokenTransfer::new(
            Token::fungible(NATIVE_TOKEN_IDENTIFIER),
            native_amount,
        ));
        self.multi_transfer(sender, receiver, &transfers)
    }

    fn multi_transfer(
        &self,
        sender: &Address,
        receiver: &Address,
        token_transfers: &[TokenTransfer],
    ) -> TransactionDraft {
        let mut args = vec![
            receiver.to_hex(),
            encode_unsigned(token_transfers.len() as u128),
        ];
        for transfer in token_transfers {
            args.push(encode_str(&transfer.token.identifier));
            args.push(encode_unsigned(u128::from(transfer.token.nonce)));
            args.push(encode_unsigned(transfer.amount));
        }
        let data = build_data("MultiESDTNFTTransfer", args);
        let extra = self
            .config
            .gas_limit_multi_esdt_nft_transfer
            .saturating_mul(token_transfers.len() as u64)
            .saturating_add(self.config.additional_gas_for_esdt_nft_transfer);

        // Multi-token transfers are self-addressed; the real receiver is in the payload.
        self.draft(sender, sender, data, extra)
    }

    fn draft(
        &self,
        sender: &Address,
        receiver: &Address,
        data: Vec<u8>,
        extra_gas: u64,
    ) -> TransactionDraft {
        let mut draft = TransactionDraft::new(*sender, *receiver, &self.config.chain_id);
        draft.gas_limit = self
            .config
            .gas_for_data(data.len())
            .saturating_add(extra_gas);
        draft.gas_price = self.config.min_gas_price;
        draft.data = data;
        draft
    }
}
