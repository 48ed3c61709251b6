//! Relayed envelopes, where a relayer pays gas on behalf of inner senders.
//!
//! - v1: the signed inner transaction is embedded as JSON in the envelope payload.
//! - v2: the inner transaction carries no gas; the envelope holds the budget.
//! - v3: one self-addressed envelope lists several inner transactions, each
//!   already tagged with the relayer address.
//!
//! Envelopes are returned as drafts: the caller assigns the relayer nonce and
//! signs them.

use {
    super::{
        args::{build_data, encode_unsigned},
        config::TransactionsFactoryConfig,
    },
    crate::{
        address::Address,
        error::{Result, SdkError},
        transaction::{SignedTransaction, TransactionDraft},
    },
};

#[derive(Debug, Clone)]
pub struct RelayedTransactionsFactory {
    config: TransactionsFactoryConfig,
}

impl RelayedTransactionsFactory {
    pub fn new(config: TransactionsFactoryConfig) -> Self {
        Self { config }
    }

    pub fn create_relayed_v1_transaction(
        &self,
        inner_transaction: &SignedTransaction,
        relayer_address: &Address,
    ) -> Result<TransactionDraft> {
        let serialized = serde_json::to_vec(&inner_transaction.to_wire())?;
        let data = format!("relayedTx@{}", hex::encode(serialized)).into_bytes();

        let mut draft = self.envelope(relayer_address, inner_transaction, data);
        draft.gas_limit = draft.gas_limit.saturating_add(inner_transaction.gas_limit());
        Ok(draft)
    }

    pub fn create_relayed_v2_transaction(
        &self,
        inner_transaction: &SignedTransaction,
        inner_transaction_gas_limit: u64,
        relayer_address: &Address,
    ) -> Result<TransactionDraft> {
        if inner_transaction.gas_limit() != 0 {
            return Err(SdkError::InvalidRelayedTransaction(format!(
                "relayed v2 inner transaction must have zero gas limit, got {}",
                inner_transaction.gas_limit()
            )));
        }

        let data = build_data(
            "relayedTxV2",
            [
                inner_transaction.receiver().to_hex(),
                encode_unsigned(u128::from(inner_transaction.nonce())),
                hex::encode(inner_transaction.data()),
                hex::encode(inner_transaction.signature()),
            ],
        );

        let mut draft = self.envelope(relayer_address, inner_transaction, data);
        draft.gas_limit = draft.gas_limit.saturating_add(inner_transaction_gas_limit);
        Ok(draft)
    }

    pub fn create_relayed_v3_transaction(
        &self,
        relayer_address: &Address,
        inner_transactions: &[SignedTransaction],
    ) -> Result<TransactionDraft> {
        if inner_transactions.is_empty() {
            return Err(SdkError::InvalidRelayedTransaction(
                "relayed v3 requires at least one inner transaction".to_string(),
            ));
        }
        if let Some(untagged) = inner_transactions
            .iter()
            .find(|inner| inner.relayer() != Some(relayer_address))
        {
            return Err(SdkError::InvalidRelayedTransaction(format!(
                "inner transaction from {} is not tagged with relayer {relayer_address}",
                untagged.sender()
            )));
        }

        let count = inner_transactions.len() as u64;
        let inner_gas = inner_transactions
            .iter()
            .fold(0u64, |total, inner| total.saturating_add(inner.gas_limit()));

        let mut draft = TransactionDraft::new(*relayer_address, *relayer_address, &self.config.chain_id);
        draft.gas_price = self.config.min_gas_price;
        draft.gas_limit = self
            .config
            .min_gas_limit
            .saturating_mul(count)
            .saturating_add(inner_gas);
        draft.inner_transactions = inner_transactions.to_vec();
        Ok(draft)
    }

    fn envelope(
        &self,
        relayer_address: &Address,
        inner_transaction: &SignedTransaction,
        data: Vec<u8>,
    ) -> TransactionDraft {
        let mut draft = TransactionDraft::new(
            *relayer_address,
            *inner_transaction.sender(),
            &self.config.chain_id,
        );
        draft.gas_limit = self.config.gas_for_data(data.len());
        draft.gas_price = inner_transaction.gas_price();
        draft.data = data;
        draft
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::keys::{UserSecretKey, UserSigner},
        assert_matches::assert_matches,
    };

    fn signer(seed: u8) -> UserSigner {
        UserSigner::new(UserSecretKey::from_bytes(&[seed; 32]).unwrap())
    }

    fn factory() -> RelayedTransactionsFactory {
        RelayedTransactionsFactory::new(TransactionsFactoryConfig::new("T"))
    }

    fn inner(sender: &UserSigner, gas_limit: u64, relayer: Option<Address>) -> SignedTransaction {
        let mut draft = TransactionDraft::new(*sender.address(), Address::new([9; 32]), "T");
        draft.value = 42;
        draft.gas_limit = gas_limit;
        draft.gas_price = 1_000_000_000;
        draft.relayer = relayer;
        draft.finalize(5).sign(sender).unwrap()
    }

    #[test]
    fn test_relayed_v1_embeds_signed_inner() {
        let sender = signer(1);
        let relayer = signer(2);
        let inner = inner(&sender, 50_000, None);
        let draft = factory()
            .create_relayed_v1_transaction(&inner, relayer.address())
            .unwrap();

        let data = String::from_utf8(draft.data.clone()).unwrap();
        let embedded = hex::decode(data.strip_prefix("relayedTx@").unwrap()).unwrap();
        let embedded: serde_json::Value = serde_json::from_slice(&embedded).unwrap();
        assert_eq!(embedded["nonce"], 5);
        assert_eq!(embedded["signature"], hex::encode(inner.signature()));

        assert_eq!(draft.sender, *relayer.address());
        assert_eq!(draft.receiver, *sender.address());
        assert_eq!(draft.value, 0);
        assert_eq!(
            draft.gas_limit,
            50_000 + 1_500 * data.len() as u64 + inner.gas_limit()
        );
    }

    #[test]
    fn test_relayed_v2_requires_zero_inner_gas() {
        let sender = signer(1);
        let relayer = signer(2);
        assert_matches!(
            factory().create_relayed_v2_transaction(&inner(&sender, 50_000, None), 100_000, relayer.address()),
            Err(SdkError::InvalidRelayedTransaction(_))
        );

        let inner = inner(&sender, 0, None);
        let draft = factory()
            .create_relayed_v2_transaction(&inner, 100_000, relayer.address())
            .unwrap();
        let data = String::from_utf8(draft.data.clone()).unwrap();
        let parts: Vec<&str> = data.split('@').collect();
        assert_eq!(parts[0], "relayedTxV2");
        assert_eq!(parts[1], inner.receiver().to_hex());
        assert_eq!(parts[2], "05");
        assert_eq!(parts[4], hex::encode(inner.signature()));
        assert_eq!(draft.gas_limit, 50_000 + 1_500 * data.len() as u64 + 100_000);
    }

    #[test]
    fn test_relayed_v3_carries_tagged_inner_transactions() {
        let relayer = signer(3);
        let first = inner(&signer(1), 50_000, Some(*relayer.address()));
        let second = inner(&signer(2), 50_000, Some(*relayer.address()));
        let draft = factory()
            .create_relayed_v3_transaction(relayer.address(), &[first.clone(), second.clone()])
            .unwrap();

        assert_eq!(draft.sender, *relayer.address());
        assert_eq!(draft.receiver, *relayer.address());
        assert_eq!(draft.inner_transactions, vec![first, second]);
        assert_eq!(draft.gas_limit, 2 * 50_000 + 2 * 50_000);
    }

    #[test]
    fn test_relayed_v3_rejects_untagged_or_empty() {
        let relayer = signer(3);
        assert_matches!(
            factory().create_relayed_v3_transaction(relayer.address(), &[]),
            Err(SdkError::InvalidRelayedTransaction(_))
        );
        let untagged = inner(&signer(1), 50_000, None);
        assert_matches!(
            factory().create_relayed_v3_transaction(relayer.address(), &[untagged]),
            Err(SdkError::InvalidRelayedTransaction(_))
        );
    }
}
