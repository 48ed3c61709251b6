use {
    super::{
        args::{build_data, encode_bool, encode_str, encode_unsigned},
        config::TransactionsFactoryConfig,
    },
    crate::{address::Address, network::TransactionOnNetwork, transaction::TransactionDraft},
};

/// Parameters of a fungible token issuance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueFungibleParams {
    pub token_name: String,
    pub token_ticker: String,
    pub initial_supply: u128,
    pub num_decimals: u32,
    pub can_freeze: bool,
    pub can_wipe: bool,
    pub can_pause: bool,
    pub can_change_owner: bool,
    pub can_upgrade: bool,
    pub can_add_special_roles: bool,
}

impl IssueFungibleParams {
    /// Every capability switched on.
    pub fn with_all_capabilities(name: &str, ticker: &str, initial_supply: u128, num_decimals: u32) -> Self {
        Self {
            token_name: name.to_string(),
            token_ticker: ticker.to_string(),
            initial_supply,
            num_decimals,
            can_freeze: true,
            can_wipe: true,
            can_pause: true,
            can_change_owner: true,
            can_upgrade: true,
            can_add_special_roles: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TokenManagementTransactionsFactory {
    config: TransactionsFactoryConfig,
}

impl TokenManagementTransactionsFactory {
    pub fn new(config: TransactionsFactoryConfig) -> Self {
        Self { config }
    }

    pub fn create_transaction_for_issuing_fungible(
        &self,
        sender: &Address,
        params: &IssueFungibleParams,
    ) -> TransactionDraft {
        let mut args = vec![
            encode_str(&params.token_name),
            encode_str(&params.token_ticker),
            encode_unsigned(params.initial_supply),
            encode_unsigned(u128::from(params.num_decimals)),
        ];
        for (name, value) in [
            ("canFreeze", params.can_freeze),
            ("canWipe", params.can_wipe),
            ("canPause", params.can_pause),
            ("canChangeOwner", params.can_change_owner),
            ("canUpgrade", params.can_upgrade),
            ("canAddSpecialRoles", params.can_add_special_roles),
        ] {
            args.push(encode_str(name));
            args.push(encode_bool(value));
        }

        let mut draft = TransactionDraft::new(
            *sender,
            Address::TOKEN_SYSTEM_CONTRACT,
            &self.config.chain_id,
        );
        draft.data = build_data("issue", args);
        draft.gas_limit = self.config.gas_limit_issue;
        draft.gas_price = self.config.min_gas_price;
        draft.value = self.config.issue_cost;
        draft
    }
}

/// Token identifiers announced by the `issue` events of a completed issuance.
pub fn parse_issue_fungible(transaction: &TransactionOnNetwork) -> Vec<String> {
    transaction
        .events()
        .filter(|event| event.identifier == "issue")
        .filter_map(|event| event.topics.first())
        .map(|topic| String::from_utf8_lossy(topic).into_owned())
        .collect()
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::network::{TransactionEvent, TransactionStatus},
    };

    #[test]
    fn test_issue_payload() {
        let factory = TokenManagementTransactionsFactory::new(TransactionsFactoryConfig::new("T"));
        let params = IssueFungibleParams::with_all_capabilities("ROSETTA", "ROSETTA", 1_000_000_000, 2);
        let draft = factory.create_transaction_for_issuing_fungible(&Address::new([1; 32]), &params);
        let data = String::from_utf8(draft.data).unwrap();

        assert!(data.starts_with(&format!(
            "issue@{}@{}@3b9aca00@02@{}@{}",
            hex::encode("ROSETTA"),
            hex::encode("ROSETTA"),
            hex::encode("canFreeze"),
            hex::encode("true"),
        )));
        assert_eq!(data.split('@').count(), 1 + 4 + 12);
        assert_eq!(draft.receiver, Address::TOKEN_SYSTEM_CONTRACT);
        assert_eq!(draft.value, 50_000_000_000_000_000);
        assert_eq!(draft.gas_limit, 60_000_000);
    }

    #[test]
    fn test_parse_issue_outcome() {
        let transaction = TransactionOnNetwork {
            hash: "aa".to_string(),
            status: TransactionStatus::new("success"),
            events: vec![
                TransactionEvent {
                    address: None,
                    identifier: "transferValueOnly".to_string(),
                    topics: vec![b"ignored".to_vec()],
                },
                TransactionEvent {
                    address: None,
                    identifier: "issue".to_string(),
                    topics: vec![b"ROSETTA-a1b2c3".to_vec(), b"ROSETTA".to_vec()],
                },
            ],
        };
        assert_eq!(parse_issue_fungible(&transaction), vec!["ROSETTA-a1b2c3".to_string()]);
    }
}
