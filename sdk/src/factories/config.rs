/// Gas schedule and chain parameters shared by every transaction factory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionsFactoryConfig {
    pub chain_id: String,
    pub min_gas_limit: u64,
    pub gas_limit_per_byte: u64,
    pub min_gas_price: u64,

    pub gas_limit_esdt_transfer: u64,
    pub additional_gas_for_esdt_transfer: u64,
    pub gas_limit_multi_esdt_nft_transfer: u64,
    pub additional_gas_for_esdt_nft_transfer: u64,

    pub gas_limit_issue: u64,
    /// Native amount paid to the token system contract when issuing.
    pub issue_cost: u128,
}

impl TransactionsFactoryConfig {
    pub fn new(chain_id: &str) -> Self {
        Self {
            chain_id: chain_id.to_string(),
            min_gas_limit: 50_000,
            gas_limit_per_byte: 1_500,
            min_gas_price: 1_000_000_000,
            gas_limit_esdt_transfer: 200_000,
            additional_gas_for_esdt_transfer: 100_000,
            gas_limit_multi_esdt_nft_transfer: 200_000,
            additional_gas_for_esdt_nft_transfer: 800_000,
            gas_limit_issue: 60_000_000,
            issue_cost: 50_000_000_000_000_000,
        }
    }

    /// Gas needed just to carry `data_length` bytes of payload.
    pub fn gas_for_data(&self, data_length: usize) -> u64 {
        let data_length = u64::try_from(data_length).unwrap_or(u64::MAX);
        self.min_gas_limit
            .saturating_add(self.gas_limit_per_byte.saturating_mul(data_length))
    }
}
