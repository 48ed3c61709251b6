//! The fixed pool of test accounts, partitioned by shard.

use {
    crate::{
        config::Configuration,
        error::{ConfigError, LookupError},
    },
    log::*,
    shardnet_sdk::{
        keys::parse_mnemonic, Address, AddressComputer, SdkError, UserSecretKey, UserSigner,
    },
    std::{
        collections::{BTreeMap, HashMap},
        fmt,
        ops::Range,
        rc::Rc,
    },
};

/// A managed account: an address and the key signing for it.
#[derive(Clone)]
pub struct Account {
    pub address: Address,
    pub signer: Rc<UserSigner>,
}

impl Account {
    pub fn new(signer: UserSigner) -> Self {
        Self {
            address: *signer.address(),
            signer: Rc::new(signer),
        }
    }
}

impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Account").field(&self.address).finish()
    }
}

/// Sponsor, users and known contracts of one network.
///
/// Built once at startup and never modified afterwards. Every user lives in
/// exactly one shard bucket, the one [`AddressComputer::shard_of`] assigns to
/// its address.
#[derive(Debug)]
pub struct AccountRegistry {
    sponsor: Account,
    users: Vec<Account>,
    users_by_shard: BTreeMap<u32, Vec<Account>>,
    accounts_by_address: HashMap<Address, Account>,
    contracts: Vec<Address>,
    contracts_by_shard: BTreeMap<u32, Vec<Address>>,
    address_computer: AddressComputer,
}

impl AccountRegistry {
    /// Load the sponsor key, derive `num_users` users from the mnemonic and
    /// bucket the known contracts.
    pub fn build(config: &Configuration) -> Result<Self, ConfigError> {
        let key_material = |what: &str| {
            let what = what.to_string();
            move |source: SdkError| ConfigError::KeyMaterial { what, source }
        };

        let sponsor = UserSecretKey::from_hex(&config.sponsor_secret_key)
            .map_err(key_material("sponsor secret key"))?;
        let mnemonic =
            parse_mnemonic(&config.users_mnemonic).map_err(key_material("users mnemonic"))?;
        let users = (0..config.num_users)
            .map(|index| {
                UserSecretKey::from_mnemonic(&mnemonic, index)
                    .map(UserSigner::new)
                    .map_err(key_material("users mnemonic"))
            })
            .collect::<Result<Vec<_>, _>>()?;
        let contracts = config
            .known_contracts
            .iter()
            .map(|address| {
                address
                    .parse()
                    .map_err(|source| ConfigError::KnownContract {
                        address: address.clone(),
                        source,
                    })
            })
            .collect::<Result<Vec<Address>, _>>()?;

        Ok(Self::new(
            UserSigner::new(sponsor),
            users,
            contracts,
            AddressComputer::new(config.num_shards),
        ))
    }

    pub fn new(
        sponsor: UserSigner,
        users: Vec<UserSigner>,
        contracts: Vec<Address>,
        address_computer: AddressComputer,
    ) -> Self {
        let sponsor = Account::new(sponsor);
        let users: Vec<Account> = users.into_iter().map(Account::new).collect();

        let mut users_by_shard: BTreeMap<u32, Vec<Account>> = BTreeMap::new();
        for user in &users {
            users_by_shard
                .entry(address_computer.shard_of(&user.address))
                .or_default()
                .push(user.clone());
        }

        let mut contracts_by_shard: BTreeMap<u32, Vec<Address>> = BTreeMap::new();
        for contract in &contracts {
            contracts_by_shard
                .entry(address_computer.shard_of(contract))
                .or_default()
                .push(*contract);
        }

        let accounts_by_address = std::iter::once(&sponsor)
            .chain(&users)
            .map(|account| (account.address, account.clone()))
            .collect();

        for (shard, users) in &users_by_shard {
            debug!("shard {shard}: {} users", users.len());
        }
        info!(
            "registry: sponsor {}, {} users, {} known contracts",
            sponsor.address,
            users.len(),
            contracts.len()
        );

        Self {
            sponsor,
            users,
            users_by_shard,
            accounts_by_address,
            contracts,
            contracts_by_shard,
            address_computer,
        }
    }

    pub fn sponsor(&self) -> &Account {
        &self.sponsor
    }

    /// Users in derivation order.
    pub fn users(&self) -> &[Account] {
        &self.users
    }

    pub fn contracts(&self) -> &[Address] {
        &self.contracts
    }

    pub fn address_computer(&self) -> &AddressComputer {
        &self.address_computer
    }

    /// Users of `shard`, in derivation order. Empty for unknown shards.
    pub fn users_in_shard(&self, shard: u32) -> &[Account] {
        self.users_by_shard
            .get(&shard)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn get_user(&self, shard: u32, index: usize) -> Result<&Account, LookupError> {
        self.users_in_shard(shard)
            .get(index)
            .ok_or(LookupError::User { shard, index })
    }

    pub fn get_users(&self, shard: u32, range: Range<usize>) -> Result<&[Account], LookupError> {
        let users = self.users_in_shard(shard);
        users
            .get(range.clone())
            .ok_or_else(|| LookupError::UserRange {
                shard,
                wanted: format!("{range:?}"),
                available: users.len(),
            })
    }

    pub fn get_contract(&self, shard: u32, index: usize) -> Result<&Address, LookupError> {
        self.contracts_by_shard
            .get(&shard)
            .and_then(|contracts| contracts.get(index))
            .ok_or(LookupError::Contract { shard, index })
    }

    /// Sponsor or user owning `address`. Contracts are not resolvable.
    pub fn get_by_address(&self, address: &Address) -> Result<&Account, LookupError> {
        self.accounts_by_address
            .get(address)
            .ok_or(LookupError::UnknownAddress(*address))
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::test_utils::{test_configuration, test_registry, TEST_MNEMONIC},
        assert_matches::assert_matches,
    };

    #[test]
    fn test_users_are_partitioned_by_shard() {
        let registry = test_registry();
        let computer = registry.address_computer();

        let mut bucketed = 0;
        for shard in 0..computer.num_shards() {
            let users = registry.users_in_shard(shard);
            assert!(users.iter().all(|user| computer.shard_of(&user.address) == shard));
            bucketed += users.len();
        }
        assert_eq!(bucketed, registry.users().len());
        assert!(registry.users_in_shard(7).is_empty());
    }

    #[test]
    fn test_lookups() {
        let registry = test_registry();

        let user = registry.get_user(1, 2).unwrap();
        assert_eq!(registry.users_in_shard(1)[2].address, user.address);
        assert_eq!(registry.get_by_address(&user.address).unwrap().address, user.address);
        assert_eq!(
            registry.get_by_address(&registry.sponsor().address).unwrap().address,
            registry.sponsor().address
        );

        assert_eq!(registry.get_users(0, 1..4).unwrap().len(), 3);
        assert_matches!(
            registry.get_users(0, 0..10_000),
            Err(LookupError::UserRange { shard: 0, .. })
        );
        assert_eq!(
            registry.get_user(2, 10_000).unwrap_err(),
            LookupError::User {
                shard: 2,
                index: 10_000
            }
        );
        assert_matches!(
            registry.get_by_address(&Address::new([9; 32])),
            Err(LookupError::UnknownAddress(_))
        );
    }

    #[test]
    fn test_contracts_are_bucketed_but_not_resolvable() {
        let computer = AddressComputer::new(3);
        let deployer = Address::new([1; 32]);
        let contract = computer.compute_contract_address(&deployer, 0);
        let shard = computer.shard_of(&deployer);

        let registry = AccountRegistry::new(
            UserSigner::new(UserSecretKey::from_bytes(&[3; 32]).unwrap()),
            vec![],
            vec![contract],
            computer,
        );
        assert_eq!(registry.get_contract(shard, 0).unwrap(), &contract);
        assert_matches!(
            registry.get_contract(shard, 1),
            Err(LookupError::Contract { index: 1, .. })
        );
        assert_matches!(
            registry.get_by_address(&contract),
            Err(LookupError::UnknownAddress(_))
        );
    }

    #[test]
    fn test_build_from_configuration() {
        let mut config = test_configuration();
        config.num_users = 4;
        let contract = AddressComputer::new(3).compute_contract_address(&Address::new([2; 32]), 1);
        config.known_contracts = vec![contract.to_string()];

        let registry = AccountRegistry::build(&config).unwrap();
        assert_eq!(registry.users().len(), 4);
        assert_eq!(registry.contracts(), &[contract]);

        let mnemonic = parse_mnemonic(TEST_MNEMONIC).unwrap();
        let third = UserSigner::new(UserSecretKey::from_mnemonic(&mnemonic, 3).unwrap());
        assert_eq!(&registry.users()[3].address, third.address());
    }

    #[test]
    fn test_build_rejects_bad_key_material() {
        let mut config = test_configuration();
        config.sponsor_secret_key = "zz".to_string();
        assert_matches!(
            AccountRegistry::build(&config),
            Err(ConfigError::KeyMaterial { what, .. }) if what == "sponsor secret key"
        );

        let mut config = test_configuration();
        config.users_mnemonic = "not a mnemonic".to_string();
        assert_matches!(
            AccountRegistry::build(&config),
            Err(ConfigError::KeyMaterial { what, .. }) if what == "users mnemonic"
        );

        let mut config = test_configuration();
        config.known_contracts = vec!["nope".to_string()];
        assert_matches!(
            AccountRegistry::build(&config),
            Err(ConfigError::KnownContract { .. })
        );
    }
}
