//! Account and contract addresses.
//!
//! An address is the raw 32-byte ed25519 public key of its owner; its text
//! form is base58. Contract addresses carry eight leading zero bytes and keep
//! the last two bytes of their deployer, so they land in the deployer's shard.

use {
    crate::error::{Result, SdkError},
    ed25519_dalek::{PublicKey, Signature, Verifier},
    serde::{de, Deserialize, Deserializer, Serialize, Serializer},
    sha3::{Digest, Keccak256},
    std::{fmt, str::FromStr},
};

pub const ADDRESS_LENGTH: usize = 32;

/// Shard id of the metachain.
pub const METACHAIN_ID: u32 = u32::MAX;

/// Leading zero bytes of every smart contract address.
const SMART_CONTRACT_PREFIX_LENGTH: usize = 8;

/// VM type marker written after the zero prefix of deployed contracts.
const VM_TYPE_WASM: [u8; 2] = [5, 0];

/// Prefix shared by all metachain system contracts.
const METACHAIN_PREFIX: [u8; 16] = [0, 0, 0, 0, 0, 0, 0, 0, 0, 1, 0, 0, 0, 0, 0, 0];

#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address([u8; ADDRESS_LENGTH]);

impl Address {
    /// The all-zero address; receiver of contract deployments.
    pub const ZERO: Self = Self([0; ADDRESS_LENGTH]);

    /// System contract managing fungible token issuance.
    pub const TOKEN_SYSTEM_CONTRACT: Self = Self([
        0, 0, 0, 0, 0, 0, 0, 0, 0, 1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 2,
        0xff, 0xff,
    ]);

    pub const fn new(pubkey: [u8; ADDRESS_LENGTH]) -> Self {
        Self(pubkey)
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        <[u8; ADDRESS_LENGTH]>::try_from(bytes)
            .map(Self)
            .map_err(|_| SdkError::InvalidAddress {
                input: hex::encode(bytes),
                reason: format!("expected {ADDRESS_LENGTH} bytes, got {}", bytes.len()),
            })
    }

    pub fn as_bytes(&self) -> &[u8; ADDRESS_LENGTH] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn is_smart_contract(&self) -> bool {
        self.0[..SMART_CONTRACT_PREFIX_LENGTH].iter().all(|b| *b == 0)
    }

    /// Check an ed25519 signature made by the owner of this address.
    pub fn verify(&self, message: &[u8], signature: &[u8]) -> bool {
        let Ok(public) = PublicKey::from_bytes(&self.0) else {
            return false;
        };
        let Ok(signature) = Signature::try_from(signature) else {
            return false;
        };
        public.verify(message, &signature).is_ok()
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&bs58::encode(self.0).into_string())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({self})")
    }
}

impl FromStr for Address {
    type Err = SdkError;

    fn from_str(s: &str) -> Result<Self> {
        let bytes = bs58::decode(s)
            .into_vec()
            .map_err(|err| SdkError::InvalidAddress {
                input: s.to_string(),
                reason: err.to_string(),
            })?;
        Self::from_slice(&bytes).map_err(|_| SdkError::InvalidAddress {
            input: s.to_string(),
            reason: format!("decodes to {} bytes", bytes.len()),
        })
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(de::Error::custom)
    }
}

/// Computes shard membership and derived contract addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressComputer {
    num_shards: u32,
}

impl AddressComputer {
    pub fn new(num_shards: u32) -> Self {
        Self {
            num_shards: num_shards.max(1),
        }
    }

    pub fn num_shards(&self) -> u32 {
        self.num_shards
    }

    /// Shard owning `address`, derived from its last byte.
    pub fn shard_of(&self, address: &Address) -> u32 {
        if *address == Address::ZERO || address.0.starts_with(&METACHAIN_PREFIX) {
            return METACHAIN_ID;
        }

        // Number of bits needed to represent every shard id.
        let bits = u32::BITS.saturating_sub(self.num_shards.saturating_sub(1).leading_zeros());
        let mask_high = (1u32 << bits).saturating_sub(1);
        let mask_low = (1u32 << bits.saturating_sub(1)).saturating_sub(1);
        let last = u32::from(address.0[ADDRESS_LENGTH - 1]);

        let shard = last & mask_high;
        if shard > self.num_shards.saturating_sub(1) {
            last & mask_low
        } else {
            shard
        }
    }

    /// Address of the contract deployed by `deployer` with transaction nonce `nonce`.
    pub fn compute_contract_address(&self, deployer: &Address, nonce: u64) -> Address {
        let mut hasher = Keccak256::new();
        hasher.update(deployer.0);
        hasher.update(nonce.to_le_bytes());
        let digest = hasher.finalize();

        let mut bytes = [0u8; ADDRESS_LENGTH];
        bytes[SMART_CONTRACT_PREFIX_LENGTH..10].copy_from_slice(&VM_TYPE_WASM);
        bytes[10..30].copy_from_slice(&digest[10..30]);
        bytes[30..].copy_from_slice(&deployer.0[30..]);
        Address(bytes)
    }
}
