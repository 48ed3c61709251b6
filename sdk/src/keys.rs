//! User keys and signing.
//!
//! Users are derived from a BIP39 mnemonic along the SLIP-0010 ed25519 path
//! `m/44'/508'/0'/0'/{index}'`; the sponsor is loaded from a raw hex secret.

use {
    crate::{
        address::Address,
        error::{Result, SdkError},
    },
    bip39::{Language, Mnemonic, Seed},
    derivation_path::ChildIndex,
    ed25519_dalek::{Keypair, PublicKey, SecretKey, Signer as _},
    ed25519_dalek_bip32::ExtendedSecretKey,
    std::fmt,
};

/// BIP44 coin type used for user derivation.
pub const COIN_TYPE: u32 = 508;

/// Size of an ed25519 signature in bytes.
pub const SIGNATURE_LENGTH: usize = 64;

/// A 32-byte ed25519 secret key.
pub struct UserSecretKey(SecretKey);

impl UserSecretKey {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        SecretKey::from_bytes(bytes)
            .map(Self)
            .map_err(|err| SdkError::InvalidSecretKey(err.to_string()))
    }

    pub fn from_hex(hex_secret: &str) -> Result<Self> {
        let bytes = hex::decode(hex_secret.trim())
            .map_err(|err| SdkError::InvalidSecretKey(err.to_string()))?;
        Self::from_bytes(&bytes)
    }

    /// Derive the key at `index` from a mnemonic phrase (empty passphrase).
    pub fn from_mnemonic(mnemonic: &Mnemonic, index: u32) -> Result<Self> {
        let seed = Seed::new(mnemonic, "");
        let path = [
            ChildIndex::Hardened(44),
            ChildIndex::Hardened(COIN_TYPE),
            ChildIndex::Hardened(0),
            ChildIndex::Hardened(0),
            ChildIndex::Hardened(index),
        ];
        let extended = ExtendedSecretKey::from_seed(seed.as_bytes())
            .and_then(|master| master.derive(&path))
            .map_err(|err| SdkError::KeyDerivation {
                index,
                reason: format!("{err:?}"),
            })?;
        Ok(Self(extended.secret_key))
    }

    pub fn public_key(&self) -> PublicKey {
        PublicKey::from(&self.0)
    }
}

impl fmt::Debug for UserSecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("UserSecretKey(..)")
    }
}

/// Parse a BIP39 English phrase.
pub fn parse_mnemonic(phrase: &str) -> Result<Mnemonic> {
    Mnemonic::from_phrase(phrase.trim(), Language::English)
        .map_err(|err| SdkError::InvalidMnemonic(err.to_string()))
}

/// Signs arbitrary buffers on behalf of one address.
pub struct UserSigner {
    keypair: Keypair,
    address: Address,
}

impl UserSigner {
    pub fn new(secret_key: UserSecretKey) -> Self {
        let public = secret_key.public_key();
        let address = Address::new(public.to_bytes());
        Self {
            keypair: Keypair {
                secret: secret_key.0,
                public,
            },
            address,
        }
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    pub fn sign(&self, message: &[u8]) -> [u8; SIGNATURE_LENGTH] {
        self.keypair.sign(message).to_bytes()
    }
}

impl fmt::Debug for UserSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserSigner")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}
