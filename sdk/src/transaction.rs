//! Transaction model.
//!
//! A transaction moves through three types:
//!
//! - [`TransactionDraft`]: produced by the factories, every field mutable;
//! - [`FinalizedTransaction`]: nonce assigned, immutable, exposes signing bytes;
//! - [`SignedTransaction`]: carries a signature over the finalized fields.
//!
//! Because nothing can be mutated after [`TransactionDraft::finalize`], a
//! signature always covers the exact field values that get submitted.

use {
    crate::{
        address::Address,
        error::{Result, SdkError},
        keys::{UserSigner, SIGNATURE_LENGTH},
    },
    base64::{engine::general_purpose::STANDARD as BASE64, Engine as _},
    serde::Serialize,
    sha2::{Digest, Sha256},
};

/// A transaction still under construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionDraft {
    pub sender: Address,
    pub receiver: Address,
    pub value: u128,
    pub gas_price: u64,
    pub gas_limit: u64,
    pub data: Vec<u8>,
    pub chain_id: String,
    pub version: u32,
    pub options: u32,
    /// Set on the inner transactions of a relayed v3 envelope.
    pub relayer: Option<Address>,
    /// Populated only on relayed v3 envelopes.
    pub inner_transactions: Vec<SignedTransaction>,
}

impl TransactionDraft {
    pub fn new(sender: Address, receiver: Address, chain_id: &str) -> Self {
        Self {
            sender,
            receiver,
            value: 0,
            gas_price: 0,
            gas_limit: 0,
            data: Vec::new(),
            chain_id: chain_id.to_string(),
            version: 2,
            options: 0,
            relayer: None,
            inner_transactions: Vec::new(),
        }
    }

    /// Freeze every field and assign the nonce.
    pub fn finalize(self, nonce: u64) -> FinalizedTransaction {
        FinalizedTransaction { nonce, draft: self }
    }
}

/// A transaction whose fields can no longer change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinalizedTransaction {
    nonce: u64,
    draft: TransactionDraft,
}

impl FinalizedTransaction {
    pub fn nonce(&self) -> u64 {
        self.nonce
    }

    pub fn sender(&self) -> &Address {
        &self.draft.sender
    }

    pub fn bytes_for_signing(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(&wire(self.nonce, &self.draft, None))?)
    }

    /// Sign with the key owning the sender address.
    pub fn sign(self, signer: &UserSigner) -> Result<SignedTransaction> {
        if signer.address() != self.sender() {
            return Err(SdkError::SignerMismatch {
                signer: signer.address().to_string(),
                sender: self.sender().to_string(),
            });
        }
        let signature = signer.sign(&self.bytes_for_signing()?);
        Ok(SignedTransaction {
            nonce: self.nonce,
            draft: self.draft,
            signature,
        })
    }
}

/// A finished transaction, ready for submission or for relaying.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
    nonce: u64,
    draft: TransactionDraft,
    signature: [u8; SIGNATURE_LENGTH],
}

impl SignedTransaction {
    pub fn nonce(&self) -> u64 {
        self.nonce
    }

    pub fn sender(&self) -> &Address {
        &self.draft.sender
    }

    pub fn receiver(&self) -> &Address {
        &self.draft.receiver
    }

    pub fn value(&self) -> u128 {
        self.draft.value
    }

    pub fn gas_price(&self) -> u64 {
        self.draft.gas_price
    }

    pub fn gas_limit(&self) -> u64 {
        self.draft.gas_limit
    }

    pub fn data(&self) -> &[u8] {
        &self.draft.data
    }

    pub fn chain_id(&self) -> &str {
        &self.draft.chain_id
    }

    pub fn relayer(&self) -> Option<&Address> {
        self.draft.relayer.as_ref()
    }

    pub fn inner_transactions(&self) -> &[SignedTransaction] {
        &self.draft.inner_transactions
    }

    pub fn signature(&self) -> &[u8; SIGNATURE_LENGTH] {
        &self.signature
    }

    /// Signing bytes recomputed from the final field values.
    pub fn bytes_for_signing(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(&wire(self.nonce, &self.draft, None))?)
    }

    /// Whether the signature is valid for the sender over the current fields.
    pub fn verify_signature(&self) -> bool {
        self.bytes_for_signing()
            .map(|bytes| self.draft.sender.verify(&bytes, &self.signature))
            .unwrap_or(false)
    }

    /// JSON body accepted by the proxy's send endpoints.
    pub fn to_wire(&self) -> TransactionWire {
        wire(self.nonce, &self.draft, Some(&self.signature))
    }

    /// Hex-encoded SHA-256 of the signed wire form.
    pub fn hash(&self) -> Result<String> {
        let bytes = serde_json::to_vec(&self.to_wire())?;
        Ok(hex::encode(Sha256::digest(bytes)))
    }
}

/// Canonical JSON form of a transaction; field order is significant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionWire {
    pub nonce: u64,
    pub value: String,
    pub receiver: String,
    pub sender: String,
    pub gas_price: u64,
    pub gas_limit: u64,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub data: String,
    #[serde(rename = "chainID")]
    pub chain_id: String,
    pub version: u32,
    #[serde(skip_serializing_if = "is_zero")]
    pub options: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relayer: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub inner_transactions: Vec<TransactionWire>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
}

fn is_zero(value: &u32) -> bool {
    *value == 0
}

fn wire(
    nonce: u64,
    draft: &TransactionDraft,
    signature: Option<&[u8; SIGNATURE_LENGTH]>,
) -> TransactionWire {
    TransactionWire {
        nonce,
        value: draft.value.to_string(),
        receiver: draft.receiver.to_string(),
        sender: draft.sender.to_string(),
        gas_price: draft.gas_price,
        gas_limit: draft.gas_limit,
        data: BASE64.encode(&draft.data),
        chain_id: draft.chain_id.clone(),
        version: draft.version,
        options: draft.options,
        relayer: draft.relayer.map(|relayer| relayer.to_string()),
        inner_transactions: draft
            .inner_transactions
            .iter()
            .map(SignedTransaction::to_wire)
            .collect(),
        signature: signature.map(hex::encode),
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::keys::UserSecretKey,
        assert_matches::assert_matches,
    };

    fn signer(seed: u8) -> UserSigner {
        UserSigner::new(UserSecretKey::from_bytes(&[seed; 32]).unwrap())
    }

    fn draft(sender: &UserSigner, receiver: &UserSigner) -> TransactionDraft {
        let mut draft = TransactionDraft::new(*sender.address(), *receiver.address(), "T");
        draft.value = 42;
        draft.gas_limit = 50_000;
        draft.gas_price = 1_000_000_000;
        draft
    }

    #[test]
    fn test_signature_covers_final_fields() {
        let alice = signer(1);
        let bob = signer(2);
        let mut draft = draft(&alice, &bob);
        draft.gas_limit += 42_000;
        let signed = draft.finalize(5).sign(&alice).unwrap();

        assert_eq!(signed.nonce(), 5);
        assert_eq!(signed.gas_limit(), 92_000);
        assert!(signed.verify_signature());
    }

    #[test]
    fn test_signature_does_not_transfer_to_other_fields() {
        let alice = signer(1);
        let bob = signer(2);
        let signed = draft(&alice, &bob).finalize(5).sign(&alice).unwrap();
        let forged = SignedTransaction {
            nonce: 6,
            draft: signed.draft.clone(),
            signature: *signed.signature(),
        };
        assert!(!forged.verify_signature());
    }

    #[test]
    fn test_sign_with_foreign_key_is_rejected() {
        let alice = signer(1);
        let bob = signer(2);
        assert_matches!(
            draft(&alice, &bob).finalize(0).sign(&bob),
            Err(SdkError::SignerMismatch { .. })
        );
    }

    #[test]
    fn test_wire_form() {
        let alice = signer(1);
        let bob = signer(2);
        let mut draft = draft(&alice, &bob);
        draft.data = b"hello".to_vec();
        let signed = draft.finalize(7).sign(&alice).unwrap();
        let json = serde_json::to_value(signed.to_wire()).unwrap();

        assert_eq!(json["nonce"], 7);
        assert_eq!(json["value"], "42");
        assert_eq!(json["data"], "aGVsbG8=");
        assert_eq!(json["chainID"], "T");
        assert_eq!(json["sender"], alice.address().to_string());
        assert_eq!(json["signature"], hex::encode(signed.signature()));
        assert!(json.get("relayer").is_none());
        assert!(json.get("innerTransactions").is_none());
        assert!(json.get("options").is_none());
    }

    #[test]
    fn test_hash_changes_with_content() {
        let alice = signer(1);
        let bob = signer(2);
        let first = draft(&alice, &bob).finalize(1).sign(&alice).unwrap();
        let second = draft(&alice, &bob).finalize(2).sign(&alice).unwrap();
        assert_eq!(first.hash().unwrap(), first.clone().hash().unwrap());
        assert_ne!(first.hash().unwrap(), second.hash().unwrap());
        assert_eq!(first.hash().unwrap().len(), 64);
    }
}
