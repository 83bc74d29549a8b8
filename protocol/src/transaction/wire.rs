//! JSON transport format.
//!
//! This is how a transaction travels between machines, complete or not:
//!
//! ```json
//! {
//!   "recentBlockhash": "<base58>" | null,
//!   "instructions": [
//!     { "programId": "<base58>",
//!       "keys": [{ "pubkey": "<base58>", "isSigner": true, "isWritable": true }],
//!       "data": "<base64>" }
//!   ],
//!   "signatures": [{ "publicKey": "<base58>", "signature": "<base58>" | null }]
//! }
//! ```
//!
//! The account table is not transported. Deserializing replays every
//! instruction through [`Transaction::add`], so the table and signer prefix
//! are recomputed by the same rules that built them, and only then are the
//! signatures attached by identifier.

use std::collections::HashSet;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::builder::Transaction;
use super::error::TransactionError;
use super::instruction::{AccountMeta, Instruction};
use crate::crypto::hash::Hash;
use crate::crypto::keys::{PublicKey, Signature};

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireTransaction {
    recent_blockhash: Option<String>,
    instructions: Vec<WireInstruction>,
    signatures: Vec<WireSignature>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireInstruction {
    program_id: String,
    keys: Vec<AccountMeta>,
    data: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireSignature {
    public_key: String,
    signature: Option<String>,
}

impl Transaction {
    /// Serializes to transport bytes. Works at any signing state; empty
    /// slots travel as `null`.
    pub fn serialize(&self) -> Result<Vec<u8>, TransactionError> {
        let wire = WireTransaction {
            recent_blockhash: self.recent_blockhash().map(Hash::to_text),
            instructions: self
                .instructions()
                .iter()
                .map(|ix| WireInstruction {
                    program_id: ix.program_id().to_text(),
                    keys: ix.accounts().to_vec(),
                    data: BASE64.encode(ix.data()),
                })
                .collect(),
            signatures: self
                .signatures()
                .into_iter()
                .map(|slot| WireSignature {
                    public_key: slot.pubkey.to_text(),
                    signature: slot.signature.as_ref().map(Signature::to_text),
                })
                .collect(),
        };

        let bytes = serde_json::to_vec(&wire)
            .map_err(|e| TransactionError::MalformedTransport(e.to_string()))?;
        debug!(
            len = bytes.len(),
            instructions = wire.instructions.len(),
            "transaction serialized"
        );
        Ok(bytes)
    }

    /// Rebuilds a transaction from transport bytes.
    ///
    /// The result compiles to the same message as the sender's transaction
    /// and carries the same signature slots.
    pub fn deserialize(bytes: &[u8]) -> Result<Self, TransactionError> {
        let wire: WireTransaction = serde_json::from_slice(bytes).map_err(malformed)?;

        let mut tx = match wire.recent_blockhash {
            Some(text) => Transaction::with_recent_blockhash(
                Hash::from_text(&text).map_err(|e| field_error("recentBlockhash", e))?,
            ),
            None => Transaction::new(),
        };

        for ix in wire.instructions {
            let program_id =
                PublicKey::from_text(&ix.program_id).map_err(|e| field_error("programId", e))?;
            let data = BASE64
                .decode(ix.data.as_bytes())
                .map_err(|e| field_error("data", e))?;
            tx.add(Instruction::new(program_id, ix.keys, data));
        }

        let mut seen = HashSet::with_capacity(wire.signatures.len());
        for record in wire.signatures {
            let pubkey = PublicKey::from_text(&record.public_key)
                .map_err(|e| field_error("publicKey", e))?;
            if !seen.insert(pubkey) {
                return Err(TransactionError::MalformedTransport(format!(
                    "duplicate signature record for {pubkey}"
                )));
            }
            if !tx.is_required_signer(&pubkey) {
                return Err(TransactionError::MalformedTransport(format!(
                    "signature record for {pubkey}, which is not a required signer"
                )));
            }
            if let Some(text) = record.signature {
                let signature =
                    Signature::from_text(&text).map_err(|e| field_error("signature", e))?;
                tx.signatures.insert(pubkey, signature);
            }
        }

        debug!(
            instructions = tx.instructions().len(),
            signatures = tx.signatures.len(),
            required = tx.num_required_signatures(),
            "transaction deserialized"
        );
        Ok(tx)
    }
}

/// Free-function form of [`Transaction::serialize`].
pub fn serialize(tx: &Transaction) -> Result<Vec<u8>, TransactionError> {
    tx.serialize()
}

/// Free-function form of [`Transaction::deserialize`].
pub fn deserialize(bytes: &[u8]) -> Result<Transaction, TransactionError> {
    Transaction::deserialize(bytes)
}

fn malformed(err: serde_json::Error) -> TransactionError {
    TransactionError::MalformedTransport(err.to_string())
}

fn field_error(field: &str, err: impl std::fmt::Display) -> TransactionError {
    TransactionError::MalformedTransport(format!("invalid {field}: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::hash;
    use crate::crypto::keys::Keypair;
    use crate::program::VaultProgram;

    fn two_party(payer: &Keypair, new_account: &Keypair, dest: &PublicKey) -> Transaction {
        let program = VaultProgram::default();
        let mut tx = Transaction::with_recent_blockhash(hash::hash(b"wire"));
        tx.add(
            program
                .create_account(&payer.pubkey(), &new_account.pubkey(), 5_000, 64)
                .unwrap(),
        );
        tx.add(program.transfer(&payer.pubkey(), dest, 1_000).unwrap());
        tx
    }

    #[test]
    fn signed_roundtrip_preserves_message_and_slots() {
        let (a, b) = (Keypair::generate(), Keypair::generate());
        let dest = Keypair::generate().pubkey();
        let mut tx = two_party(&a, &b, &dest);
        tx.sign(&[&a, &b]).unwrap();

        let restored = Transaction::deserialize(&tx.serialize().unwrap()).unwrap();
        assert_eq!(
            restored.compile_message().unwrap(),
            tx.compile_message().unwrap()
        );
        assert_eq!(restored.signatures(), tx.signatures());
        assert_eq!(restored.account_keys(), tx.account_keys());
        assert!(restored.verify_signatures());
    }

    #[test]
    fn partial_transaction_travels_with_null_slot() {
        let (a, b) = (Keypair::generate(), Keypair::generate());
        let dest = Keypair::generate().pubkey();
        let mut tx = two_party(&a, &b, &dest);
        tx.partial_sign(&[&a]).unwrap();

        let bytes = tx.serialize().unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        let records = json["signatures"].as_array().unwrap();
        assert_eq!(records.len(), 2);
        assert!(records.iter().any(|r| r["signature"].is_null()));

        let mut restored = Transaction::deserialize(&bytes).unwrap();
        assert_eq!(restored.missing_signers(), vec![b.pubkey()]);
        restored.partial_sign(&[&b]).unwrap();
        assert!(restored.is_complete());
        assert!(restored.verify_signatures());
    }

    #[test]
    fn field_names_and_encodings() {
        let (a, b) = (Keypair::generate(), Keypair::generate());
        let dest = Keypair::generate().pubkey();
        let tx = two_party(&a, &b, &dest);
        let json: serde_json::Value = serde_json::from_slice(&tx.serialize().unwrap()).unwrap();

        let first = &json["instructions"][0];
        assert_eq!(first["programId"], VaultProgram::default().program_id().to_text());
        assert_eq!(first["keys"][0]["pubkey"], a.pubkey().to_text());
        assert_eq!(first["keys"][0]["isSigner"], true);
        assert_eq!(first["keys"][0]["isWritable"], true);
        let data = BASE64.decode(first["data"].as_str().unwrap()).unwrap();
        assert_eq!(data, tx.instructions()[0].data());
        assert_eq!(json["recentBlockhash"], hash::hash(b"wire").to_text());
    }

    #[test]
    fn unsigned_transaction_without_blockhash_roundtrips() {
        let mut tx = Transaction::new();
        tx.add(Instruction::new(
            PublicKey::default(),
            vec![AccountMeta::new_readonly(PublicKey::new([4u8; 32]), false)],
            vec![],
        ));
        let restored = Transaction::deserialize(&serialize(&tx).unwrap()).unwrap();
        assert_eq!(restored, tx);
    }

    #[test]
    fn garbage_is_malformed() {
        for bytes in [&b"not json"[..], b"{}", b"[]"] {
            assert!(matches!(
                deserialize(bytes),
                Err(TransactionError::MalformedTransport(_))
            ));
        }
    }

    fn mutate(tx: &Transaction, f: impl FnOnce(&mut serde_json::Value)) -> Vec<u8> {
        let mut json: serde_json::Value = serde_json::from_slice(&tx.serialize().unwrap()).unwrap();
        f(&mut json);
        serde_json::to_vec(&json).unwrap()
    }

    #[test]
    fn bad_fields_are_malformed() {
        let (a, b) = (Keypair::generate(), Keypair::generate());
        let dest = Keypair::generate().pubkey();
        let mut tx = two_party(&a, &b, &dest);
        tx.sign(&[&a, &b]).unwrap();

        let cases = [
            mutate(&tx, |j| j["instructions"][0]["programId"] = "0OIl".into()),
            mutate(&tx, |j| j["instructions"][0]["keys"][1]["pubkey"] = "abc".into()),
            mutate(&tx, |j| j["instructions"][0]["data"] = "***".into()),
            mutate(&tx, |j| j["signatures"][0]["signature"] = "3xyz".into()),
            mutate(&tx, |j| j["recentBlockhash"] = "!".into()),
        ];
        for bytes in cases {
            assert!(matches!(
                Transaction::deserialize(&bytes),
                Err(TransactionError::MalformedTransport(_))
            ));
        }
    }

    #[test]
    fn signature_for_non_signer_is_malformed() {
        let (a, b) = (Keypair::generate(), Keypair::generate());
        let dest = Keypair::generate().pubkey();
        let mut tx = two_party(&a, &b, &dest);
        tx.sign(&[&a, &b]).unwrap();

        let bytes = mutate(&tx, |j| {
            j["signatures"][1]["publicKey"] = dest.to_text().into();
        });
        let err = Transaction::deserialize(&bytes).unwrap_err();
        assert!(err.to_string().contains("not a required signer"));
    }

    #[test]
    fn duplicate_signature_record_is_malformed() {
        let (a, b) = (Keypair::generate(), Keypair::generate());
        let dest = Keypair::generate().pubkey();
        let mut tx = two_party(&a, &b, &dest);
        tx.sign(&[&a, &b]).unwrap();

        let bytes = mutate(&tx, |j| {
            let first = j["signatures"][0].clone();
            j["signatures"].as_array_mut().unwrap().push(first);
        });
        let err = Transaction::deserialize(&bytes).unwrap_err();
        assert!(err.to_string().contains("duplicate"));
    }
}
