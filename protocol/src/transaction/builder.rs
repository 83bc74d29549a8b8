//! The mutable [`Transaction`] builder and its account key table.
//!
//! `add` only records what it sees: each identifier once, in first-seen
//! order, with signer/writable flags widened as later instructions ask for
//! more. The signer-first ordering the message needs is applied lazily by
//! [`Transaction::account_keys`] at compile time, so `add` stays O(1)
//! amortized per account reference and compiling twice gives the same bytes.

use std::collections::HashMap;

use tracing::{debug, warn};

use super::instruction::{AccountMeta, Instruction};
use crate::crypto::hash::Hash;
use crate::crypto::keys::{PublicKey, Signature};

// ---------------------------------------------------------------------------
// SignatureSlot
// ---------------------------------------------------------------------------

/// One required signer and its signature, if collected yet.
///
/// A missing signature is `None`, never an absent entry: the list of slots
/// always pairs every required signer with exactly one position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignatureSlot {
    pub pubkey: PublicKey,
    pub signature: Option<Signature>,
}

// ---------------------------------------------------------------------------
// Transaction
// ---------------------------------------------------------------------------

/// An ordered list of instructions plus the signatures that authorize them.
///
/// # Lifecycle
///
/// 1. `Transaction::new()` — empty.
/// 2. [`add`](Self::add) — append instructions; the account table grows.
/// 3. [`sign`](Self::sign) / [`partial_sign`](Self::partial_sign) — fill
///    signature slots over the compiled message.
/// 4. [`serialize`](Self::serialize) — at any point, complete or not.
///
/// Each instance is meant to be owned and mutated by one task at a time;
/// there is no internal locking.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transaction {
    instructions: Vec<Instruction>,
    /// First-seen order, flags widened across instructions.
    table: Vec<AccountMeta>,
    /// Position of each identifier in `table`.
    table_index: HashMap<PublicKey, usize>,
    /// Collected signatures, keyed by signer.
    pub(super) signatures: HashMap<PublicKey, Signature>,
    recent_blockhash: Option<Hash>,
}

impl Transaction {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts an empty transaction bound to `recent_blockhash`.
    pub fn with_recent_blockhash(recent_blockhash: Hash) -> Self {
        Self {
            recent_blockhash: Some(recent_blockhash),
            ..Self::default()
        }
    }

    /// Sets the nonce. Changes the message, so any collected signatures
    /// are discarded.
    pub fn set_recent_blockhash(&mut self, recent_blockhash: Hash) -> &mut Self {
        if self.recent_blockhash != Some(recent_blockhash) {
            self.recent_blockhash = Some(recent_blockhash);
            self.discard_signatures("recent blockhash changed");
        }
        self
    }

    pub fn recent_blockhash(&self) -> Option<&Hash> {
        self.recent_blockhash.as_ref()
    }

    /// Appends an instruction and folds its accounts into the key table.
    ///
    /// New identifiers are appended in the order they appear. Identifiers
    /// already in the table keep their position and have their flags OR'd
    /// with the new reference, so a signer or writable account never gets
    /// demoted by a later read-only reference.
    pub fn add(&mut self, instruction: Instruction) -> &mut Self {
        for meta in instruction.accounts() {
            self.register_account(*meta);
        }

        debug!(
            program_id = %instruction.program_id(),
            accounts = instruction.accounts().len(),
            data_len = instruction.data().len(),
            "instruction added"
        );
        self.instructions.push(instruction);
        self.discard_signatures("instruction added");
        self
    }

    /// Folds one account reference into the table: appended if new,
    /// flags widened if already present.
    pub(super) fn register_account(&mut self, meta: AccountMeta) {
        match self.table_index.get(&meta.pubkey) {
            Some(&idx) => {
                let existing = &mut self.table[idx];
                existing.is_signer |= meta.is_signer;
                existing.is_writable |= meta.is_writable;
            }
            None => {
                self.table_index.insert(meta.pubkey, self.table.len());
                self.table.push(meta);
            }
        }
    }

    /// Appends several instructions in order.
    pub fn add_all<I>(&mut self, instructions: I) -> &mut Self
    where
        I: IntoIterator<Item = Instruction>,
    {
        for instruction in instructions {
            self.add(instruction);
        }
        self
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// The raw table in first-seen order with widened flags. This is what
    /// `add` maintains; [`account_keys`](Self::account_keys) is what the
    /// message uses.
    pub fn account_metas(&self) -> &[AccountMeta] {
        &self.table
    }

    /// The table in compiled order.
    ///
    /// Signers before non-signers; within each group writable before
    /// read-only; ties keep first-seen order (the sort is stable).
    pub fn compiled_account_metas(&self) -> Vec<AccountMeta> {
        let mut ordered = self.table.clone();
        ordered.sort_by_key(|meta| (!meta.is_signer, !meta.is_writable));
        ordered
    }

    /// Identifiers in compiled order.
    pub fn account_keys(&self) -> Vec<PublicKey> {
        self.compiled_account_metas()
            .into_iter()
            .map(|meta| meta.pubkey)
            .collect()
    }

    /// The signer prefix of [`account_keys`](Self::account_keys).
    pub fn signer_keys(&self) -> Vec<PublicKey> {
        self.compiled_account_metas()
            .into_iter()
            .take_while(|meta| meta.is_signer)
            .map(|meta| meta.pubkey)
            .collect()
    }

    /// The account that pays fees: the first key of the signer prefix.
    /// `None` while no instruction requires a signature.
    pub fn fee_payer(&self) -> Option<PublicKey> {
        self.signer_keys().first().copied()
    }

    /// Number of signatures the transaction needs to be complete.
    pub fn num_required_signatures(&self) -> usize {
        self.table.iter().filter(|meta| meta.is_signer).count()
    }

    pub fn is_required_signer(&self, pubkey: &PublicKey) -> bool {
        self.table_index
            .get(pubkey)
            .is_some_and(|&idx| self.table[idx].is_signer)
    }

    /// One slot per required signer, in signer-prefix order.
    pub fn signatures(&self) -> Vec<SignatureSlot> {
        self.signer_keys()
            .into_iter()
            .map(|pubkey| SignatureSlot {
                pubkey,
                signature: self.signatures.get(&pubkey).copied(),
            })
            .collect()
    }

    /// Required signers whose slot is still empty.
    pub fn missing_signers(&self) -> Vec<PublicKey> {
        self.signer_keys()
            .into_iter()
            .filter(|pubkey| !self.signatures.contains_key(pubkey))
            .collect()
    }

    /// `true` when every required signer slot holds a signature.
    pub fn is_complete(&self) -> bool {
        self.missing_signers().is_empty()
    }

    fn discard_signatures(&mut self, reason: &'static str) {
        if !self.signatures.is_empty() {
            warn!(
                discarded = self.signatures.len(),
                reason, "message changed, discarding collected signatures"
            );
            self.signatures.clear();
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
