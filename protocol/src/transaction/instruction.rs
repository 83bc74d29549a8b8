//! Program invocation descriptors.
//!
//! An [`Instruction`] names a program, the accounts it touches, and an opaque
//! payload. The transaction layer never looks inside the payload; that is
//! the program codec's business (see [`crate::program::codec`]).

use serde::{Deserialize, Serialize};

use crate::crypto::keys::PublicKey;

/// One account reference inside an instruction.
///
/// Serializes with the transport's field names (`pubkey`, `isSigner`,
/// `isWritable`); [`crate::transaction::wire`] embeds it as is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountMeta {
    pub pubkey: PublicKey,
    pub is_signer: bool,
    pub is_writable: bool,
}

impl AccountMeta {
    /// A writable account reference.
    pub fn new(pubkey: PublicKey, is_signer: bool) -> Self {
        Self {
            pubkey,
            is_signer,
            is_writable: true,
        }
    }

    /// A read-only account reference.
    pub fn new_readonly(pubkey: PublicKey, is_signer: bool) -> Self {
        Self {
            pubkey,
            is_signer,
            is_writable: false,
        }
    }
}

/// A single program invocation. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    program_id: PublicKey,
    accounts: Vec<AccountMeta>,
    data: Vec<u8>,
}

impl Instruction {
    pub fn new(program_id: PublicKey, accounts: Vec<AccountMeta>, data: Vec<u8>) -> Self {
        Self {
            program_id,
            accounts,
            data,
        }
    }

    pub fn program_id(&self) -> &PublicKey {
        &self.program_id
    }

    /// Account references in the order the program expects them.
    pub fn accounts(&self) -> &[AccountMeta] {
        &self.accounts
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }
}
