//! Canonical message compilation.
//!
//! The message is the exact byte string every signer signs. It must be a
//! pure function of the instruction list, the account table, and the nonce:
//! signatures never feed back into it, and the same logical content always
//! produces the same bytes.
//!
//! # Byte layout
//!
//! ```text
//! header            3 × u8   [required sigs, read-only signed, read-only unsigned]
//! account keys      compact-u16 count, then 32 bytes each (compiled order)
//! recent blockhash  u8 flag (0 = absent, 1 = present), then 32 bytes if present
//! instructions      compact-u16 count, then per instruction:
//!                     program id      32 bytes
//!                     account indexes compact-u16 count, then u8 each
//!                     data            compact-u16 length, then raw bytes
//! ```
//!
//! compact-u16 is the 7-bits-per-byte varint: low bits first, high bit set
//! on every byte but the last.
//!
//! The way back is [`Message::deserialize`] followed by
//! [`Transaction::populate`], for callers that receive the signed bytes and
//! the signatures separately.

use std::collections::HashSet;

use tracing::debug;

use super::builder::Transaction;
use super::error::TransactionError;
use super::instruction::{AccountMeta, Instruction};
use crate::config::{HASH_LENGTH, MAX_ACCOUNT_KEYS, PUBLIC_KEY_LENGTH};
use crate::crypto::hash::{self, Hash};
use crate::crypto::keys::{PublicKey, Signature};

/// Counts that let a reader split the account key list into its four groups.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MessageHeader {
    pub num_required_signatures: u8,
    pub num_readonly_signed_accounts: u8,
    pub num_readonly_unsigned_accounts: u8,
}

/// An instruction with its accounts replaced by indexes into the message's
/// account key list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledInstruction {
    pub program_id: PublicKey,
    pub accounts: Vec<u8>,
    pub data: Vec<u8>,
}

/// The structured form of the signed bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub header: MessageHeader,
    pub account_keys: Vec<PublicKey>,
    pub recent_blockhash: Option<Hash>,
    pub instructions: Vec<CompiledInstruction>,
}

impl Message {
    /// Compiles instructions against an account table.
    ///
    /// `table` may be in any order; it is sorted here into signer/writable
    /// groups (stable, so first-seen order breaks ties). Every account an
    /// instruction references must be in the table.
    pub fn compile(
        instructions: &[Instruction],
        table: &[AccountMeta],
        recent_blockhash: Option<Hash>,
    ) -> Result<Self, TransactionError> {
        if table.len() > MAX_ACCOUNT_KEYS {
            return Err(TransactionError::TooManyAccountKeys(table.len()));
        }

        let mut ordered = table.to_vec();
        ordered.sort_by_key(|meta| (!meta.is_signer, !meta.is_writable));

        let count = |predicate: fn(&AccountMeta) -> bool| {
            let n = ordered.iter().filter(|m| predicate(m)).count();
            u8::try_from(n).map_err(|_| TransactionError::TooManyAccountKeys(ordered.len()))
        };
        let header = MessageHeader {
            num_required_signatures: count(|m| m.is_signer)?,
            num_readonly_signed_accounts: count(|m| m.is_signer && !m.is_writable)?,
            num_readonly_unsigned_accounts: count(|m| !m.is_signer && !m.is_writable)?,
        };

        let account_keys: Vec<PublicKey> = ordered.iter().map(|m| m.pubkey).collect();

        let instructions = instructions
            .iter()
            .map(|ix| {
                let accounts = ix
                    .accounts()
                    .iter()
                    .map(|meta| index_of(&account_keys, &meta.pubkey))
                    .collect::<Result<Vec<u8>, _>>()?;
                Ok(CompiledInstruction {
                    program_id: *ix.program_id(),
                    accounts,
                    data: ix.data().to_vec(),
                })
            })
            .collect::<Result<Vec<_>, TransactionError>>()?;

        Ok(Self {
            header,
            account_keys,
            recent_blockhash,
            instructions,
        })
    }

    /// The canonical bytes. See the module docs for the layout.
    pub fn serialize(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(
            3 + 3 + self.account_keys.len() * 32 + 33 + self.instructions.len() * 64,
        );

        buf.push(self.header.num_required_signatures);
        buf.push(self.header.num_readonly_signed_accounts);
        buf.push(self.header.num_readonly_unsigned_accounts);

        encode_len(&mut buf, self.account_keys.len());
        for key in &self.account_keys {
            buf.extend_from_slice(key.as_bytes());
        }

        match &self.recent_blockhash {
            Some(blockhash) => {
                buf.push(0x01);
                buf.extend_from_slice(blockhash.as_bytes());
            }
            None => buf.push(0x00),
        }

        encode_len(&mut buf, self.instructions.len());
        for ix in &self.instructions {
            buf.extend_from_slice(ix.program_id.as_bytes());
            encode_len(&mut buf, ix.accounts.len());
            buf.extend_from_slice(&ix.accounts);
            encode_len(&mut buf, ix.data.len());
            buf.extend_from_slice(&ix.data);
        }

        buf
    }

    /// Parses bytes produced by [`serialize`](Self::serialize).
    ///
    /// The whole input must be consumed, and the result must pass
    /// [`sanitize`](Self::sanitize). Anything else is `MalformedTransport`.
    pub fn deserialize(bytes: &[u8]) -> Result<Self, TransactionError> {
        let mut reader = Reader::new(bytes);

        let header = MessageHeader {
            num_required_signatures: reader.byte()?,
            num_readonly_signed_accounts: reader.byte()?,
            num_readonly_unsigned_accounts: reader.byte()?,
        };

        let num_keys = reader.compact_len()?;
        if num_keys > MAX_ACCOUNT_KEYS {
            return Err(TransactionError::TooManyAccountKeys(num_keys));
        }
        let mut account_keys = Vec::with_capacity(num_keys);
        for _ in 0..num_keys {
            account_keys.push(PublicKey::new(reader.array::<PUBLIC_KEY_LENGTH>()?));
        }

        let recent_blockhash = match reader.byte()? {
            0x00 => None,
            0x01 => Some(Hash::new(reader.array::<HASH_LENGTH>()?)),
            flag => return Err(malformed(format!("invalid blockhash flag {flag:#04x}"))),
        };

        let num_instructions = reader.compact_len()?;
        let mut instructions = Vec::new();
        for _ in 0..num_instructions {
            let program_id = PublicKey::new(reader.array::<PUBLIC_KEY_LENGTH>()?);
            let num_accounts = reader.compact_len()?;
            let accounts = reader.take(num_accounts)?.to_vec();
            let data_len = reader.compact_len()?;
            let data = reader.take(data_len)?.to_vec();
            instructions.push(CompiledInstruction {
                program_id,
                accounts,
                data,
            });
        }

        if reader.remaining() > 0 {
            return Err(malformed(format!(
                "{} trailing bytes after message",
                reader.remaining()
            )));
        }

        let message = Self {
            header,
            account_keys,
            recent_blockhash,
            instructions,
        };
        message.sanitize()?;
        Ok(message)
    }

    /// Checks that the header agrees with the key list and that every
    /// instruction index points into it. Compiled messages always pass;
    /// parsed or hand-built ones may not.
    pub fn sanitize(&self) -> Result<(), TransactionError> {
        let num_keys = self.account_keys.len();
        if num_keys > MAX_ACCOUNT_KEYS {
            return Err(TransactionError::TooManyAccountKeys(num_keys));
        }

        let required = self.header.num_required_signatures as usize;
        let readonly_signed = self.header.num_readonly_signed_accounts as usize;
        let readonly_unsigned = self.header.num_readonly_unsigned_accounts as usize;
        if required > num_keys
            || readonly_signed > required
            || readonly_unsigned > num_keys - required
        {
            return Err(malformed(format!(
                "header {:?} does not fit {num_keys} account keys",
                self.header
            )));
        }

        let mut seen = HashSet::with_capacity(num_keys);
        if let Some(dup) = self.account_keys.iter().find(|key| !seen.insert(**key)) {
            return Err(malformed(format!("account key {dup} listed twice")));
        }

        for (position, ix) in self.instructions.iter().enumerate() {
            if let Some(&index) = ix.accounts.iter().find(|&&i| i as usize >= num_keys) {
                return Err(malformed(format!(
                    "instruction {position} references account index {index} of {num_keys}"
                )));
            }
        }
        Ok(())
    }

    /// The signer prefix of the account key list.
    pub fn signer_keys(&self) -> &[PublicKey] {
        let n = self.header.num_required_signatures as usize;
        &self.account_keys[..n.min(self.account_keys.len())]
    }

    pub fn is_signer(&self, index: usize) -> bool {
        index < self.header.num_required_signatures as usize
    }

    /// Whether the account at `index` is writable, derived from the header
    /// the same way a reader of the bytes would.
    pub fn is_writable(&self, index: usize) -> bool {
        let num_keys = self.account_keys.len();
        let num_signed = self.header.num_required_signatures as usize;
        if index >= num_keys {
            return false;
        }
        if index < num_signed {
            index < num_signed.saturating_sub(self.header.num_readonly_signed_accounts as usize)
        } else {
            index < num_keys.saturating_sub(self.header.num_readonly_unsigned_accounts as usize)
        }
    }
}

fn index_of(keys: &[PublicKey], pubkey: &PublicKey) -> Result<u8, TransactionError> {
    let position = keys.iter().position(|k| k == pubkey).ok_or_else(|| {
        TransactionError::MalformedTransport(format!(
            "instruction references {pubkey} which is not in the account table"
        ))
    })?;
    u8::try_from(position).map_err(|_| TransactionError::TooManyAccountKeys(keys.len()))
}

fn malformed(reason: String) -> TransactionError {
    TransactionError::MalformedTransport(reason)
}

/// Appends `len` as a compact-u16 varint.
fn encode_len(buf: &mut Vec<u8>, len: usize) {
    let mut rem = len;
    loop {
        let mut byte = (rem & 0x7f) as u8;
        rem >>= 7;
        if rem == 0 {
            buf.push(byte);
            break;
        }
        byte |= 0x80;
        buf.push(byte);
    }
}

/// Cursor over message bytes. Every read is bounds-checked.
struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], TransactionError> {
        if n > self.remaining() {
            return Err(malformed(format!(
                "message truncated at byte {}: need {n}, have {}",
                self.pos,
                self.remaining()
            )));
        }
        let slice = &self.bytes[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    fn byte(&mut self) -> Result<u8, TransactionError> {
        Ok(self.take(1)?[0])
    }

    fn array<const N: usize>(&mut self) -> Result<[u8; N], TransactionError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    /// Reads a compact-u16. Rejects encodings longer than three bytes,
    /// values above `u16::MAX`, and non-minimal forms, so every length has
    /// exactly one byte representation.
    fn compact_len(&mut self) -> Result<usize, TransactionError> {
        let start = self.pos;
        let mut value = 0usize;
        for i in 0..3 {
            let byte = self.byte()?;
            value |= ((byte & 0x7f) as usize) << (7 * i);
            if byte & 0x80 == 0 {
                if i > 0 && byte == 0 {
                    return Err(malformed(format!("non-minimal length at byte {start}")));
                }
                if value > u16::MAX as usize {
                    return Err(malformed(format!("length overflow at byte {start}")));
                }
                return Ok(value);
            }
        }
        Err(malformed(format!("length longer than 3 bytes at byte {start}")))
    }
}

// ---------------------------------------------------------------------------
// Transaction entry points
// ---------------------------------------------------------------------------

impl Transaction {
    /// Compiles the structured message for the current instructions.
    pub fn message(&self) -> Result<Message, TransactionError> {
        Message::compile(
            self.instructions(),
            self.account_metas(),
            self.recent_blockhash().copied(),
        )
    }

    /// The canonical bytes signers sign.
    ///
    /// Deterministic: unchanged state always compiles to identical bytes,
    /// whatever the signature slots hold.
    pub fn compile_message(&self) -> Result<Vec<u8>, TransactionError> {
        let bytes = self.message()?.serialize();
        debug!(
            len = bytes.len(),
            hash = %hash::hash(&bytes).to_hex(),
            "message compiled"
        );
        Ok(bytes)
    }

    /// SHA-256 of the compiled message. Stable across signing, so it works
    /// as a correlation id in logs.
    pub fn message_hash(&self) -> Result<Hash, TransactionError> {
        Ok(hash::hash(&self.message()?.serialize()))
    }

    /// Rebuilds a transaction from a compiled message and its signatures.
    ///
    /// `signatures` is positional over the message's signer prefix; `None`
    /// marks a slot not signed yet, and a shorter list leaves the tail
    /// empty. Signer and writable flags come from the header, and the
    /// account table is seeded in message order, so the result compiles back
    /// to the same bytes. The fee payer is the first signer, as for any
    /// transaction.
    pub fn populate(
        message: Message,
        signatures: Vec<Option<Signature>>,
    ) -> Result<Self, TransactionError> {
        message.sanitize()?;
        let signers = message.signer_keys();
        if signatures.len() > signers.len() {
            return Err(malformed(format!(
                "{} signatures for {} required signers",
                signatures.len(),
                signers.len()
            )));
        }

        let mut tx = match message.recent_blockhash {
            Some(blockhash) => Transaction::with_recent_blockhash(blockhash),
            None => Transaction::new(),
        };

        let meta_at = |index: usize| AccountMeta {
            pubkey: message.account_keys[index],
            is_signer: message.is_signer(index),
            is_writable: message.is_writable(index),
        };
        for index in 0..message.account_keys.len() {
            tx.register_account(meta_at(index));
        }
        for ix in &message.instructions {
            let accounts = ix.accounts.iter().map(|&i| meta_at(i as usize)).collect();
            tx.add(Instruction::new(ix.program_id, accounts, ix.data.clone()));
        }

        for (pubkey, signature) in signers.iter().zip(signatures) {
            if let Some(signature) = signature {
                tx.signatures.insert(*pubkey, signature);
            }
        }

        debug!(
            instructions = tx.instructions().len(),
            signatures = tx.signatures.len(),
            required = tx.num_required_signatures(),
            "transaction populated from message"
        );
        Ok(tx)
    }
}
