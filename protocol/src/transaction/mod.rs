//! # Transaction Module
//!
//! Building, signing, verifying, and transporting transactions.
//!
//! ## Architecture
//!
//! ```text
//! instruction.rs  — AccountMeta and Instruction (one program invocation)
//! builder.rs      — Transaction: instruction list + account key table
//! message.rs      — canonical message compiler (the signed bytes)
//! signing.rs      — sign / partial_sign / add_signature
//! verification.rs — verify_signatures
//! wire.rs         — JSON transport serialize / deserialize
//! submit.rs       — SubmissionChannel seam
//! error.rs        — TransactionError
//! ```
//!
//! ## Lifecycle
//!
//! 1. **Build**: [`Transaction::add`] instructions; the account table grows.
//! 2. **Sign**: [`Transaction::sign`] with every signer, or
//!    [`Transaction::partial_sign`] with some of them.
//! 3. **Transport**: [`Transaction::serialize`] at any signing state, and
//!    [`Transaction::deserialize`] on the other side to continue signing.
//! 4. **Check**: [`Transaction::verify_signatures`].
//! 5. **Submit**: [`submit_transaction`] through a [`SubmissionChannel`].
//!
//! ## Invariants
//!
//! - Each identifier appears once in the account table. Its signer and
//!   writable flags are the OR of every reference to it.
//! - Compiled order is signers first, then writable before read-only, ties
//!   broken by first appearance.
//! - The compiled message never depends on collected signatures. Changing
//!   the instructions or the nonce discards them.

pub mod builder;
pub mod error;
pub mod instruction;
pub mod message;
pub mod signing;
pub mod submit;
pub mod verification;
pub mod wire;

pub use builder::{SignatureSlot, Transaction};
pub use error::TransactionError;
pub use instruction::{AccountMeta, Instruction};
pub use message::{CompiledInstruction, Message, MessageHeader};
pub use submit::{submit_transaction, SubmissionChannel, SubmissionReceipt, SubmissionStatus};
pub use wire::{deserialize, serialize};
