// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Virtron Protocol — Transaction Library
//!
//! Client-side construction and signing of Virtron ledger transactions:
//! build a list of program instructions, compile it to the canonical message
//! every signer signs, collect signatures (possibly across machines), and
//! hand the result to a submission channel.
//!
//! ## Architecture
//!
//! - **crypto** — identifiers, Ed25519 key pairs, signatures, SHA-256.
//! - **identity** — BIP-39 recovery phrases for key backup.
//! - **program** — the vault program's instruction codec and builders.
//! - **transaction** — account table, message compiler, signing, transport.
//! - **config** — protocol constants and the program configuration.
//! - **logging** — `tracing` subscriber setup for binaries.
//!
//! ## Quick start
//!
//! ```no_run
//! use virtron_protocol::crypto::Keypair;
//! use virtron_protocol::program::VaultProgram;
//! use virtron_protocol::transaction::Transaction;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let payer = Keypair::generate();
//! let recipient = Keypair::generate().pubkey();
//!
//! let mut tx = Transaction::new();
//! tx.add(VaultProgram::default().transfer(&payer.pubkey(), &recipient, 1_000)?);
//! tx.sign(&[&payer])?;
//! assert!(tx.verify_signatures());
//!
//! let bytes = tx.serialize()?;
//! let same = Transaction::deserialize(&bytes)?;
//! assert!(same.is_complete());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod crypto;
pub mod identity;
pub mod logging;
pub mod program;
pub mod transaction;
