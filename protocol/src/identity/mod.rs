//! # Identity Module
//!
//! Everything about *who* signs, as opposed to *what* gets signed.
//!
//! 1. **Keypair** — Ed25519 key material, re-exported from
//!    [`crate::crypto::keys`] so identity-level code has one namespace.
//! 2. **Recovery** — BIP-39 phrases that deterministically regenerate a
//!    keypair after the device holding it is gone.

pub mod keypair;
pub mod recovery;

pub use keypair::{Keypair, PublicKey, Signature, Signer};
pub use recovery::RecoveryPhrase;
