//! Re-exports of the core key types for the identity layer.
//!
//! The canonical implementations live in [`crate::crypto::keys`].

pub use crate::crypto::keys::{KeyError, Keypair, PublicKey, Signature, Signer};
