//! # Cryptographic Primitives
//!
//! Ed25519 keys and signatures, SHA-256 hashing. Every signature a
//! transaction carries is produced and checked through this module.
//!
//! Nothing here is novel. These are thin, typed wrappers around
//! `ed25519-dalek` and `sha2`; the value is in the types, not the math.

pub mod hash;
pub mod keys;
pub mod signatures;

pub use hash::{hash, sha256, Hash};
pub use keys::{KeyError, Keypair, PublicKey, Signature, Signer};
pub use signatures::{batch_verify, sign, verify};
