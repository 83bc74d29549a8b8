//! # Vault Program
//!
//! The concrete on-chain program this crate builds instructions for.
//!
//! ```text
//! codec.rs — tag + little-endian field layout of each instruction payload
//! vault.rs — builders that pair a payload with its account references
//! ```

pub mod codec;
pub mod vault;

pub use codec::{CodecError, InstructionKind, VaultInstruction};
pub use vault::VaultProgram;
