//! # Protocol Configuration & Constants
//!
//! Every magic number in the transaction layer lives here, next to the one
//! piece of runtime configuration instruction builders need: which program
//! they are addressing.

use crate::crypto::keys::{KeyError, PublicKey};

// ---------------------------------------------------------------------------
// Cryptographic Parameters
// ---------------------------------------------------------------------------

/// Account identifiers are raw Ed25519 public keys.
pub const PUBLIC_KEY_LENGTH: usize = 32;

/// Ed25519 signatures are always 64 bytes.
pub const SIGNATURE_LENGTH: usize = 64;

/// Ed25519 secret seed length.
pub const SEED_LENGTH: usize = 32;

/// Raw keypair import/export layout: `secret(32) ‖ public(32)`.
pub const KEYPAIR_LENGTH: usize = SEED_LENGTH + PUBLIC_KEY_LENGTH;

/// SHA-256 digest length, also the width of the recent-blockhash nonce.
pub const HASH_LENGTH: usize = 32;

// ---------------------------------------------------------------------------
// Message Limits
// ---------------------------------------------------------------------------

/// Most distinct accounts one message can carry.
///
/// Both the per-instruction account indexes and the three header counts are
/// single bytes. A count has to hold the full table size when every account
/// falls in one group, so the limit is `u8::MAX`, not the 256 an index could
/// address.
pub const MAX_ACCOUNT_KEYS: usize = u8::MAX as usize;

// ---------------------------------------------------------------------------
// Denominations
// ---------------------------------------------------------------------------

/// Vinnies are the smallest unit. 1 VRT = 1,000 vinnies.
pub const VINNIES_PER_VRT: u64 = 1_000;

/// Funding for a freshly initialized vault treasury: 1 billion VRT.
pub const INITIAL_SUPPLY_VINNIES: u64 = 1_000_000_000 * VINNIES_PER_VRT;

/// Converts whole VRT to vinnies. `None` on overflow; we don't wrap money.
pub fn vrt_to_vinnies(vrt: u64) -> Option<u64> {
    vrt.checked_mul(VINNIES_PER_VRT)
}

// ---------------------------------------------------------------------------
// Program Configuration
// ---------------------------------------------------------------------------

/// Base-58 text of the default vault program identifier (32 zero bytes).
pub const DEFAULT_PROGRAM_ID: &str = "11111111111111111111111111111111";

/// Which on-chain program instruction builders target.
///
/// Passed explicitly into [`crate::program::VaultProgram`]. There is no
/// process-wide program id to mutate; two builders configured differently
/// can coexist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgramConfig {
    pub program_id: PublicKey,
}

impl ProgramConfig {
    pub fn new(program_id: PublicKey) -> Self {
        Self { program_id }
    }

    /// Parses a base-58 program identifier, e.g. from a config file or flag.
    pub fn from_text(program_id: &str) -> Result<Self, KeyError> {
        Ok(Self::new(PublicKey::from_text(program_id)?))
    }
}

impl Default for ProgramConfig {
    fn default() -> Self {
        Self::new(PublicKey::new([0u8; PUBLIC_KEY_LENGTH]))
    }
}
