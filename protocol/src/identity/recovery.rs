//! # Recovery Phrases
//!
//! BIP-39 mnemonics for deterministic key recovery. A phrase is twelve (or
//! more) words from the English wordlist whose last bits are a checksum, so
//! a mistyped word is caught before it silently derives the wrong key.
//!
//! Derivation: `BIP-39 seed(phrase, passphrase = "")`, then the first 32
//! bytes of that 64-byte seed become the Ed25519 secret. No HD path is
//! applied; one phrase maps to one identity.

use bip39::{Language, Mnemonic, MnemonicType, Seed};

use crate::config::SEED_LENGTH;
use crate::crypto::keys::KeyError;

/// A checksum-validated BIP-39 phrase.
///
/// Only ever constructed through [`RecoveryPhrase::parse`] or
/// [`RecoveryPhrase::generate`], so holding one means the checksum passed.
pub struct RecoveryPhrase {
    mnemonic: Mnemonic,
}

impl RecoveryPhrase {
    /// Generates a fresh 12-word phrase from OS entropy.
    pub fn generate() -> Self {
        Self {
            mnemonic: Mnemonic::new(MnemonicType::Words12, Language::English),
        }
    }

    /// Parses and checksum-validates a phrase.
    pub fn parse(phrase: &str) -> Result<Self, KeyError> {
        let mnemonic = Mnemonic::from_phrase(phrase, Language::English)
            .map_err(|_| KeyError::InvalidRecoveryPhrase)?;
        Ok(Self { mnemonic })
    }

    pub fn phrase(&self) -> &str {
        self.mnemonic.phrase()
    }

    /// The 32-byte Ed25519 seed for this phrase.
    pub fn derive_seed(&self) -> [u8; SEED_LENGTH] {
        let seed = Seed::new(&self.mnemonic, "");
        let mut out = [0u8; SEED_LENGTH];
        out.copy_from_slice(&seed.as_bytes()[..SEED_LENGTH]);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_phrase_has_twelve_words() {
        let phrase = RecoveryPhrase::generate();
        assert_eq!(phrase.phrase().split_whitespace().count(), 12);
    }

    #[test]
    fn generated_phrase_parses_back() {
        let phrase = RecoveryPhrase::generate();
        let parsed = RecoveryPhrase::parse(phrase.phrase()).unwrap();
        assert_eq!(parsed.derive_seed(), phrase.derive_seed());
    }

    #[test]
    fn unknown_word_is_rejected() {
        let result = RecoveryPhrase::parse(
            "abandon abandon abandon abandon abandon abandon \
             abandon abandon abandon abandon abandon virtron",
        );
        assert!(matches!(result, Err(KeyError::InvalidRecoveryPhrase)));
    }

    #[test]
    fn different_phrases_derive_different_seeds() {
        let a = RecoveryPhrase::generate();
        let b = RecoveryPhrase::generate();
        assert_ne!(a.derive_seed(), b.derive_seed());
    }
}
