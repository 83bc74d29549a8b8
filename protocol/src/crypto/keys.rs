//! # Key Management
//!
//! Ed25519 identities for Virtron accounts: the 32-byte [`PublicKey`] that
//! names every account on the ledger, the 64-byte [`Signature`] that proves
//! authorization, and the [`Keypair`] that produces those signatures.
//!
//! ## Constructing a keypair
//!
//! There is exactly one keypair type. How it came to exist does not change
//! how it behaves afterwards, so the construction paths are plain named
//! constructors:
//!
//! - [`Keypair::generate`] — fresh key from the OS RNG.
//! - [`Keypair::generate_with_recovery_phrase`] — fresh BIP-39 phrase, key
//!   derived from it, phrase kept for later recovery.
//! - [`Keypair::from_recovery_phrase`] — deterministic derivation from a
//!   checksummed phrase.
//! - [`Keypair::from_raw`] — import of `secret ‖ public` bytes.
//!
//! ## Security considerations
//!
//! - `Keypair` is not `Clone`. One owner, one copy of the secret.
//! - Private keys are zeroized on drop (ed25519-dalek does this for us).
//! - Key bytes are never logged, and `Debug` only ever shows the public half.

use std::fmt;
use std::str::FromStr;

use ed25519_dalek::{Signature as DalekSignature, Signer as _, SigningKey, Verifier, VerifyingKey};
use rand::rngs::OsRng;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::config::{KEYPAIR_LENGTH, PUBLIC_KEY_LENGTH, SEED_LENGTH, SIGNATURE_LENGTH};
use crate::identity::recovery::RecoveryPhrase;

/// Errors that can occur while parsing identifiers or importing keys.
///
/// `InvalidEncoding` and `InvalidLength` are kept apart on purpose: a typo
/// in a pasted address and a truncated address are different user problems.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyError {
    #[error("invalid base58 encoding")]
    InvalidEncoding,

    #[error("invalid length: expected {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("invalid keypair length: expected {expected} bytes, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },

    #[error("keypair validation failed: public key does not match secret key")]
    KeyMismatch,

    #[error("invalid recovery phrase")]
    InvalidRecoveryPhrase,
}

// ---------------------------------------------------------------------------
// PublicKey
// ---------------------------------------------------------------------------

/// A 32-byte account identifier.
///
/// Equality is byte-exact and the value never changes after construction.
/// The canonical text form is base-58, which is what shows up in transport
/// JSON, logs, and anywhere a human has to copy one around.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct PublicKey([u8; PUBLIC_KEY_LENGTH]);

impl PublicKey {
    /// Wraps raw bytes. Total: any 32 bytes are a valid identifier.
    pub const fn new(bytes: [u8; PUBLIC_KEY_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Builds an identifier from a byte slice that must be exactly 32 bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, KeyError> {
        let arr: [u8; PUBLIC_KEY_LENGTH] =
            bytes.try_into().map_err(|_| KeyError::InvalidLength {
                expected: PUBLIC_KEY_LENGTH,
                actual: bytes.len(),
            })?;
        Ok(Self(arr))
    }

    /// Parses the base-58 text form.
    ///
    /// Characters outside the alphabet fail with [`KeyError::InvalidEncoding`];
    /// well-formed base-58 that decodes to anything but 32 bytes fails with
    /// [`KeyError::InvalidLength`].
    pub fn from_text(text: &str) -> Result<Self, KeyError> {
        let decoded = bs58::decode(text)
            .into_vec()
            .map_err(|_| KeyError::InvalidEncoding)?;
        Self::from_bytes(&decoded)
    }

    pub fn to_text(&self) -> String {
        bs58::encode(self.0).into_string()
    }

    pub fn to_bytes(&self) -> [u8; PUBLIC_KEY_LENGTH] {
        self.0
    }

    pub fn as_bytes(&self) -> &[u8; PUBLIC_KEY_LENGTH] {
        &self.0
    }

    /// Byte-exact comparison. Same as `==`, spelled out for call sites that
    /// read better as a method.
    pub fn equals(&self, other: &PublicKey) -> bool {
        self.0 == other.0
    }

    /// Verifies an Ed25519 signature made by this identifier's secret key.
    ///
    /// Never errors. Bytes that are not a valid curve point simply cannot
    /// have produced a valid signature, so they verify as `false`.
    pub fn verify(&self, message: &[u8], signature: &Signature) -> bool {
        let Ok(verifying_key) = VerifyingKey::from_bytes(&self.0) else {
            return false;
        };
        let dalek_sig = DalekSignature::from_bytes(&signature.0);
        verifying_key.verify(message, &dalek_sig).is_ok()
    }
}

impl FromStr for PublicKey {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_text(s)
    }
}

impl From<[u8; PUBLIC_KEY_LENGTH]> for PublicKey {
    fn from(bytes: [u8; PUBLIC_KEY_LENGTH]) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", self.to_text())
    }
}

impl Serialize for PublicKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_text())
    }
}

impl<'de> Deserialize<'de> for PublicKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::from_text(&text).map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Signature
// ---------------------------------------------------------------------------

/// A 64-byte Ed25519 signature.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Signature([u8; SIGNATURE_LENGTH]);

impl Signature {
    pub const fn new(bytes: [u8; SIGNATURE_LENGTH]) -> Self {
        Self(bytes)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, KeyError> {
        let arr: [u8; SIGNATURE_LENGTH] =
            bytes.try_into().map_err(|_| KeyError::InvalidLength {
                expected: SIGNATURE_LENGTH,
                actual: bytes.len(),
            })?;
        Ok(Self(arr))
    }

    /// Parses the base-58 text form used on the wire.
    pub fn from_text(text: &str) -> Result<Self, KeyError> {
        let decoded = bs58::decode(text)
            .into_vec()
            .map_err(|_| KeyError::InvalidEncoding)?;
        Self::from_bytes(&decoded)
    }

    pub fn to_text(&self) -> String {
        bs58::encode(self.0).into_string()
    }

    pub fn as_bytes(&self) -> &[u8; SIGNATURE_LENGTH] {
        &self.0
    }

    pub fn to_bytes(&self) -> [u8; SIGNATURE_LENGTH] {
        self.0
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hex_str = hex::encode(self.0);
        write!(f, "Signature({}...{})", &hex_str[..8], &hex_str[120..])
    }
}

impl Serialize for Signature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_text())
    }
}

impl<'de> Deserialize<'de> for Signature {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::from_text(&text).map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Signer
// ---------------------------------------------------------------------------

/// Anything that can authorize a transaction.
///
/// [`Keypair`] is the in-process implementation. Hardware wallets or remote
/// signers plug in here without the transaction layer ever touching their
/// private material.
pub trait Signer {
    /// The identifier whose signature slot this signer fills.
    fn pubkey(&self) -> PublicKey;

    /// Signs `message` with the private half of [`Signer::pubkey`].
    fn sign_message(&self, message: &[u8]) -> Signature;
}

// ---------------------------------------------------------------------------
// Keypair
// ---------------------------------------------------------------------------

/// An Ed25519 signing key together with its derived [`PublicKey`].
///
/// # Examples
///
/// ```
/// use virtron_protocol::crypto::keys::Keypair;
///
/// let kp = Keypair::generate();
/// let msg = b"move 500 vinnies to the treasury";
/// let sig = kp.sign(msg);
/// assert!(kp.verify(msg, &sig, &kp.pubkey()));
/// ```
pub struct Keypair {
    signing_key: SigningKey,
    recovery_phrase: Option<RecoveryPhrase>,
}

impl Keypair {
    /// Generates a fresh keypair from the OS cryptographic RNG.
    ///
    /// An entropy failure inside `OsRng` panics; there is nothing a caller
    /// could do to recover from a broken RNG.
    pub fn generate() -> Self {
        Self {
            signing_key: SigningKey::generate(&mut OsRng),
            recovery_phrase: None,
        }
    }

    /// Generates a fresh 12-word recovery phrase and derives the key from it.
    ///
    /// The phrase is retained and can be read back with
    /// [`recovery_phrase`](Self::recovery_phrase) so it can be written down.
    pub fn generate_with_recovery_phrase() -> Self {
        let phrase = RecoveryPhrase::generate();
        Self::from_seed(&phrase.derive_seed(), Some(phrase))
    }

    /// Derives a keypair deterministically from a BIP-39 recovery phrase.
    ///
    /// Fails with [`KeyError::InvalidRecoveryPhrase`] when a word is not in
    /// the English wordlist or the checksum does not match.
    pub fn from_recovery_phrase(phrase: &str) -> Result<Self, KeyError> {
        let phrase = RecoveryPhrase::parse(phrase)?;
        Ok(Self::from_seed(&phrase.derive_seed(), Some(phrase)))
    }

    /// Imports raw key material laid out as `secret(32) ‖ public(32)`.
    ///
    /// Unless `skip_check` is set, the embedded public half must match the
    /// public key re-derived from the secret half. Either way the resulting
    /// identifier is the re-derived one, so signatures always verify against
    /// [`pubkey`](Self::pubkey).
    pub fn from_raw(bytes: &[u8], skip_check: bool) -> Result<Self, KeyError> {
        if bytes.len() != KEYPAIR_LENGTH {
            return Err(KeyError::InvalidKeyLength {
                expected: KEYPAIR_LENGTH,
                actual: bytes.len(),
            });
        }
        let (secret, public) = bytes.split_at(SEED_LENGTH);
        let mut seed = [0u8; SEED_LENGTH];
        seed.copy_from_slice(secret);
        let signing_key = SigningKey::from_bytes(&seed);

        if !skip_check && signing_key.verifying_key().as_bytes()[..] != public[..] {
            return Err(KeyError::KeyMismatch);
        }

        Ok(Self {
            signing_key,
            recovery_phrase: None,
        })
    }

    fn from_seed(seed: &[u8; SEED_LENGTH], recovery_phrase: Option<RecoveryPhrase>) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(seed),
            recovery_phrase,
        }
    }

    /// Exports the key as `secret(32) ‖ public(32)`, the layout
    /// [`from_raw`](Self::from_raw) accepts.
    ///
    /// This is a copy of the secret. Treat it accordingly.
    pub fn to_raw_bytes(&self) -> [u8; KEYPAIR_LENGTH] {
        self.signing_key.to_keypair_bytes()
    }

    pub fn pubkey(&self) -> PublicKey {
        PublicKey(self.signing_key.verifying_key().to_bytes())
    }

    /// The phrase this key was derived from, if it came from one.
    pub fn recovery_phrase(&self) -> Option<&str> {
        self.recovery_phrase.as_ref().map(RecoveryPhrase::phrase)
    }

    /// Re-derives the keypair from its retained recovery phrase.
    ///
    /// `None` when the key was not derived from a phrase (generated or
    /// imported raw), so there is nothing to recover from.
    pub fn recover(&self) -> Option<Result<Self, KeyError>> {
        self.recovery_phrase().map(Self::from_recovery_phrase)
    }

    /// Signs a message. Ed25519 is deterministic: same key, same message,
    /// same signature.
    pub fn sign(&self, message: &[u8]) -> Signature {
        Signature(self.signing_key.sign(message).to_bytes())
    }

    /// Checks `signature` over `message` against `pubkey`.
    ///
    /// The identifier is explicit so one keypair can check signatures made
    /// by others. Returns `false` on any mismatch.
    pub fn verify(&self, message: &[u8], signature: &Signature, pubkey: &PublicKey) -> bool {
        pubkey.verify(message, signature)
    }
}

impl Signer for Keypair {
    fn pubkey(&self) -> PublicKey {
        Keypair::pubkey(self)
    }

    fn sign_message(&self, message: &[u8]) -> Signature {
        self.sign(message)
    }
}

impl fmt::Debug for Keypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Public half only.
        write!(f, "Keypair(pub={})", self.pubkey())
    }
}

impl PartialEq for Keypair {
    fn eq(&self, other: &Self) -> bool {
        self.pubkey() == other.pubkey()
    }
}

impl Eq for Keypair {}

#[cfg(test)]
mod tests {
    use super::*;

    const PHRASE: &str =
        "legal winner thank year wave sausage worth useful legal winner thank yellow";

    #[test]
    fn public_key_bytes_roundtrip() {
        let bytes = [7u8; 32];
        let pk = PublicKey::from_bytes(&bytes).unwrap();
        assert_eq!(pk.to_bytes(), bytes);
    }

    #[test]
    fn public_key_text_roundtrip() {
        let pk = Keypair::generate().pubkey();
        let parsed = PublicKey::from_text(&pk.to_text()).unwrap();
        assert!(parsed.equals(&pk));
    }

    #[test]
    fn all_zero_key_is_the_ones_string() {
        let pk = PublicKey::new([0u8; 32]);
        assert_eq!(pk.to_text(), "11111111111111111111111111111111");
    }

    #[test]
    fn from_bytes_rejects_wrong_length() {
        assert_eq!(
            PublicKey::from_bytes(&[1u8; 31]),
            Err(KeyError::InvalidLength {
                expected: 32,
                actual: 31
            })
        );
        assert!(PublicKey::from_bytes(&[1u8; 33]).is_err());
    }

    #[test]
    fn from_text_distinguishes_encoding_and_length() {
        // '0', 'O', 'I' and 'l' are not in the base58 alphabet.
        assert_eq!(
            PublicKey::from_text("0OIl0OIl"),
            Err(KeyError::InvalidEncoding)
        );
        // Valid base58, but decodes to 3 bytes.
        assert!(matches!(
            PublicKey::from_text("abc"),
            Err(KeyError::InvalidLength { expected: 32, .. })
        ));
    }

    #[test]
    fn public_key_serde_is_base58_string() {
        let pk = Keypair::generate().pubkey();
        let json = serde_json::to_string(&pk).unwrap();
        assert_eq!(json, format!("\"{}\"", pk.to_text()));
        let back: PublicKey = serde_json::from_str(&json).unwrap();
        assert_eq!(back, pk);
    }

    #[test]
    fn sign_verify_roundtrip() {
        let kp = Keypair::generate();
        let sig = kp.sign(b"hello virtron");
        assert!(kp.verify(b"hello virtron", &sig, &kp.pubkey()));
        assert!(kp.pubkey().verify(b"hello virtron", &sig));
    }

    #[test]
    fn verify_is_false_on_mismatch() {
        let kp = Keypair::generate();
        let other = Keypair::generate();
        let sig = kp.sign(b"message");
        assert!(!kp.verify(b"other message", &sig, &kp.pubkey()));
        assert!(!kp.verify(b"message", &sig, &other.pubkey()));
        // All-zero bytes are not a usable verifying key; still just `false`.
        assert!(!PublicKey::new([0u8; 32]).verify(b"message", &sig));
    }

    #[test]
    fn signatures_are_deterministic() {
        let kp = Keypair::generate();
        assert_eq!(kp.sign(b"same"), kp.sign(b"same"));
    }

    #[test]
    fn signature_text_roundtrip() {
        let sig = Keypair::generate().sign(b"x");
        assert_eq!(Signature::from_text(&sig.to_text()).unwrap(), sig);
        assert!(Signature::from_bytes(&[0u8; 63]).is_err());
    }

    #[test]
    fn generated_keypairs_differ() {
        assert_ne!(Keypair::generate().pubkey(), Keypair::generate().pubkey());
    }

    #[test]
    fn raw_roundtrip_with_check() {
        let kp = Keypair::generate();
        let raw = kp.to_raw_bytes();
        let restored = Keypair::from_raw(&raw, false).unwrap();
        assert_eq!(restored.pubkey(), kp.pubkey());
    }

    #[test]
    fn raw_rejects_wrong_length() {
        assert_eq!(
            Keypair::from_raw(&[0u8; 32], false).unwrap_err(),
            KeyError::InvalidKeyLength {
                expected: 64,
                actual: 32
            }
        );
    }

    #[test]
    fn raw_detects_public_half_mismatch() {
        let kp = Keypair::generate();
        let mut raw = kp.to_raw_bytes();
        raw[40] ^= 0xFF;
        assert_eq!(Keypair::from_raw(&raw, false).unwrap_err(), KeyError::KeyMismatch);

        // Opting out of the check keeps the re-derived identity.
        let imported = Keypair::from_raw(&raw, true).unwrap();
        assert_eq!(imported.pubkey(), kp.pubkey());
    }

    #[test]
    fn recovery_phrase_is_deterministic() {
        let a = Keypair::from_recovery_phrase(PHRASE).unwrap();
        let b = Keypair::from_recovery_phrase(PHRASE).unwrap();
        assert_eq!(a.pubkey(), b.pubkey());
        assert_eq!(a.recovery_phrase(), Some(PHRASE));
    }

    #[test]
    fn recovery_phrase_checksum_is_enforced() {
        // Every word is in the list; the checksum is not satisfied.
        let bad = "abandon abandon abandon abandon abandon abandon \
                   abandon abandon abandon abandon abandon abandon";
        assert_eq!(
            Keypair::from_recovery_phrase(bad).unwrap_err(),
            KeyError::InvalidRecoveryPhrase
        );
        assert!(Keypair::from_recovery_phrase("not a real phrase").is_err());
    }

    #[test]
    fn generated_phrase_recovers_same_key() {
        let kp = Keypair::generate_with_recovery_phrase();
        assert!(kp.recovery_phrase().is_some());
        let recovered = kp.recover().unwrap().unwrap();
        assert_eq!(recovered.pubkey(), kp.pubkey());
    }

    #[test]
    fn plain_generated_key_cannot_recover() {
        let kp = Keypair::generate();
        assert_eq!(kp.recovery_phrase(), None);
        assert!(kp.recover().is_none());

        let imported = Keypair::from_raw(&kp.to_raw_bytes(), false).unwrap();
        assert!(imported.recover().is_none());
    }

    #[test]
    fn debug_does_not_leak_secret() {
        let kp = Keypair::generate();
        let debug_str = format!("{:?}", kp);
        assert!(debug_str.starts_with("Keypair(pub="));
        assert!(!debug_str.contains(&hex::encode(&kp.to_raw_bytes()[..32])));
    }
}
