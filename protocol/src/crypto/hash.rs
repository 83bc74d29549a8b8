//! # Hashing Utilities
//!
//! SHA-256 and the 32-byte [`Hash`] value type.
//!
//! Two things in a transaction are hashes rather than identities: the
//! recent-blockhash nonce that ties a message to a window of ledger history,
//! and the message digest we log to correlate a transaction across signing
//! and submission without dumping the whole message.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};

use super::keys::KeyError;
use crate::config::HASH_LENGTH;

/// Computes the SHA-256 digest of `data` as a fixed-size array.
pub fn sha256(data: &[u8]) -> [u8; HASH_LENGTH] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    let result = hasher.finalize();
    let mut output = [0u8; HASH_LENGTH];
    output.copy_from_slice(&result);
    output
}

/// SHA-256 of `data`, wrapped as a [`Hash`].
pub fn hash(data: &[u8]) -> Hash {
    Hash(sha256(data))
}

/// A 32-byte digest with a base-58 text form.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Hash([u8; HASH_LENGTH]);

impl Hash {
    pub const fn new(bytes: [u8; HASH_LENGTH]) -> Self {
        Self(bytes)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, KeyError> {
        let arr: [u8; HASH_LENGTH] = bytes.try_into().map_err(|_| KeyError::InvalidLength {
            expected: HASH_LENGTH,
            actual: bytes.len(),
        })?;
        Ok(Self(arr))
    }

    pub fn from_text(text: &str) -> Result<Self, KeyError> {
        let decoded = bs58::decode(text)
            .into_vec()
            .map_err(|_| KeyError::InvalidEncoding)?;
        Self::from_bytes(&decoded)
    }

    pub fn to_text(&self) -> String {
        bs58::encode(self.0).into_string()
    }

    pub fn as_bytes(&self) -> &[u8; HASH_LENGTH] {
        &self.0
    }

    /// Lowercase hex. Handy for log lines that get grepped.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl FromStr for Hash {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_text(s)
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

impl fmt::Debug for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash({})", &self.to_hex()[..16])
    }
}

impl Serialize for Hash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_text())
    }
}

impl<'de> Deserialize<'de> for Hash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::from_text(&text).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha256_known_vector() {
        // SHA-256("abc"), FIPS 180-2 appendix B.1.
        assert_eq!(
            hex::encode(sha256(b"abc")),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn hash_is_deterministic() {
        assert_eq!(hash(b"virtron"), hash(b"virtron"));
        assert_ne!(hash(b"virtron"), hash(b"virtron!"));
    }

    #[test]
    fn hash_text_roundtrip() {
        let h = hash(b"recent blockhash");
        assert_eq!(Hash::from_text(&h.to_text()).unwrap(), h);
    }

    #[test]
    fn hash_rejects_wrong_length() {
        assert!(matches!(
            Hash::from_bytes(&[0u8; 20]),
            Err(KeyError::InvalidLength { expected: 32, actual: 20 })
        ));
    }
}
