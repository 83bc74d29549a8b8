//! # Digital Signatures
//!
//! Free-function front door to Ed25519 signing and verification. The types
//! in [`super::keys`] do the work; these exist so every signature check in
//! the crate goes through one auditable place.

use thiserror::Error;

use super::keys::{Keypair, PublicKey, Signature};

/// Errors during batch signature checks.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SignatureError {
    #[error("signature verification failed")]
    VerificationFailed,
}

/// Signs `message` with `keypair`.
pub fn sign(keypair: &Keypair, message: &[u8]) -> Signature {
    keypair.sign(message)
}

/// Verifies `signature` over `message` against `public_key`.
///
/// Returns `false` for any failure. "Signature invalid" is an expected
/// answer here, not an exceptional one.
pub fn verify(public_key: &PublicKey, message: &[u8], signature: &Signature) -> bool {
    public_key.verify(message, signature)
}

/// Verifies every `(public_key, signature)` pair over one shared message.
///
/// This is the shape of a transaction: many signers, one message. All must
/// pass; we do not report which one failed.
pub fn batch_verify(message: &[u8], items: &[(PublicKey, Signature)]) -> Result<(), SignatureError> {
    for (pubkey, signature) in items {
        if !verify(pubkey, message, signature) {
            return Err(SignatureError::VerificationFailed);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_and_verify() {
        let kp = Keypair::generate();
        let sig = sign(&kp, b"hello");
        assert!(verify(&kp.pubkey(), b"hello", &sig));
    }

    #[test]
    fn test_wrong_key_fails() {
        let kp1 = Keypair::generate();
        let kp2 = Keypair::generate();
        let sig = sign(&kp1, b"hello");
        assert!(!verify(&kp2.pubkey(), b"hello", &sig));
    }

    #[test]
    fn test_batch_verify_success() {
        let message = b"one message, many signers";
        let items: Vec<_> = (0..5)
            .map(|_| {
                let kp = Keypair::generate();
                (kp.pubkey(), sign(&kp, message))
            })
            .collect();
        assert!(batch_verify(message, &items).is_ok());
    }

    #[test]
    fn test_batch_verify_one_bad_apple() {
        let message = b"shared";
        let kp1 = Keypair::generate();
        let kp2 = Keypair::generate();
        let items = vec![
            (kp1.pubkey(), sign(&kp1, message)),
            (kp1.pubkey(), sign(&kp2, message)),
        ];
        assert_eq!(
            batch_verify(message, &items),
            Err(SignatureError::VerificationFailed)
        );
    }

    #[test]
    fn test_batch_verify_empty() {
        assert!(batch_verify(b"anything", &[]).is_ok());
    }
}
