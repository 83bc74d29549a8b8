//! Full and partial signing.
//!
//! Both entry points compile the message once, then fill the slot of each
//! signer. A slot is keyed by identifier, so signing twice with the same key
//! replaces the earlier signature instead of adding a second one.
//!
//! - [`Transaction::sign`] expects the full signer set and reports any slot
//!   left empty as [`TransactionError::MissingRequiredSigner`].
//! - [`Transaction::partial_sign`] is for hand-offs: some signers now, the
//!   rest later on another machine.

use std::collections::HashSet;

use tracing::{debug, warn};

use super::builder::Transaction;
use super::error::TransactionError;
use crate::crypto::keys::{PublicKey, Signature, Signer};

impl Transaction {
    /// Signs with every given signer and requires the result to be complete.
    ///
    /// Signers that are not in the signer prefix are rejected up front with
    /// [`TransactionError::UnknownSigner`] and nothing is signed. Otherwise
    /// the slots are filled, and if any required slot is still empty the
    /// call returns [`TransactionError::MissingRequiredSigner`]. The
    /// signatures that were applied stay applied either way, so the partly
    /// signed transaction can still be serialized and passed on.
    pub fn sign<S: Signer>(&mut self, signers: &[&S]) -> Result<(), TransactionError> {
        self.apply_signatures(signers)?;

        let missing = self.missing_signers();
        if !missing.is_empty() {
            warn!(
                missing = missing.len(),
                required = self.num_required_signatures(),
                "transaction signed without every required signer"
            );
            return Err(TransactionError::MissingRequiredSigner { missing });
        }
        Ok(())
    }

    /// Signs with a subset of the required signers.
    ///
    /// Duplicate signers (same identifier) sign once. An empty list is a
    /// caller bug and fails with [`TransactionError::NoSignersProvided`].
    pub fn partial_sign<S: Signer>(&mut self, signers: &[&S]) -> Result<(), TransactionError> {
        if signers.is_empty() {
            return Err(TransactionError::NoSignersProvided);
        }
        self.apply_signatures(signers)
    }

    /// Attaches a signature produced elsewhere (hardware wallet, remote
    /// co-signer). The signature is not checked here; use
    /// [`verify_signatures`](Self::verify_signatures) for that.
    pub fn add_signature(
        &mut self,
        pubkey: PublicKey,
        signature: Signature,
    ) -> Result<(), TransactionError> {
        if !self.is_required_signer(&pubkey) {
            return Err(TransactionError::UnknownSigner(pubkey));
        }
        self.signatures.insert(pubkey, signature);
        Ok(())
    }

    fn apply_signatures<S: Signer>(&mut self, signers: &[&S]) -> Result<(), TransactionError> {
        let mut seen = HashSet::with_capacity(signers.len());
        let unique: Vec<&S> = signers
            .iter()
            .copied()
            .filter(|signer| seen.insert(signer.pubkey()))
            .collect();

        if let Some(unknown) = unique
            .iter()
            .map(|signer| signer.pubkey())
            .find(|pubkey| !self.is_required_signer(pubkey))
        {
            return Err(TransactionError::UnknownSigner(unknown));
        }

        let message = self.compile_message()?;
        for signer in unique {
            let pubkey = signer.pubkey();
            let replaced = self
                .signatures
                .insert(pubkey, signer.sign_message(&message))
                .is_some();
            debug!(signer = %pubkey, replaced, "signature slot filled");
        }
        Ok(())
    }
}
