//! Signature verification over the compiled message.
//!
//! The answer is a `bool`. A transaction whose signatures do not check out
//! is a perfectly ordinary thing to receive from the wire, and callers
//! branch on it rather than unwind from it.

use tracing::debug;

use super::builder::Transaction;
use crate::crypto::signatures::batch_verify;

impl Transaction {
    /// `true` when every required slot holds a signature that verifies
    /// against the compiled message and the slot's identifier.
    ///
    /// Any empty slot, any bad signature, or a message that cannot be
    /// compiled at all yields `false`.
    pub fn verify_signatures(&self) -> bool {
        let message = match self.compile_message() {
            Ok(message) => message,
            Err(err) => {
                debug!(error = %err, "cannot verify: message does not compile");
                return false;
            }
        };

        let mut items = Vec::new();
        for slot in self.signatures() {
            match slot.signature {
                Some(signature) => items.push((slot.pubkey, signature)),
                None => {
                    debug!(signer = %slot.pubkey, "cannot verify: slot is empty");
                    return false;
                }
            }
        }

        batch_verify(&message, &items).is_ok()
    }
}
