//! Error types for transaction construction, signing, and transport.

use thiserror::Error;

use crate::crypto::keys::{KeyError, PublicKey};
use crate::program::codec::CodecError;

/// Everything that can go wrong between `add` and `deserialize`.
///
/// Invalid signatures are deliberately absent: verification answers with a
/// `bool`, because "this signature does not check out" is an expected
/// outcome rather than a malformed input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransactionError {
    /// Signing finished but these required signers still have empty slots.
    /// Slots that were filled stay filled; the transaction can still be
    /// serialized and handed to the missing signers.
    #[error("missing signatures for required signers: {}", display_keys(.missing))]
    MissingRequiredSigner { missing: Vec<PublicKey> },

    /// `partial_sign` was called with an empty signer list.
    #[error("no signers provided")]
    NoSignersProvided,

    /// A signer was offered whose identifier is not in the signer prefix.
    #[error("{0} is not a required signer of this transaction")]
    UnknownSigner(PublicKey),

    /// More distinct accounts than the one-byte header counts can hold.
    #[error("too many account keys: {0} (max 255)")]
    TooManyAccountKeys(usize),

    /// Transport bytes did not describe a valid transaction.
    #[error("malformed transport: {0}")]
    MalformedTransport(String),

    #[error(transparent)]
    Key(#[from] KeyError),

    #[error(transparent)]
    Codec(#[from] CodecError),
}

fn display_keys(keys: &[PublicKey]) -> String {
    keys.iter()
        .map(PublicKey::to_text)
        .collect::<Vec<_>>()
        .join(", ")
}
