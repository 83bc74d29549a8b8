//! Submission channel seam.
//!
//! The crate does not talk to the network. Callers hand a signed transaction
//! to whatever implements [`SubmissionChannel`] (an RPC client, a queue, a
//! test double) and get a receipt back.

use tracing::{info, warn};

use super::builder::Transaction;
use super::error::TransactionError;

/// Outcome reported by a channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionStatus {
    Success,
    Failed(String),
}

/// What the channel said about one submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionReceipt {
    pub status: SubmissionStatus,
    /// Channel-assigned transaction reference, opaque to this crate.
    pub reference: String,
}

impl SubmissionReceipt {
    pub fn success(reference: impl Into<String>) -> Self {
        Self {
            status: SubmissionStatus::Success,
            reference: reference.into(),
        }
    }

    pub fn failed(reference: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            status: SubmissionStatus::Failed(reason.into()),
            reference: reference.into(),
        }
    }

    pub fn is_confirmed(&self) -> bool {
        self.status == SubmissionStatus::Success
    }
}

/// Anything that accepts serialized transactions.
pub trait SubmissionChannel {
    fn submit(&self, payload: &[u8]) -> SubmissionReceipt;
}

/// Serializes `tx` and passes it to `channel`.
///
/// Incomplete transactions are submitted as they are; rejecting them is the
/// receiving side's call. Only serialization failures are errors here.
pub fn submit_transaction<C>(
    channel: &C,
    tx: &Transaction,
) -> Result<SubmissionReceipt, TransactionError>
where
    C: SubmissionChannel + ?Sized,
{
    if !tx.is_complete() {
        warn!(
            missing = tx.missing_signers().len(),
            "submitting a transaction with empty signature slots"
        );
    }

    let payload = tx.serialize()?;
    info!(bytes = payload.len(), "submitting transaction");

    let receipt = channel.submit(&payload);
    match &receipt.status {
        SubmissionStatus::Success => {
            info!(reference = %receipt.reference, "transaction accepted")
        }
        SubmissionStatus::Failed(reason) => {
            warn!(reference = %receipt.reference, reason = %reason, "transaction rejected")
        }
    }
    Ok(receipt)
}
