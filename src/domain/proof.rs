//! Results of anchoring a commitment on chain

use serde::{Deserialize, Serialize};

use super::{tx_hash_hex, Hash256, TxHash};

/// What happened when a digest was offered to the proof-storage contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProofOutcome {
    /// A `storeProof` transaction was signed and broadcast.
    Submitted { tx_hash: TxHash },
    /// `verifyProof` already reported the digest; nothing was sent.
    AlreadyAnchored,
}

/// Digest plus outcome, returned by the proof submission workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProofReceipt {
    pub digest: Hash256,
    pub outcome: ProofOutcome,
}

impl ProofReceipt {
    pub fn submitted(digest: Hash256, tx_hash: TxHash) -> Self {
        Self {
            digest,
            outcome: ProofOutcome::Submitted { tx_hash },
        }
    }

    pub fn already_anchored(digest: Hash256) -> Self {
        Self {
            digest,
            outcome: ProofOutcome::AlreadyAnchored,
        }
    }

    pub fn tx_hash(&self) -> Option<TxHash> {
        match self.outcome {
            ProofOutcome::Submitted { tx_hash } => Some(tx_hash),
            ProofOutcome::AlreadyAnchored => None,
        }
    }

    pub fn is_already_anchored(&self) -> bool {
        matches!(self.outcome, ProofOutcome::AlreadyAnchored)
    }

    pub fn digest_hex(&self) -> String {
        hex::encode(self.digest)
    }

    pub fn tx_hash_hex(&self) -> Option<String> {
        self.tx_hash().as_ref().map(tx_hash_hex)
    }
}

/// Proof details returned for a filed claim.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimProof {
    pub proof_tx_hash: String,
    pub proof_hash: Option<String>,
    /// Block timestamp of the proof; not tracked (no confirmation polling).
    pub stored_at: Option<String>,
}
