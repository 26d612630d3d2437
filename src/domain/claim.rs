//! Claim records filed by farmers

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Progress indicator assigned to a freshly filed claim.
pub const INITIAL_PROGRESS: u8 = 10;

/// Status of a claim. Claims never move past `Submitted`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ClaimStatus {
    #[default]
    Submitted,
}

/// Generate a claim identifier: `CLM<YYYYMMDDHHMMSS>-<6 hex chars>`.
///
/// The timestamp prefix keeps ids roughly sortable; the random suffix keeps
/// two claims filed in the same second apart.
pub fn generate_claim_id(now: DateTime<Utc>) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("CLM{}-{}", now.format("%Y%m%d%H%M%S"), &suffix[..6])
}

/// Claim as submitted by the client, before anchoring.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewClaim {
    pub user_id: String,
    pub crop: String,
    pub event: String,
    /// Claimed amount, kept exactly as the client sent it.
    pub amount: serde_json::Value,
    pub description: String,
}

impl NewClaim {
    /// Record whose digest is anchored on chain for this claim.
    pub fn proof_record(&self, claim_id: &str, filed_at: DateTime<Utc>) -> serde_json::Value {
        serde_json::json!({
            "claimId": claim_id,
            "userId": self.user_id,
            "crop": self.crop,
            "event": self.event,
            "filedAt": filed_at.to_rfc3339(),
        })
    }

    /// Human-readable metadata stored next to the digest.
    pub fn proof_metadata(&self, claim_id: &str) -> String {
        format!(
            "ClaimID:{};UserID:{};Event:{}",
            claim_id, self.user_id, self.event
        )
    }
}

/// A filed claim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimRecord {
    pub id: String,
    pub user_id: String,
    pub crop: String,
    pub event: String,
    pub amount: serde_json::Value,
    pub description: String,
    /// Filing date, `YYYY-MM-DD`
    pub date: String,
    pub status: ClaimStatus,
    pub progress: u8,
    /// Proof transaction hash (`0x`-prefixed hex)
    pub proof_tx_hash: Option<String>,
    /// Anchored digest (hex)
    pub proof_hash: Option<String>,
    pub has_proof: bool,
}

impl ClaimRecord {
    /// Build a submitted claim with no proof attached yet.
    pub fn submitted(id: String, claim: NewClaim, filed_at: DateTime<Utc>) -> Self {
        Self {
            id,
            user_id: claim.user_id,
            crop: claim.crop,
            event: claim.event,
            amount: claim.amount,
            description: claim.description,
            date: filed_at.format("%Y-%m-%d").to_string(),
            status: ClaimStatus::Submitted,
            progress: INITIAL_PROGRESS,
            proof_tx_hash: None,
            proof_hash: None,
            has_proof: false,
        }
    }

    /// Attach the anchored digest and, when known, its transaction.
    pub fn with_proof(mut self, proof_hash: String, proof_tx_hash: Option<String>) -> Self {
        self.proof_hash = Some(proof_hash);
        self.proof_tx_hash = proof_tx_hash;
        self.has_proof = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_claim() -> NewClaim {
        NewClaim {
            user_id: "FARMER123".to_string(),
            crop: "wheat".to_string(),
            event: "hailstorm".to_string(),
            amount: serde_json::json!(15000),
            description: "Hail damaged the north field".to_string(),
        }
    }

    #[test]
    fn test_generate_claim_id_format() {
        let now = Utc.with_ymd_and_hms(2024, 3, 15, 9, 30, 5).unwrap();
        let id = generate_claim_id(now);

        assert!(id.starts_with("CLM20240315093005-"));
        let suffix = id.rsplit('-').next().unwrap();
        assert_eq!(suffix.len(), 6);
        assert!(suffix.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_generated_ids_differ_within_same_second() {
        let now = Utc::now();
        assert_ne!(generate_claim_id(now), generate_claim_id(now));
    }

    #[test]
    fn test_submitted_claim_defaults() {
        let now = Utc.with_ymd_and_hms(2024, 3, 15, 9, 30, 5).unwrap();
        let record = ClaimRecord::submitted("CLM1".to_string(), sample_claim(), now);

        assert_eq!(record.status, ClaimStatus::Submitted);
        assert_eq!(record.progress, INITIAL_PROGRESS);
        assert_eq!(record.date, "2024-03-15");
        assert!(!record.has_proof);
        assert!(record.proof_tx_hash.is_none());
    }

    #[test]
    fn test_claim_serializes_camel_case() {
        let now = Utc.with_ymd_and_hms(2024, 3, 15, 9, 30, 5).unwrap();
        let record = ClaimRecord::submitted("CLM1".to_string(), sample_claim(), now)
            .with_proof("ab".repeat(32), Some("0x01".to_string()));

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["userId"], "FARMER123");
        assert_eq!(json["status"], "submitted");
        assert_eq!(json["proofTxHash"], "0x01");
        assert_eq!(json["hasProof"], true);
        assert_eq!(json["amount"], 15000);
    }

    #[test]
    fn test_status_wire_names() {
        assert_eq!(
            serde_json::to_value(ClaimStatus::Submitted).unwrap(),
            "submitted"
        );
        assert_eq!(ClaimStatus::default(), ClaimStatus::Submitted);
    }

    #[test]
    fn test_proof_metadata_and_record() {
        let claim = sample_claim();
        let now = Utc.with_ymd_and_hms(2024, 3, 15, 9, 30, 5).unwrap();

        assert_eq!(
            claim.proof_metadata("CLM1"),
            "ClaimID:CLM1;UserID:FARMER123;Event:hailstorm"
        );

        let record = claim.proof_record("CLM1", now);
        assert_eq!(record["claimId"], "CLM1");
        assert_eq!(record["filedAt"], "2024-03-15T09:30:05+00:00");
        assert!(record.get("amount").is_none());
    }
}
