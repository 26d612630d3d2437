//! Proof submission workflow
//!
//! commit -> check existence -> estimate gas -> submit. One attempt per
//! call; nothing is retried.

use std::time::Instant;

use serde_json::Value;
use tracing::{error, info, instrument};

use crate::crypto::commit;
use crate::domain::ProofReceipt;
use crate::infra::Result;
use crate::metrics::metric_names;

use super::AnchorService;

impl AnchorService {
    /// Anchor a record on chain.
    ///
    /// A digest the contract already holds yields
    /// [`ProofOutcome::AlreadyAnchored`](crate::domain::ProofOutcome) and no
    /// transaction is sent.
    #[instrument(skip(self, record, metadata))]
    pub async fn anchor_record(&self, record: &Value, metadata: &str) -> Result<ProofReceipt> {
        // Refuse before doing any work when the adapter is disabled.
        let ledger = self.ledger()?;
        let account = ledger.account();

        let commitment = commit(record)?;
        let digest = *commitment.digest();
        let digest_hex = commitment.digest_hex();
        let started = Instant::now();

        let result = async {
            if self.exists(&digest).await? {
                info!(digest = %digest_hex, "Proof already exists on chain");
                return Ok(ProofReceipt::already_anchored(digest));
            }

            let tx_hash = self.submit(&digest, metadata.as_bytes()).await?;
            Ok(ProofReceipt::submitted(digest, tx_hash))
        }
        .await;

        if let Some(metrics) = &self.metrics {
            metrics
                .observe_seconds(
                    metric_names::ANCHOR_LATENCY,
                    started.elapsed().as_secs_f64(),
                )
                .await;
        }

        match &result {
            Ok(receipt) if receipt.is_already_anchored() => {
                self.count(metric_names::PROOFS_ALREADY_ANCHORED).await
            }
            Ok(_) => self.count(metric_names::PROOFS_SUBMITTED).await,
            Err(e) => {
                error!(
                    digest = %digest_hex,
                    account = %account,
                    error = %e,
                    "Proof anchoring failed"
                );
                self.count(metric_names::PROOFS_FAILED).await;
            }
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use alloy::primitives::Address;
    use serde_json::json;

    use super::super::AnchorSettings;
    use super::*;
    use crate::domain::ProofOutcome;
    use crate::infra::{GatewayError, MockProofLedger};
    use crate::metrics::MetricsRegistry;

    fn enabled_ledger() -> MockProofLedger {
        let account = Address::repeat_byte(1);
        let mut ledger = MockProofLedger::new();
        ledger.expect_account().return_const(account);
        ledger.expect_contract().return_const(Address::repeat_byte(0xcc));
        ledger.expect_chain_id().returning(|| Ok(80002));
        ledger.expect_owner().returning(move || Ok(account));
        ledger
    }

    #[tokio::test]
    async fn test_existing_digest_short_circuits() {
        let mut ledger = enabled_ledger();
        ledger.expect_verify_proof().times(1).returning(|_| Ok(true));
        ledger.expect_send_store_proof().never();

        let metrics = Arc::new(MetricsRegistry::new());
        let service = AnchorService::with_ledger(Arc::new(ledger), AnchorSettings::default())
            .await
            .with_metrics(metrics.clone());

        let record = json!({"sensorId": "A1", "temp": 25.5});
        let receipt = service
            .anchor_record(&record, "farmerId:FARMER123")
            .await
            .unwrap();

        assert_eq!(receipt.outcome, ProofOutcome::AlreadyAnchored);
        assert_eq!(receipt.digest, *commit(&record).unwrap().digest());
        assert_eq!(
            metrics
                .get_counter(metric_names::PROOFS_ALREADY_ANCHORED)
                .await,
            1
        );
    }

    #[tokio::test]
    async fn test_new_digest_is_submitted_with_metadata() {
        let record = json!({"sensorId": "A1", "temp": 25.5});
        let expected = *commit(&record).unwrap().digest();

        let mut ledger = enabled_ledger();
        ledger
            .expect_verify_proof()
            .withf(move |digest| *digest == expected)
            .returning(|_| Ok(false));
        ledger.expect_estimate_store_gas().returning(|_, _| Ok(40_000));
        ledger.expect_transaction_count().returning(|| Ok(0));
        ledger.expect_gas_price().returning(|| Ok(25_000_000_000));
        ledger
            .expect_send_store_proof()
            .withf(move |digest, metadata, _| {
                *digest == expected && metadata == b"farmerId:FARMER123"
            })
            .times(1)
            .returning(|_, _, _| Ok([0x42; 32]));

        let service = AnchorService::with_ledger(Arc::new(ledger), AnchorSettings::default()).await;
        let receipt = service
            .anchor_record(&record, "farmerId:FARMER123")
            .await
            .unwrap();

        assert_eq!(receipt.tx_hash(), Some([0x42; 32]));
        assert_eq!(receipt.digest, expected);
    }

    #[tokio::test]
    async fn test_failure_is_counted_and_propagated() {
        let mut ledger = enabled_ledger();
        ledger.expect_verify_proof().returning(|_| Ok(false));
        ledger.expect_estimate_store_gas().returning(|_, _| Ok(40_000));
        ledger.expect_transaction_count().returning(|| Ok(0));
        ledger.expect_gas_price().returning(|| Ok(1));
        ledger.expect_send_store_proof().returning(|_, _, _| {
            Err(GatewayError::Unauthorized(
                "execution reverted: Not owner".to_string(),
            ))
        });

        let metrics = Arc::new(MetricsRegistry::new());
        let service = AnchorService::with_ledger(Arc::new(ledger), AnchorSettings::default())
            .await
            .with_metrics(metrics.clone());

        let result = service.anchor_record(&json!({"a": 1}), "m").await;
        assert!(matches!(result, Err(GatewayError::Unauthorized(_))));
        assert_eq!(metrics.get_counter(metric_names::PROOFS_FAILED).await, 1);
    }

    #[tokio::test]
    async fn test_disabled_service_rejects_before_hashing() {
        let service = AnchorService::disabled("no key");
        let result = service.anchor_record(&json!({"a": 1}), "m").await;
        assert!(matches!(result, Err(GatewayError::AnchorUnavailable(_))));
    }
}
