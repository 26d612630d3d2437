//! Common test utilities and fixtures for integration tests

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use alloy::primitives::Address;
use async_trait::async_trait;
use serde_json::json;
use sha2::{Digest, Sha256};

use agri_anchor::anchor::{AnchorService, AnchorSettings};
use agri_anchor::infra::{GatewayError, ProofLedger, Result, TxParams};
use agri_anchor::{Hash256, TxHash};

/// Operating account of the fake ledger
pub fn test_account() -> Address {
    Address::repeat_byte(0xa1)
}

/// Contract address of the fake ledger
pub fn test_contract() -> Address {
    Address::repeat_byte(0xc0)
}

/// A transaction accepted by the fake ledger
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentTx {
    pub digest: Hash256,
    pub metadata: Vec<u8>,
    pub params: TxParams,
    pub tx_hash: TxHash,
}

#[derive(Default)]
struct LedgerState {
    proofs: HashSet<Hash256>,
    sent: Vec<SentTx>,
}

/// In-memory stand-in for the proof-storage contract.
///
/// `storeProof` takes effect as soon as it is broadcast, and the pending
/// transaction count is the number of accepted transactions.
pub struct FakeLedger {
    state: Mutex<LedgerState>,
    owner: Address,
    estimate_fails: bool,
    send_error: Option<GatewayError>,
}

impl FakeLedger {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(LedgerState::default()),
            owner: test_account(),
            estimate_fails: false,
            send_error: None,
        }
    }

    pub fn with_owner(mut self, owner: Address) -> Self {
        self.owner = owner;
        self
    }

    pub fn failing_estimates(mut self) -> Self {
        self.estimate_fails = true;
        self
    }

    pub fn failing_sends(mut self, error: GatewayError) -> Self {
        self.send_error = Some(error);
        self
    }

    pub fn sent(&self) -> Vec<SentTx> {
        self.state.lock().unwrap().sent.clone()
    }

    pub fn preload(&self, digest: Hash256) {
        self.state.lock().unwrap().proofs.insert(digest);
    }
}

fn fake_tx_hash(digest: &Hash256, nonce: u64) -> TxHash {
    let mut hasher = Sha256::new();
    hasher.update(digest);
    hasher.update(nonce.to_be_bytes());
    hasher.finalize().into()
}

#[async_trait]
impl ProofLedger for FakeLedger {
    fn account(&self) -> Address {
        test_account()
    }

    fn contract(&self) -> Address {
        test_contract()
    }

    async fn chain_id(&self) -> Result<u64> {
        Ok(80002)
    }

    async fn owner(&self) -> Result<Address> {
        Ok(self.owner)
    }

    async fn verify_proof(&self, digest: &Hash256) -> Result<bool> {
        Ok(self.state.lock().unwrap().proofs.contains(digest))
    }

    async fn estimate_store_gas(&self, _digest: &Hash256, metadata: &[u8]) -> Result<u64> {
        if self.estimate_fails {
            return Err(GatewayError::Reverted("execution reverted".to_string()));
        }
        Ok(45_000 + 16 * metadata.len() as u64)
    }

    async fn transaction_count(&self) -> Result<u64> {
        Ok(self.state.lock().unwrap().sent.len() as u64)
    }

    async fn gas_price(&self) -> Result<u128> {
        Ok(30_000_000_000)
    }

    async fn send_store_proof(
        &self,
        digest: &Hash256,
        metadata: &[u8],
        params: TxParams,
    ) -> Result<TxHash> {
        tokio::task::yield_now().await;

        if let Some(error) = &self.send_error {
            return Err(error.clone());
        }
        if self.owner != test_account() {
            return Err(agri_anchor::anchor::classify_chain_error(
                "execution reverted: Not owner",
            ));
        }

        let tx_hash = fake_tx_hash(digest, params.nonce);
        let mut state = self.state.lock().unwrap();
        state.proofs.insert(*digest);
        state.sent.push(SentTx {
            digest: *digest,
            metadata: metadata.to_vec(),
            params,
            tx_hash,
        });
        Ok(tx_hash)
    }
}

/// Anchor service bound to `ledger` with default settings.
pub async fn anchor_service(ledger: Arc<FakeLedger>) -> AnchorService {
    AnchorService::with_ledger(ledger, AnchorSettings::default()).await
}

/// Sensor reading used across scenarios
pub fn sensor_reading() -> serde_json::Value {
    json!({"sensorId": "A1", "temp": 25.5})
}

/// A complete claim filing body
pub fn claim_body(user_id: &str) -> serde_json::Value {
    json!({
        "userId": user_id,
        "crop": "wheat",
        "event": "drought",
        "amount": 12500,
        "description": "No rain for six weeks during tillering"
    })
}
