//! Trait definitions for Agri Anchor core services

use alloy::primitives::Address;
use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use crate::domain::{ClaimRecord, Hash256, TxHash};

use super::Result;

/// Gas and ordering parameters of a `storeProof` transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TxParams {
    pub chain_id: u64,
    pub nonce: u64,
    pub gas_limit: u64,
    pub gas_price: u128,
}

/// Remote ledger holding the proof-storage contract.
///
/// Every method is a single JSON-RPC round trip. Implementations translate
/// node and contract errors into [`GatewayError`](super::GatewayError)
/// categories; they never retry.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ProofLedger: Send + Sync {
    /// Operating account that signs transactions
    fn account(&self) -> Address;

    /// Deployed contract address
    fn contract(&self) -> Address;

    /// `eth_chainId` of the connected node
    async fn chain_id(&self) -> Result<u64>;

    /// `owner()` of the contract
    async fn owner(&self) -> Result<Address>;

    /// `verifyProof(bytes32)` read-only call
    async fn verify_proof(&self, digest: &Hash256) -> Result<bool>;

    /// `eth_estimateGas` for `storeProof(digest, metadata)` from the operating account
    async fn estimate_store_gas(&self, digest: &Hash256, metadata: &[u8]) -> Result<u64>;

    /// `eth_getTransactionCount(account, pending)`
    async fn transaction_count(&self) -> Result<u64>;

    /// `eth_gasPrice`
    async fn gas_price(&self) -> Result<u128>;

    /// Build, sign and broadcast `storeProof(digest, metadata)`.
    async fn send_store_proof(
        &self,
        digest: &Hash256,
        metadata: &[u8],
        params: TxParams,
    ) -> Result<TxHash>;
}

/// Claim storage.
///
/// Invariant: records are immutable once appended.
#[async_trait]
pub trait ClaimStore: Send + Sync {
    /// Append a claim to its user's sequence
    async fn append(&self, claim: ClaimRecord) -> Result<()>;

    /// Claims of one user in filing order; empty for unknown users
    async fn list_by_user(&self, user_id: &str) -> Result<Vec<ClaimRecord>>;

    /// Claim by id, or `ClaimNotFound`
    async fn find_by_id(&self, claim_id: &str) -> Result<ClaimRecord>;

    /// Claim that first anchored the given digest (hex)
    async fn find_by_proof_hash(&self, proof_hash: &str) -> Result<Option<ClaimRecord>>;

    /// Total number of stored claims
    async fn count(&self) -> Result<usize>;
}
