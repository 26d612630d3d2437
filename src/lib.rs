//! Agri Anchor Library
//!
//! Claim filing backend that commits claim records to an EVM proof-storage
//! contract and keeps the resulting transaction ids next to the claims.
//!
//! ## Modules
//!
//! - [`crypto`] - Canonical JSON commitments (JCS + SHA-256)
//! - [`domain`] - Claim records, proof receipts, chain primitives
//! - [`anchor`] - Chain client adapter and proof submission workflow
//! - [`infra`] - Error taxonomy, storage seams, in-memory claim store
//! - [`metrics`] - In-process counters and latency histograms
//! - [`telemetry`] - Structured logging setup
//! - [`api`] - REST API routes
//! - [`server`] - HTTP server bootstrap

pub mod anchor;
pub mod api;
pub mod crypto;
pub mod domain;
pub mod infra;
pub mod metrics;
pub mod server;
pub mod telemetry;

// Re-export commonly used types
pub use anchor::{AnchorConfig, AnchorService, AnchorStatus, GasEstimate};
pub use crypto::{commit, ProofCommitment};
pub use domain::{ClaimRecord, ClaimStatus, Hash256, ProofOutcome, ProofReceipt, TxHash};
pub use infra::{ClaimStore, GatewayError, InMemoryClaimStore, ProofLedger, Result};
