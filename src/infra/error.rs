//! Error types for Agri Anchor

use thiserror::Error;

/// Errors that can occur while filing claims and anchoring proofs
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// Request or record failed validation
    #[error("validation error: {0}")]
    Validation(String),

    /// Required field missing from a request body
    #[error("missing required field: {0}")]
    MissingField(String),

    /// Claim not found
    #[error("claim not found: {0}")]
    ClaimNotFound(String),

    /// Claim exists but has no proof transaction
    #[error("proof not found for claim: {0}")]
    ProofNotFound(String),

    /// Claim id already present in the store
    #[error("duplicate claim: {0}")]
    DuplicateClaim(String),

    /// Anchor service is disabled (missing or invalid chain configuration)
    #[error("anchor service unavailable: {0}")]
    AnchorUnavailable(String),

    /// Contract rejected the caller as not being its owner
    #[error("operating account is not the contract owner: {0}")]
    Unauthorized(String),

    /// Operating account cannot pay for gas
    #[error("insufficient funds for gas: {0}")]
    InsufficientFunds(String),

    /// Contract reverted for any other reason
    #[error("transaction reverted: {0}")]
    Reverted(String),

    /// RPC transport or node error
    #[error("chain rpc error: {0}")]
    Chain(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Internal error
    #[error("internal error: {0}")]
    Internal(String),
}

/// Result type for gateway operations
pub type Result<T> = std::result::Result<T, GatewayError>;
