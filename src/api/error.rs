//! Structured API error responses with error codes
//!
//! Every failing endpoint answers with the same envelope: a stable
//! machine-readable code, a numeric code, and a human-readable message.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::infra::GatewayError;

// ============================================================================
// Error Codes
// ============================================================================

/// Error codes for API responses
///
/// These codes are stable and can be used by clients for programmatic error handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Validation errors (3xxx)
    /// Request body is malformed
    InvalidRequestBody,
    /// Required field is missing
    MissingRequiredField,
    /// Field value is invalid
    InvalidFieldValue,

    // Resource errors (4xxx)
    /// No claim with the given id
    ClaimNotFound,
    /// Claim has no proof transaction
    ProofNotFound,

    // Conflict errors (5xxx)
    /// Resource already exists
    AlreadyExists,

    // Infrastructure errors (8xxx)
    /// Node or transport failure talking to the chain
    ChainRpcError,
    /// Internal server error
    InternalError,

    // Anchoring errors (9xxx)
    /// Anchor service disabled
    AnchorUnavailable,
    /// Operating account is not the contract owner
    NotContractOwner,
    /// Operating account cannot pay for gas
    InsufficientFunds,
    /// Contract reverted the transaction
    TransactionReverted,
}

impl ErrorCode {
    /// Get the numeric code for this error
    pub fn numeric_code(&self) -> u32 {
        match self {
            // Validation (3xxx)
            ErrorCode::InvalidRequestBody => 3001,
            ErrorCode::MissingRequiredField => 3002,
            ErrorCode::InvalidFieldValue => 3003,

            // Resource (4xxx)
            ErrorCode::ClaimNotFound => 4001,
            ErrorCode::ProofNotFound => 4002,

            // Conflict (5xxx)
            ErrorCode::AlreadyExists => 5001,

            // Infrastructure (8xxx)
            ErrorCode::ChainRpcError => 8001,
            ErrorCode::InternalError => 8999,

            // Anchoring (9xxx)
            ErrorCode::AnchorUnavailable => 9001,
            ErrorCode::NotContractOwner => 9002,
            ErrorCode::InsufficientFunds => 9003,
            ErrorCode::TransactionReverted => 9004,
        }
    }

    /// Get the HTTP status code for this error
    pub fn http_status(&self) -> StatusCode {
        match self {
            // Validation -> 400
            ErrorCode::InvalidRequestBody => StatusCode::BAD_REQUEST,
            ErrorCode::MissingRequiredField => StatusCode::BAD_REQUEST,
            ErrorCode::InvalidFieldValue => StatusCode::BAD_REQUEST,

            // Resource -> 404
            ErrorCode::ClaimNotFound => StatusCode::NOT_FOUND,
            ErrorCode::ProofNotFound => StatusCode::NOT_FOUND,

            // Conflict -> 409
            ErrorCode::AlreadyExists => StatusCode::CONFLICT,

            // Infrastructure -> 502/500
            ErrorCode::ChainRpcError => StatusCode::BAD_GATEWAY,
            ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,

            // Anchoring -> various
            ErrorCode::AnchorUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            ErrorCode::NotContractOwner => StatusCode::FORBIDDEN,
            ErrorCode::InsufficientFunds => StatusCode::INTERNAL_SERVER_ERROR,
            ErrorCode::TransactionReverted => StatusCode::BAD_REQUEST,
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let code_str = match self {
            ErrorCode::InvalidRequestBody => "INVALID_REQUEST_BODY",
            ErrorCode::MissingRequiredField => "MISSING_REQUIRED_FIELD",
            ErrorCode::InvalidFieldValue => "INVALID_FIELD_VALUE",
            ErrorCode::ClaimNotFound => "CLAIM_NOT_FOUND",
            ErrorCode::ProofNotFound => "PROOF_NOT_FOUND",
            ErrorCode::AlreadyExists => "ALREADY_EXISTS",
            ErrorCode::ChainRpcError => "CHAIN_RPC_ERROR",
            ErrorCode::InternalError => "INTERNAL_ERROR",
            ErrorCode::AnchorUnavailable => "ANCHOR_UNAVAILABLE",
            ErrorCode::NotContractOwner => "NOT_CONTRACT_OWNER",
            ErrorCode::InsufficientFunds => "INSUFFICIENT_FUNDS",
            ErrorCode::TransactionReverted => "TRANSACTION_REVERTED",
        };
        write!(f, "{}", code_str)
    }
}

// ============================================================================
// Structured Error Response
// ============================================================================

/// Structured error response for API endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Always `false`; mirrors the `success` flag of successful bodies
    pub success: bool,
    /// Error details
    pub error: ErrorDetails,
}

/// Detailed error information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetails {
    /// Machine-readable error code
    pub code: ErrorCode,

    /// Numeric error code for easy categorization
    pub numeric_code: u32,

    /// Human-readable error message
    pub message: String,

    /// Additional error details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,

    /// Related resource ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_id: Option<String>,
}

impl ApiError {
    /// Create a new API error
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: ErrorDetails {
                code,
                numeric_code: code.numeric_code(),
                message: message.into(),
                details: None,
                resource_id: None,
            },
        }
    }

    /// Set additional details
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.error.details = Some(details);
        self
    }

    /// Set related resource ID
    pub fn with_resource_id(mut self, id: impl Into<String>) -> Self {
        self.error.resource_id = Some(id.into());
        self
    }

    /// Get the HTTP status code
    pub fn status(&self) -> StatusCode {
        self.error.code.http_status()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code_str = self.error.code.to_string();
        let mut response = (status, Json(self)).into_response();

        // Add error code header for easier debugging
        if let Ok(code_value) = axum::http::HeaderValue::from_str(&code_str) {
            response.headers_mut().insert(
                axum::http::header::HeaderName::from_static("x-error-code"),
                code_value,
            );
        }

        response
    }
}

// ============================================================================
// Conversion from GatewayError
// ============================================================================

impl From<GatewayError> for ApiError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::Validation(msg) => ApiError::new(ErrorCode::InvalidFieldValue, msg),
            GatewayError::MissingField(field) => missing_field(&field),
            GatewayError::ClaimNotFound(id) => {
                ApiError::new(ErrorCode::ClaimNotFound, format!("Claim not found: {}", id))
                    .with_resource_id(id)
            }
            GatewayError::ProofNotFound(id) => ApiError::new(
                ErrorCode::ProofNotFound,
                format!("No proof transaction recorded for claim: {}", id),
            )
            .with_resource_id(id),
            GatewayError::DuplicateClaim(id) => {
                ApiError::new(ErrorCode::AlreadyExists, format!("Claim already exists: {}", id))
                    .with_resource_id(id)
            }
            GatewayError::AnchorUnavailable(reason) => ApiError::new(
                ErrorCode::AnchorUnavailable,
                "Blockchain service unavailable. Check server configuration.",
            )
            .with_details(serde_json::json!({ "reason": reason })),
            GatewayError::Unauthorized(reason) => ApiError::new(
                ErrorCode::NotContractOwner,
                "Backend wallet is not the contract owner",
            )
            .with_details(serde_json::json!({ "reason": reason })),
            GatewayError::InsufficientFunds(reason) => ApiError::new(
                ErrorCode::InsufficientFunds,
                "Backend wallet has insufficient funds for gas",
            )
            .with_details(serde_json::json!({ "reason": reason })),
            GatewayError::Reverted(reason) => ApiError::new(
                ErrorCode::TransactionReverted,
                "Transaction reverted by the contract",
            )
            .with_details(serde_json::json!({ "reason": reason })),
            GatewayError::Chain(msg) => {
                ApiError::new(ErrorCode::ChainRpcError, format!("Chain RPC error: {}", msg))
            }
            GatewayError::Configuration(msg) => ApiError::new(
                ErrorCode::InternalError,
                format!("Configuration error: {}", msg),
            ),
            GatewayError::Internal(msg) => ApiError::new(ErrorCode::InternalError, msg),
        }
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Create a missing-field error
pub fn missing_field(field: &str) -> ApiError {
    ApiError::new(
        ErrorCode::MissingRequiredField,
        format!("Missing required field: {}", field),
    )
    .with_details(serde_json::json!({
        "field": field
    }))
}

/// Create a malformed-body error
pub fn invalid_body(message: impl Into<String>) -> ApiError {
    ApiError::new(ErrorCode::InvalidRequestBody, message.into())
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        invalid_body(rejection.body_text())
    }
}

// ============================================================================
// Tests
// ============================================================================
