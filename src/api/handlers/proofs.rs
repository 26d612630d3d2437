//! Raw proof anchoring handler.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::Value;

use crate::api::error::ApiError;
use crate::api::types::{parse_store_proof, ProofExistsResponse, ProofSubmittedResponse};
use crate::domain::ProofOutcome;
use crate::infra::GatewayError;
use crate::server::AppState;

/// POST /api/store-proof - Anchor an arbitrary JSON record.
///
/// `202 Accepted` once the transaction is broadcast; `200 OK` when the
/// digest is already on chain. A disabled adapter answers 503 before the
/// body is looked at.
pub async fn store_proof(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Response, ApiError> {
    if !state.anchor.is_enabled() {
        let reason = state.anchor.status().reason.unwrap_or_default();
        return Err(GatewayError::AnchorUnavailable(reason).into());
    }

    let Json(body) = body?;
    let request = parse_store_proof(&body)?;
    let receipt = state
        .anchor
        .anchor_record(&request.data, &request.metadata)
        .await?;

    let response = match receipt.outcome {
        ProofOutcome::AlreadyAnchored => (
            StatusCode::OK,
            Json(ProofExistsResponse {
                message: "Proof already exists",
                hash: receipt.digest_hex(),
            }),
        )
            .into_response(),
        ProofOutcome::Submitted { tx_hash } => (
            StatusCode::ACCEPTED,
            Json(ProofSubmittedResponse {
                message: "Proof transaction submitted",
                tx_hash: crate::domain::tx_hash_hex(&tx_hash),
                data_hash: receipt.digest_hex(),
            }),
        )
            .into_response(),
    };

    Ok(response)
}
