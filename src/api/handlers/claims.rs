//! Claim filing and lookup handlers.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde_json::Value;
use tracing::{info, warn};

use crate::api::error::ApiError;
use crate::api::types::{
    parse_new_claim, ClaimList, ClaimListResponse, ClaimProofResponse, FileClaimResponse,
};
use crate::domain::{generate_claim_id, ClaimProof, ClaimRecord};
use crate::infra::GatewayError;
use crate::metrics::metric_names;
use crate::server::AppState;

/// POST /api/claims - File a claim and anchor its proof record.
///
/// Nothing is stored unless anchoring succeeds (or the digest is already on
/// chain).
pub async fn file_claim(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<FileClaimResponse>), ApiError> {
    let result = match body {
        Ok(Json(body)) => file_claim_inner(&state, &body)
            .await
            .map_err(ApiError::from),
        Err(rejection) => Err(ApiError::from(rejection)),
    };

    if let Err(e) = &result {
        warn!(code = %e.error.code, error = %e.error.message, "Claim filing rejected");
        state
            .metrics
            .inc_counter(metric_names::CLAIMS_REJECTED)
            .await;
    }

    let claim = result?;
    Ok((
        StatusCode::CREATED,
        Json(FileClaimResponse {
            success: true,
            data: claim,
            message: "Claim filed successfully",
        }),
    ))
}

async fn file_claim_inner(state: &AppState, body: &Value) -> crate::infra::Result<ClaimRecord> {
    let new_claim = parse_new_claim(body)?;

    let filed_at = Utc::now();
    let claim_id = generate_claim_id(filed_at);
    let record = new_claim.proof_record(&claim_id, filed_at);
    let metadata = new_claim.proof_metadata(&claim_id);

    let receipt = state.anchor.anchor_record(&record, &metadata).await?;
    let proof_hash = receipt.digest_hex();

    // An already-anchored digest reuses the transaction of the claim that
    // first anchored it, when we know it.
    let proof_tx_hash = match receipt.tx_hash_hex() {
        Some(tx_hash) => Some(tx_hash),
        None => state
            .claims
            .find_by_proof_hash(&proof_hash)
            .await?
            .and_then(|existing| existing.proof_tx_hash),
    };

    let claim = ClaimRecord::submitted(claim_id, new_claim, filed_at)
        .with_proof(proof_hash, proof_tx_hash);
    state.claims.append(claim.clone()).await?;

    state.metrics.inc_counter(metric_names::CLAIMS_FILED).await;
    info!(
        claim_id = %claim.id,
        user_id = %claim.user_id,
        proof_tx_hash = claim.proof_tx_hash.as_deref().unwrap_or("-"),
        "Claim filed"
    );

    Ok(claim)
}

/// GET /api/claims/:id - List all claims filed by a user.
pub async fn list_claims(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<ClaimListResponse>, ApiError> {
    let claims = state.claims.list_by_user(&user_id).await?;

    Ok(Json(ClaimListResponse {
        success: true,
        data: ClaimList { claims },
    }))
}

/// GET /api/claims/:id/proof - Proof transaction of a single claim.
pub async fn get_claim_proof(
    State(state): State<AppState>,
    Path(claim_id): Path<String>,
) -> Result<Json<ClaimProofResponse>, ApiError> {
    let claim = state.claims.find_by_id(&claim_id).await?;

    let proof_tx_hash = claim
        .proof_tx_hash
        .ok_or_else(|| GatewayError::ProofNotFound(claim_id.clone()))?;

    Ok(Json(ClaimProofResponse {
        success: true,
        data: ClaimProof {
            proof_tx_hash,
            proof_hash: claim.proof_hash,
            stored_at: None,
        },
    }))
}
