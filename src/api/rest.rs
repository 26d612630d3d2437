//! REST API routes for Agri Anchor.

use axum::routing::{get, post};
use axum::Router;

use crate::api::handlers::{
    file_claim, get_anchor_status, get_claim_proof, list_claims, store_proof,
};
use crate::server::AppState;

/// Build the `/api` router.
pub fn router() -> Router<AppState> {
    Router::new()
        // Claims
        .route("/claims", post(file_claim))
        .route("/claims/:id", get(list_claims))
        .route("/claims/:id/proof", get(get_claim_proof))
        // Raw anchoring
        .route("/store-proof", post(store_proof))
        .route("/anchor/status", get(get_anchor_status))
}
