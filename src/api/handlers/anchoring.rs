//! Anchor service status handler.

use axum::extract::State;
use axum::Json;

use crate::anchor::AnchorStatus;
use crate::server::AppState;

/// GET /api/anchor/status - Current adapter state.
pub async fn get_anchor_status(State(state): State<AppState>) -> Json<AnchorStatus> {
    Json(state.anchor.status())
}
