//! Administrator handlers

use axum::{
    extract::{Path, State},
    Json,
};

use crate::dto::claims::{ClaimResponse, PendingClaimResponse};
use crate::handlers::parse_claim_id;
use crate::{error::ApiError, AppState};

/// Everything not yet done, oldest first
pub async fn list_pending(
    State(state): State<AppState>,
) -> Result<Json<Vec<PendingClaimResponse>>, ApiError> {
    let pending = state.engine.list_pending().await?;
    Ok(Json(pending.into_iter().map(Into::into).collect()))
}

pub async fn begin_review(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ClaimResponse>, ApiError> {
    let claim = state.engine.begin_review(parse_claim_id(&id)?).await?;
    Ok(Json(claim.into()))
}

/// Takes back a review while the undo window is open
pub async fn undo_review(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ClaimResponse>, ApiError> {
    let claim = state.engine.undo_review(parse_claim_id(&id)?).await?;
    Ok(Json(claim.into()))
}

/// Returns a claim whose physical receipt never arrived
pub async fn return_claim(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ClaimResponse>, ApiError> {
    let claim = state.engine.return_claim(parse_claim_id(&id)?).await?;
    Ok(Json(claim.into()))
}
