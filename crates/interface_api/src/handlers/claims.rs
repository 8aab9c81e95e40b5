//! Claimant handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use validator::Validate;

use domain_claims::ClaimantView;

use crate::auth::Claims;
use crate::dto::claims::{ClaimResponse, FileClaimRequest};
use crate::handlers::parse_claim_id;
use crate::{error::ApiError, AppState};

/// Files a new claim for the logged-in user
pub async fn file_claim(
    State(state): State<AppState>,
    Extension(user): Extension<Claims>,
    Json(request): Json<FileClaimRequest>,
) -> Result<(StatusCode, Json<ClaimResponse>), ApiError> {
    request.validate()?;
    let (submission, attestations) = request.into_parts();
    let claim = state
        .engine
        .file_claim(&user.owner_id(), submission, attestations)
        .await?;
    Ok((StatusCode::CREATED, Json(claim.into())))
}

/// The user's own claims, newest first
pub async fn list_mine(
    State(state): State<AppState>,
    Extension(user): Extension<Claims>,
) -> Result<Json<Vec<ClaimantView>>, ApiError> {
    Ok(Json(state.engine.list_mine(&user.owner_id()).await?))
}

/// Confirms the reimbursement arrived
pub async fn mark_received(
    State(state): State<AppState>,
    Extension(user): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<Json<ClaimResponse>, ApiError> {
    let id = parse_claim_id(&id)?;
    let claim = state.engine.mark_received(&user.owner_id(), id).await?;
    Ok(Json(claim.into()))
}

/// Withdraws a claim
pub async fn delete_mine(
    State(state): State<AppState>,
    Extension(user): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_claim_id(&id)?;
    state.engine.delete_mine(&user.owner_id(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}
