//! Login handler

use axum::{extract::State, Json};
use tracing::{info, warn};
use validator::Validate;

use crate::auth::create_token;
use crate::dto::auth::{LoginRequest, LoginResponse};
use crate::{error::ApiError, AppState};

/// Exchanges a staff credential for a session token
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    request.validate()?;
    let identity = state
        .identities
        .resolve(&request.credential)
        .await
        .ok_or_else(|| {
            warn!("Login with unknown credential");
            ApiError::Unauthorized("Unknown credential".to_string())
        })?;

    let token = create_token(
        &identity,
        &state.config.jwt_secret,
        state.config.jwt_expiration_secs,
    )?;
    info!(user = %identity.name, role = identity.role.as_str(), "User logged in");

    Ok(Json(LoginResponse {
        token,
        name: identity.name,
        role: identity.role,
        expires_in: state.config.jwt_expiration_secs,
    }))
}
