//! API middleware

use axum::{
    body::Body,
    extract::State,
    http::{HeaderValue, Request},
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use tower_http::request_id::{MakeRequestId, RequestId};
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::Claims;
use crate::error::ApiError;
use crate::AppState;

/// Authentication middleware
///
/// Validates the bearer token and stores its claims in the request extensions
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let token = request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|header| header.strip_prefix("Bearer "))
        .ok_or_else(|| {
            warn!("Missing or invalid Authorization header");
            ApiError::Unauthorized("Please log in".to_string())
        })?;

    let claims = crate::auth::validate_token(token, &state.config.jwt_secret)
        .inspect_err(|e| warn!(error = %e, "Token validation failed"))?;
    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}

/// Administrator gate, layered inside `auth_middleware`
pub async fn require_admin(request: Request<Body>, next: Next) -> Result<Response, ApiError> {
    match request.extensions().get::<Claims>() {
        Some(claims) if claims.is_admin() => Ok(next.run(request).await),
        Some(claims) => {
            warn!(user = %claims.sub, uri = %request.uri(), "Administrator route refused");
            Err(ApiError::Forbidden(
                "Administrator access required".to_string(),
            ))
        }
        None => Err(ApiError::Unauthorized("Please log in".to_string())),
    }
}

/// Audit logging middleware
///
/// One line per API request with the acting user
pub async fn audit_middleware(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|h| h.to_str().ok())
        .unwrap_or("-")
        .to_string();
    let user_id = request
        .extensions()
        .get::<Claims>()
        .map(|c| c.sub.clone())
        .unwrap_or_else(|| "anonymous".to_string());

    let start = Utc::now();

    let response = next.run(request).await;

    let duration = Utc::now() - start;
    let status = response.status();

    info!(
        method = %method,
        uri = %uri,
        user = %user_id,
        request_id = %request_id,
        status = %status.as_u16(),
        duration_ms = duration.num_milliseconds(),
        "API request"
    );

    response
}

/// Generates `x-request-id` values as UUID v4
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestUuid;

impl MakeRequestId for RequestUuid {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}
