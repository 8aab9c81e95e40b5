//! HTTP API Layer
//!
//! The REST API for filing and processing reimbursement claims, built on Axum.
//!
//! # Architecture
//!
//! - **Handlers**: claimant, administrator, login and health endpoints
//! - **Middleware**: authentication, administrator gate, request ids, audit logging
//! - **DTOs**: request/response bodies
//! - **Identity**: credential roster behind the `IdentityResolver` trait
//! - **Error Handling**: consistent JSON error responses
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_api::create_router;
//!
//! let app = create_router(engine, config, Arc::new(directory));
//! axum::serve(listener, app).await?;
//! ```

pub mod config;
pub mod error;
pub mod middleware;
pub mod handlers;
pub mod dto;
pub mod auth;
pub mod identity;

use std::sync::Arc;

use axum::{
    Router,
    routing::{delete, get, post},
    middleware as axum_middleware,
};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use domain_claims::LifecycleEngine;

use crate::config::ApiConfig;
use crate::handlers::{admin, claims, health};
use crate::identity::IdentityResolver;
use crate::middleware::{audit_middleware, auth_middleware, require_admin, RequestUuid};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub engine: LifecycleEngine,
    pub config: ApiConfig,
    pub identities: Arc<dyn IdentityResolver>,
}

/// Creates the main API router
pub fn create_router(
    engine: LifecycleEngine,
    config: ApiConfig,
    identities: Arc<dyn IdentityResolver>,
) -> Router {
    let state = AppState {
        engine,
        config,
        identities,
    };

    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check))
        .route("/auth/login", post(handlers::auth::login));

    // Claimant routes
    let claims_routes = Router::new()
        .route("/", post(claims::file_claim))
        .route("/mine", get(claims::list_mine))
        .route("/:id", delete(claims::delete_mine))
        .route("/:id/received", post(claims::mark_received));

    // Administrator routes
    let admin_routes = Router::new()
        .route("/claims", get(admin::list_pending))
        .route(
            "/claims/:id/review",
            post(admin::begin_review).delete(admin::undo_review),
        )
        .route("/claims/:id/return", post(admin::return_claim))
        .layer(axum_middleware::from_fn(require_admin));

    // Protected API routes
    let api_routes = Router::new()
        .nest("/claims", claims_routes)
        .nest("/admin", admin_routes)
        .layer(axum_middleware::from_fn(audit_middleware))
        .layer(axum_middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(public_routes)
        .nest("/api/v1", api_routes)
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(RequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id()),
        )
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
