//! API handlers for FireStock REST endpoints

pub mod equipment;
pub mod health;
pub mod openapi;
pub mod scan;
pub mod stats;
pub mod transactions;
pub mod users;

use axum::{
    async_trait,
    extract::{DefaultBodyLimit, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use crate::{error::AppError, models::user::UserClaims, AppState};

/// Extractor for authenticated user from JWT token
pub struct AuthenticatedUser(pub UserClaims);

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        // Get the Authorization header
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::Authentication("Missing authorization header".to_string()))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::Authentication("Invalid authorization header format".to_string()))?;

        // Tokens come from the identity provider, signed with the shared project secret
        let auth = &state.config.auth;
        let claims = UserClaims::from_token(token, &auth.jwt_secret, auth.audience.as_deref())
            .map_err(|e| AppError::Authentication(e.to_string()))?;

        Ok(AuthenticatedUser(claims))
    }
}

/// Create the application router with all routes
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // API v1 routes
    let api_v1 = Router::new()
        // Health check
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        // Session and directory
        .route("/auth/me", get(users::me))
        .route("/users", get(users::list_users))
        .route("/sync", post(users::sync))
        // Equipment registry
        .route(
            "/equipment",
            get(equipment::list_equipment).post(equipment::create_equipment),
        )
        .route("/equipment/barcode/:code", get(equipment::find_by_barcode))
        .route(
            "/equipment/:id",
            get(equipment::get_equipment)
                .put(equipment::update_equipment)
                .delete(equipment::delete_equipment),
        )
        .route("/equipment/:id/history", get(equipment::equipment_history))
        .route("/equipment/:id/pair-offer", get(equipment::pair_offer))
        // Loans and returns
        .route("/equipment/:id/loan", post(equipment::loan_equipment))
        .route("/equipment/:id/return", post(equipment::return_equipment))
        .route("/transactions/recent", get(transactions::recent_transactions))
        // Photo recognition
        .route(
            "/scan",
            post(scan::scan_photo).layer(DefaultBodyLimit::max(scan::MAX_IMAGE_BYTES + 64 * 1024)),
        )
        // Statistics
        .route("/stats", get(stats::get_stats))
        .route("/stats/insight", post(stats::stock_insight))
        .with_state(state);

    // OpenAPI documentation
    let docs = openapi::create_openapi_router();

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(docs)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
