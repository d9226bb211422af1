//! Dashboard endpoints

use axum::{extract::State, Json};

use crate::{
    error::{AppError, AppResult},
    models::stats::{StockInsight, StockStats},
};

use super::AuthenticatedUser;

/// Item counts by status and type
#[utoipa::path(
    get,
    path = "/stats",
    tag = "stats",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Stock figures", body = StockStats)
    )
)]
pub async fn get_stats(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
) -> AppResult<Json<StockStats>> {
    Ok(Json(state.services.ledger.status_counts().await))
}

/// Ask the stock analyst for a short reading of the inventory
#[utoipa::path(
    post,
    path = "/stats/insight",
    tag = "stats",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Advisory text", body = StockInsight),
        (status = 502, description = "Analysis service failed"),
        (status = 503, description = "No analysis service configured")
    )
)]
pub async fn stock_insight(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
) -> AppResult<Json<StockInsight>> {
    let analyst = state
        .services
        .analyst
        .as_deref()
        .ok_or_else(|| AppError::VisionUnavailable("Stock analysis".to_string()))?;

    Ok(Json(state.services.ledger.insight(analyst).await?))
}
