//! Ledger endpoints

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use crate::{error::AppResult, models::transaction::Transaction};

use super::AuthenticatedUser;

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct RecentQuery {
    /// Number of entries (server default when omitted)
    pub limit: Option<usize>,
}

/// Latest loans and returns across the station
#[utoipa::path(
    get,
    path = "/transactions/recent",
    tag = "transactions",
    security(("bearer_auth" = [])),
    params(RecentQuery),
    responses(
        (status = 200, description = "Newest entries first", body = Vec<Transaction>)
    )
)]
pub async fn recent_transactions(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Query(query): Query<RecentQuery>,
) -> AppResult<Json<Vec<Transaction>>> {
    Ok(Json(state.services.ledger.recent(query.limit).await))
}
