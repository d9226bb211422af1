//! Operator directory endpoints

use axum::{extract::State, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{error::AppResult, models::user::User};

use super::AuthenticatedUser;

#[derive(Serialize, ToSchema)]
pub struct SyncResponse {
    pub equipment: usize,
    pub users: usize,
    pub transactions: usize,
}

/// List operators, alphabetical
#[utoipa::path(
    get,
    path = "/users",
    tag = "users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Operators", body = Vec<User>)
    )
)]
pub async fn list_users(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
) -> AppResult<Json<Vec<User>>> {
    Ok(Json(state.services.directory.list().await))
}

/// Profile of the signed-in operator
#[utoipa::path(
    get,
    path = "/auth/me",
    tag = "auth",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current operator", body = User),
        (status = 401, description = "Token invalid or no matching profile")
    )
)]
pub async fn me(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<User>> {
    Ok(Json(state.services.directory.current_user(&claims).await?))
}

/// Reload inventory, directory and ledger from the store
#[utoipa::path(
    post,
    path = "/sync",
    tag = "users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Snapshot reloaded", body = SyncResponse),
        (status = 503, description = "Store unreachable")
    )
)]
pub async fn sync(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<SyncResponse>> {
    let snapshot = &state.services.snapshot;
    snapshot.refresh().await?;

    let snap = snapshot.read().await;
    tracing::info!("Manual sync requested by {}", claims.sub);
    Ok(Json(SyncResponse {
        equipment: snap.inventory.len(),
        users: snap.users.len(),
        transactions: snap.transactions.len(),
    }))
}
