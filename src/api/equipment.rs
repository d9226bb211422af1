//! Equipment API endpoints: registry and loan/return actions

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{
        enums::LifecycleAction,
        equipment::{CreateEquipment, Equipment, EquipmentQuery, UpdateEquipment},
        transaction::{LoanRequest, ReturnRequest, Transaction, TransitionOutcome},
    },
};

use super::AuthenticatedUser;

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct PairOfferQuery {
    /// Transition about to be requested
    pub action: LifecycleAction,
}

/// Partner that would follow the item, if any
#[derive(Debug, Serialize, ToSchema)]
pub struct PairOfferResponse {
    pub partner: Option<Equipment>,
}

/// List equipment
#[utoipa::path(
    get,
    path = "/equipment",
    tag = "equipment",
    security(("bearer_auth" = [])),
    params(EquipmentQuery),
    responses(
        (status = 200, description = "Equipment list", body = Vec<Equipment>)
    )
)]
pub async fn list_equipment(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Query(query): Query<EquipmentQuery>,
) -> AppResult<Json<Vec<Equipment>>> {
    Ok(Json(state.services.registry.list(&query).await))
}

/// Get equipment by ID
#[utoipa::path(
    get,
    path = "/equipment/{id}",
    tag = "equipment",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Equipment ID")),
    responses(
        (status = 200, description = "Equipment details", body = Equipment),
        (status = 404, description = "Equipment not found")
    )
)]
pub async fn get_equipment(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Equipment>> {
    Ok(Json(state.services.registry.get(id).await?))
}

/// Look up a scanned or typed barcode
#[utoipa::path(
    get,
    path = "/equipment/barcode/{code}",
    tag = "equipment",
    security(("bearer_auth" = [])),
    params(("code" = String, Path, description = "Exact barcode")),
    responses(
        (status = 200, description = "Matching equipment", body = Equipment),
        (status = 404, description = "Unknown barcode")
    )
)]
pub async fn find_by_barcode(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(code): Path<String>,
) -> AppResult<Json<Equipment>> {
    Ok(Json(state.services.registry.find_by_barcode(&code).await?))
}

/// Create equipment
#[utoipa::path(
    post,
    path = "/equipment",
    tag = "equipment",
    security(("bearer_auth" = [])),
    request_body = CreateEquipment,
    responses(
        (status = 201, description = "Equipment created", body = Equipment),
        (status = 400, description = "Invalid data or self pairing"),
        (status = 404, description = "Pair barcode not found"),
        (status = 409, description = "Barcode already registered")
    )
)]
pub async fn create_equipment(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(data): Json<CreateEquipment>,
) -> AppResult<(StatusCode, Json<Equipment>)> {
    state.services.directory.current_user(&claims).await?;
    let equipment = state.services.registry.add(data).await?;
    Ok((StatusCode::CREATED, Json(equipment)))
}

/// Update equipment
#[utoipa::path(
    put,
    path = "/equipment/{id}",
    tag = "equipment",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Equipment ID")),
    request_body = UpdateEquipment,
    responses(
        (status = 200, description = "Equipment updated", body = Equipment),
        (status = 400, description = "Invalid data"),
        (status = 404, description = "Equipment or pair barcode not found"),
        (status = 409, description = "Barcode already registered")
    )
)]
pub async fn update_equipment(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(data): Json<UpdateEquipment>,
) -> AppResult<Json<Equipment>> {
    state.services.directory.current_user(&claims).await?;
    Ok(Json(state.services.registry.update(id, data).await?))
}

/// Delete equipment (administrators only). Its ledger entries are kept.
#[utoipa::path(
    delete,
    path = "/equipment/{id}",
    tag = "equipment",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Equipment ID")),
    responses(
        (status = 204, description = "Equipment deleted"),
        (status = 403, description = "Administrator role required"),
        (status = 404, description = "Equipment not found")
    )
)]
pub async fn delete_equipment(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    let actor = state.services.directory.current_user(&claims).await?;
    if !actor.is_admin() {
        tracing::warn!("Operator {} tried to delete equipment {}", actor.id, id);
        return Err(AppError::Authorization(
            "Only an administrator can delete equipment".to_string(),
        ));
    }

    state.services.registry.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Loan and return history of one item, newest first
#[utoipa::path(
    get,
    path = "/equipment/{id}/history",
    tag = "equipment",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Equipment ID (may be deleted)")),
    responses(
        (status = 200, description = "Ledger entries", body = Vec<Transaction>)
    )
)]
pub async fn equipment_history(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Vec<Transaction>>> {
    Ok(Json(state.services.ledger.history_for(id).await))
}

/// Paired item that can follow this one through a loan or a return
#[utoipa::path(
    get,
    path = "/equipment/{id}/pair-offer",
    tag = "equipment",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Equipment ID"),
        PairOfferQuery
    ),
    responses(
        (status = 200, description = "Eligible partner, if any", body = PairOfferResponse),
        (status = 404, description = "Equipment not found")
    )
)]
pub async fn pair_offer(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Query(query): Query<PairOfferQuery>,
) -> AppResult<Json<PairOfferResponse>> {
    let partner = state.services.lifecycle.pair_offer(id, query.action).await?;
    Ok(Json(PairOfferResponse { partner }))
}

/// Hand an item out
#[utoipa::path(
    post,
    path = "/equipment/{id}/loan",
    tag = "equipment",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Equipment ID")),
    request_body = LoanRequest,
    responses(
        (status = 200, description = "Item loaned", body = TransitionOutcome),
        (status = 400, description = "Unknown assignee"),
        (status = 403, description = "Only administrators assign to others"),
        (status = 409, description = "Item is not available"),
        (status = 502, description = "Item loaned but its pair could not follow")
    )
)]
pub async fn loan_equipment(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(request): Json<LoanRequest>,
) -> AppResult<Json<TransitionOutcome>> {
    let actor = state.services.directory.current_user(&claims).await?;
    let outcome = state.services.lifecycle.request_loan(&actor, id, request).await?;
    Ok(Json(outcome))
}

/// Take an item back
#[utoipa::path(
    post,
    path = "/equipment/{id}/return",
    tag = "equipment",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Equipment ID")),
    request_body = ReturnRequest,
    responses(
        (status = 200, description = "Item returned", body = TransitionOutcome),
        (status = 409, description = "Item is not loaned"),
        (status = 502, description = "Item returned but its pair could not follow")
    )
)]
pub async fn return_equipment(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(request): Json<ReturnRequest>,
) -> AppResult<Json<TransitionOutcome>> {
    let actor = state.services.directory.current_user(&claims).await?;
    let outcome = state.services.lifecycle.request_return(&actor, id, request).await?;
    Ok(Json(outcome))
}
