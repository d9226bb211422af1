//! Error types for FireStock server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::models::enums::{EquipmentStatus, LifecycleAction};

/// Application error codes returned to the mobile shell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ErrorCode {
    Failure = 1,
    NotAuthorized = 2,
    RemoteFailure = 3,
    NoSuchItem = 5,
    BadValue = 6,
    DuplicateBarcode = 7,
    PairNotFound = 8,
    SelfPair = 9,
    InvalidTransition = 10,
    PartialCascade = 11,
    VisionFailure = 12,
    NotAuthenticated = 13,
    VisionUnavailable = 14,
    PartialWrite = 15,
}

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Authorization failed: {0}")]
    Authorization(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Barcode {0} is already used by another item")]
    DuplicateBarcode(String),

    #[error("No item carries the pair barcode {0}")]
    PairNotFound(String),

    #[error("An item cannot be paired with itself")]
    SelfPair,

    #[error("Cannot {action} item {barcode}: it is currently {status}")]
    InvalidTransition {
        barcode: String,
        status: EquipmentStatus,
        action: LifecycleAction,
    },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Remote store error: {0}")]
    RemoteIo(String),

    #[error(
        "Paired item {failed_equipment} did not transition ({reason}); transaction {completed} was recorded"
    )]
    PartialCascade {
        completed: Uuid,
        failed_equipment: Uuid,
        reason: String,
    },

    #[error("Item {equipment} was partly saved ({persisted}); {reason}")]
    PartialWrite {
        equipment: Uuid,
        persisted: String,
        reason: String,
    },

    #[error("Vision service error: {0}")]
    Vision(String),

    #[error("{0} is not configured on this server")]
    VisionUnavailable(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// Whether this error came from the system of record (and local state may have diverged)
    pub fn is_remote(&self) -> bool {
        matches!(self, AppError::Database(_) | AppError::RemoteIo(_))
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::Validation(errors.to_string())
    }
}

/// Error response body
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub code: u32,
    pub error: String,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Authentication(msg) => {
                (StatusCode::UNAUTHORIZED, ErrorCode::NotAuthenticated, msg.clone())
            }
            AppError::Authorization(msg) => {
                (StatusCode::FORBIDDEN, ErrorCode::NotAuthorized, msg.clone())
            }
            AppError::NotFound(msg) => {
                (StatusCode::NOT_FOUND, ErrorCode::NoSuchItem, msg.clone())
            }
            AppError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, ErrorCode::BadValue, msg.clone())
            }
            AppError::DuplicateBarcode(_) => {
                (StatusCode::CONFLICT, ErrorCode::DuplicateBarcode, self.to_string())
            }
            AppError::PairNotFound(_) => {
                (StatusCode::NOT_FOUND, ErrorCode::PairNotFound, self.to_string())
            }
            AppError::SelfPair => {
                (StatusCode::BAD_REQUEST, ErrorCode::SelfPair, self.to_string())
            }
            AppError::InvalidTransition { .. } => {
                (StatusCode::CONFLICT, ErrorCode::InvalidTransition, self.to_string())
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    ErrorCode::RemoteFailure,
                    "The equipment store is unreachable, the operation was not saved".to_string(),
                )
            }
            AppError::RemoteIo(msg) => {
                tracing::error!("Remote store error: {}", msg);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    ErrorCode::RemoteFailure,
                    "The equipment store is unreachable, the operation was not saved".to_string(),
                )
            }
            AppError::PartialCascade { .. } => {
                (StatusCode::BAD_GATEWAY, ErrorCode::PartialCascade, self.to_string())
            }
            AppError::PartialWrite { .. } => {
                tracing::error!("{}", self);
                (StatusCode::BAD_GATEWAY, ErrorCode::PartialWrite, self.to_string())
            }
            AppError::VisionUnavailable(_) => {
                (StatusCode::SERVICE_UNAVAILABLE, ErrorCode::VisionUnavailable, self.to_string())
            }
            AppError::Vision(msg) => {
                (StatusCode::BAD_GATEWAY, ErrorCode::VisionFailure, msg.clone())
            }
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, ErrorCode::BadValue, msg.clone())
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::Failure,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(ErrorResponse {
            code: code as u32,
            error: format!("{:?}", code),
            message,
        });

        (status, body).into_response()
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
