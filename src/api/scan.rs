//! Photo classification endpoint

use axum::{extract::State, Json};
use axum_extra::extract::Multipart;
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::{AppError, AppResult},
    models::classification::Classification,
    services::registry::generate_barcode,
};

use super::AuthenticatedUser;

/// Largest photo accepted, in bytes
pub const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

/// Multipart body of `POST /scan`
#[derive(ToSchema)]
#[allow(dead_code)]
pub struct ScanUpload {
    /// JPEG or PNG photo of the item
    #[schema(value_type = String, format = Binary)]
    pub image: Vec<u8>,
}

/// Classification plus a provisional barcode for the creation form
#[derive(Debug, Serialize, ToSchema)]
pub struct ScanResponse {
    pub classification: Classification,
    /// `GEN-` code to use when the item carries no label
    pub suggested_barcode: String,
}

/// Classify a photo to pre-fill the creation form. Nothing is saved.
#[utoipa::path(
    post,
    path = "/scan",
    tag = "equipment",
    security(("bearer_auth" = [])),
    request_body(content = ScanUpload, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Best guess", body = ScanResponse),
        (status = 400, description = "Missing or unsupported image"),
        (status = 502, description = "Vision service failed"),
        (status = 503, description = "No vision service configured")
    )
)]
pub async fn scan_photo(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    mut multipart: Multipart,
) -> AppResult<Json<ScanResponse>> {
    let classifier = state
        .services
        .vision
        .as_deref()
        .ok_or_else(|| AppError::VisionUnavailable("Photo recognition".to_string()))?;

    let mut image = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        if field.name() != Some("image") {
            continue;
        }
        let mime = field.content_type().unwrap_or("image/jpeg").to_string();
        if !mime.starts_with("image/") {
            return Err(AppError::Validation(format!("Unsupported file type {}", mime)));
        }
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?;
        image = Some((bytes, mime));
        break;
    }

    let (bytes, mime) =
        image.ok_or_else(|| AppError::Validation("Missing `image` field".to_string()))?;
    if bytes.is_empty() {
        return Err(AppError::Validation("Image is empty".to_string()));
    }
    if bytes.len() > MAX_IMAGE_BYTES {
        return Err(AppError::Validation("Image is too large".to_string()));
    }

    let classification = classifier.classify(&bytes, &mime).await?;
    Ok(Json(ScanResponse {
        classification,
        suggested_barcode: generate_barcode("GEN"),
    }))
}
