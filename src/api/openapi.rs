//! OpenAPI documentation

use axum::Router;
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{equipment, health, scan, stats, transactions, users};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "FireStock API",
        version = "1.0.0",
        description = "PPE inventory, loan and audit REST API for fire stations",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Equipment
        equipment::list_equipment,
        equipment::get_equipment,
        equipment::find_by_barcode,
        equipment::create_equipment,
        equipment::update_equipment,
        equipment::delete_equipment,
        equipment::equipment_history,
        equipment::pair_offer,
        equipment::loan_equipment,
        equipment::return_equipment,
        scan::scan_photo,
        // Ledger
        transactions::recent_transactions,
        // Stats
        stats::get_stats,
        stats::stock_insight,
        // Directory
        users::list_users,
        users::me,
        users::sync,
    ),
    components(
        schemas(
            // Equipment
            crate::models::equipment::Equipment,
            crate::models::equipment::CreateEquipment,
            crate::models::equipment::UpdateEquipment,
            crate::models::enums::EquipmentType,
            crate::models::enums::EquipmentStatus,
            crate::models::enums::Condition,
            crate::models::enums::LifecycleAction,
            crate::models::classification::Classification,
            equipment::PairOfferResponse,
            scan::ScanUpload,
            scan::ScanResponse,
            // Ledger
            crate::models::transaction::Transaction,
            crate::models::transaction::TransactionKind,
            crate::models::transaction::LoanRequest,
            crate::models::transaction::ReturnRequest,
            crate::models::transaction::TransitionOutcome,
            // Stats
            crate::models::stats::StockStats,
            crate::models::stats::TypeCount,
            crate::models::stats::StockInsight,
            // Directory
            crate::models::user::User,
            crate::models::enums::Role,
            users::SyncResponse,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Session endpoints"),
        (name = "equipment", description = "Registry, loans and returns"),
        (name = "transactions", description = "Loan and return ledger"),
        (name = "stats", description = "Dashboard figures"),
        (name = "users", description = "Operator directory")
    )
)]
pub struct ApiDoc;

/// Bearer tokens issued by the identity provider
struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
