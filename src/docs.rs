// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Products ---
        handlers::products::create_product,
        handlers::products::list_products,
        handlers::products::search_products,
        handlers::products::list_low_stock,
        handlers::products::list_out_of_stock,
        handlers::products::list_by_category,
        handlers::products::get_product,
        handlers::products::update_product,
        handlers::products::deactivate_product,
        handlers::products::reactivate_product,
        handlers::products::restock_product,
        handlers::products::decrease_product,

        // --- Categories ---
        handlers::categories::create_category,
        handlers::categories::list_categories,
        handlers::categories::get_category,
        handlers::categories::update_category,
        handlers::categories::deactivate_category,

        // --- Movements ---
        handlers::movements::create_movement,
        handlers::movements::list_movements,
        handlers::movements::list_movements_by_product,
        handlers::movements::reverse_movement,

        // --- Dashboard ---
        handlers::dashboard::get_overview,
        handlers::dashboard::get_alerts,
        handlers::dashboard::get_trends,

        // --- Automation ---
        handlers::automation::get_rfid_mode,
        handlers::automation::update_rfid_mode,
        handlers::automation::voice_command,
        handlers::automation::voice_to_action,
    ),
    components(
        schemas(
            // --- Inventory ---
            models::inventory::EntityStatus,
            models::inventory::MovementType,
            models::inventory::Product,
            models::inventory::Category,
            models::inventory::Movement,

            // --- Dashboard ---
            models::dashboard::DashboardOverview,
            models::dashboard::ProductTrend,

            // --- Settings ---
            models::settings::TenantSettings,
            models::settings::VoiceOutcome,

            // --- Auth ---
            models::auth::Role,

            // --- Payloads ---
            handlers::products::CreateProductPayload,
            handlers::products::UpdateProductPayload,
            handlers::products::UpdateStockPayload,
            handlers::categories::CreateCategoryPayload,
            handlers::categories::UpdateCategoryPayload,
            handlers::movements::CreateMovementPayload,
            handlers::movements::MovementOutcome,
            handlers::automation::UpdateRfidModePayload,
            handlers::automation::VoiceCommandPayload,
        )
    ),
    tags(
        (name = "Products", description = "Catálogo de produtos do tenant"),
        (name = "Categories", description = "Categorias de produtos"),
        (name = "Movements", description = "Razão de movimentações de estoque"),
        (name = "Dashboard", description = "Indicadores e alertas de estoque"),
        (name = "Automation", description = "RFID e comandos de voz")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}
