// src/lib.rs

pub mod common;
pub mod config;
pub mod db;
pub mod docs;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;

use axum::{
    middleware as axum_middleware,
    routing::{get, patch, post},
    Json, Router,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::AppState;
use crate::docs::ApiDoc;
use crate::middleware::auth::auth_guard;

// GET /api/health (pública, sem token)
async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

/// Monta o router completo da aplicação. O binário e os testes de API
/// servem exatamente o mesmo router.
pub fn build_router(app_state: AppState) -> Router {
    let product_routes = Router::new()
        .route("/products"
               ,post(handlers::products::create_product)
               .get(handlers::products::list_products)
        )
        .route("/products/search", get(handlers::products::search_products))
        .route("/products/low-stock", get(handlers::products::list_low_stock))
        .route("/products/out-of-stock", get(handlers::products::list_out_of_stock))
        .route("/products/category/{category_id}", get(handlers::products::list_by_category))
        .route("/products/{id}"
               ,get(handlers::products::get_product)
               .patch(handlers::products::update_product)
               .delete(handlers::products::deactivate_product)
        )
        .route("/products/{id}/restock", patch(handlers::products::restock_product))
        .route("/products/{id}/decrease", patch(handlers::products::decrease_product))
        .route("/products/{id}/reactivate", patch(handlers::products::reactivate_product));

    let category_routes = Router::new()
        .route("/categories"
               ,post(handlers::categories::create_category)
               .get(handlers::categories::list_categories)
        )
        .route("/categories/{id}"
               ,get(handlers::categories::get_category)
               .patch(handlers::categories::update_category)
               .delete(handlers::categories::deactivate_category)
        );

    // GET usa o mesmo segmento do DELETE; o parâmetro é o id do produto na
    // leitura e o id da movimentação na anulação.
    let movement_routes = Router::new()
        .route("/movements"
               ,post(handlers::movements::create_movement)
               .get(handlers::movements::list_movements)
        )
        .route("/movements/{id}"
               ,get(handlers::movements::list_movements_by_product)
               .delete(handlers::movements::reverse_movement)
        );

    let dashboard_routes = Router::new()
        .route("/dashboard/overview", get(handlers::dashboard::get_overview))
        .route("/dashboard/alerts", get(handlers::dashboard::get_alerts))
        .route("/dashboard/trends", get(handlers::dashboard::get_trends));

    let automation_routes = Router::new()
        .route("/automation/rfid-mode"
               ,get(handlers::automation::get_rfid_mode)
               .patch(handlers::automation::update_rfid_mode)
        )
        .route("/automation/voice-command", post(handlers::automation::voice_command))
        .route("/automation/voice-to-action", post(handlers::automation::voice_to_action));

    // Tudo em /api/inventory passa pelo guardião de token.
    let inventory_routes = Router::new()
        .merge(product_routes)
        .merge(category_routes)
        .merge(movement_routes)
        .merge(dashboard_routes)
        .merge(automation_routes)
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    Router::new()
        .route("/api/health", get(health_check))
        .nest("/api/inventory", inventory_routes)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(app_state)
}
