// src/handlers/dashboard.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::dashboard::{DashboardOverview, ProductTrend},
    models::inventory::Product,
};

// GET /api/inventory/dashboard/overview
#[utoipa::path(
    get,
    path = "/api/inventory/dashboard/overview",
    tag = "Dashboard",
    responses(
        (status = 200, description = "Contagens, estoque total e movimentações recentes", body = DashboardOverview),
        (status = 401, description = "Não autorizado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_overview(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    let overview = app_state.dashboard_service.get_overview(user.0.tenant_id).await?;
    Ok((StatusCode::OK, Json(overview)))
}

// GET /api/inventory/dashboard/alerts
#[utoipa::path(
    get,
    path = "/api/inventory/dashboard/alerts",
    tag = "Dashboard",
    responses(
        (status = 200, description = "Produtos abaixo do estoque mínimo, mais críticos primeiro", body = Vec<Product>)
    ),
    security(("api_jwt" = []))
)]
pub async fn get_alerts(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    let alerts = app_state.dashboard_service.get_alerts(user.0.tenant_id).await?;
    Ok((StatusCode::OK, Json(alerts)))
}

// GET /api/inventory/dashboard/trends
#[utoipa::path(
    get,
    path = "/api/inventory/dashboard/trends",
    tag = "Dashboard",
    responses(
        (status = 200, description = "Cinco produtos com mais movimentação", body = Vec<ProductTrend>)
    ),
    security(("api_jwt" = []))
)]
pub async fn get_trends(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    let trends = app_state.dashboard_service.get_trends(user.0.tenant_id).await?;
    Ok((StatusCode::OK, Json(trends)))
}
