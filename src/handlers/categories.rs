// src/handlers/categories.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{auth::AuthenticatedUser, rbac::RequireAdmin},
    models::inventory::Category,
};

#[derive(Debug, serde::Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCategoryPayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    #[schema(example = "Bebidas")]
    pub name: String,

    pub description: Option<String>,
}

// POST /api/inventory/categories
#[utoipa::path(
    post,
    path = "/api/inventory/categories",
    tag = "Categories",
    request_body = CreateCategoryPayload,
    responses(
        (status = 201, description = "Categoria criada", body = Category),
        (status = 403, description = "Requer papel admin")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_category(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    _guard: RequireAdmin,
    Json(payload): Json<CreateCategoryPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let category = app_state
        .categories_service
        .create_category(user.0.tenant_id, payload.name, payload.description)
        .await?;

    Ok((StatusCode::CREATED, Json(category)))
}

// GET /api/inventory/categories
#[utoipa::path(
    get,
    path = "/api/inventory/categories",
    tag = "Categories",
    responses(
        (status = 200, description = "Categorias ativas do tenant", body = Vec<Category>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_categories(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    let categories = app_state.categories_service.list_categories(user.0.tenant_id).await?;
    Ok((StatusCode::OK, Json(categories)))
}

// GET /api/inventory/categories/{id}
#[utoipa::path(
    get,
    path = "/api/inventory/categories/{id}",
    tag = "Categories",
    params(
        ("id" = Uuid, Path, description = "ID da categoria")
    ),
    responses(
        (status = 200, description = "Categoria encontrada", body = Category),
        (status = 404, description = "Categoria não encontrada no tenant")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_category(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let category = app_state.categories_service.get_category(user.0.tenant_id, id).await?;
    Ok((StatusCode::OK, Json(category)))
}

#[derive(Debug, serde::Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCategoryPayload {
    #[validate(length(min = 1, message = "O nome não pode ser vazio."))]
    pub name: Option<String>,

    pub description: Option<String>,
}

// PATCH /api/inventory/categories/{id}
#[utoipa::path(
    patch,
    path = "/api/inventory/categories/{id}",
    tag = "Categories",
    request_body = UpdateCategoryPayload,
    params(
        ("id" = Uuid, Path, description = "ID da categoria")
    ),
    responses(
        (status = 200, description = "Categoria atualizada", body = Category),
        (status = 404, description = "Categoria não encontrada no tenant"),
        (status = 403, description = "Requer papel admin")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_category(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    _guard: RequireAdmin,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCategoryPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let category = app_state
        .categories_service
        .update_category(user.0.tenant_id, id, payload.name, payload.description)
        .await?;

    Ok((StatusCode::OK, Json(category)))
}

// DELETE /api/inventory/categories/{id}
#[utoipa::path(
    delete,
    path = "/api/inventory/categories/{id}",
    tag = "Categories",
    params(
        ("id" = Uuid, Path, description = "ID da categoria")
    ),
    responses(
        (status = 200, description = "Categoria desativada; produtos mantêm o vínculo", body = Category),
        (status = 404, description = "Categoria não encontrada ou já inativa"),
        (status = 403, description = "Requer papel admin")
    ),
    security(("api_jwt" = []))
)]
pub async fn deactivate_category(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    _guard: RequireAdmin,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let category = app_state
        .categories_service
        .deactivate_category(user.0.tenant_id, id)
        .await?;
    Ok((StatusCode::OK, Json(category)))
}
