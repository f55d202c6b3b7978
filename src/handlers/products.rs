// src/handlers/products.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use uuid::Uuid;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{auth::AuthenticatedUser, rbac::RequireAdmin},
    models::inventory::Product,
    services::products::ProductChanges,
};

// ---
// Validação customizada
// ---
fn validate_not_negative(val: &Decimal) -> Result<(), ValidationError> {
    if val.is_sign_negative() {
        let mut err = ValidationError::new("range");
        err.add_param("min".into(), &0.0);
        err.message = Some("O valor não pode ser negativo.".into());
        return Err(err);
    }
    Ok(())
}

// Distingue "campo ausente" de "campo presente com null": ausente fica
// `None`, presente (até null) vira `Some(...)`.
fn double_option<'de, D>(deserializer: D) -> Result<Option<Option<Uuid>>, D::Error>
where
    D: Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

fn default_min_stock() -> i32 {
    5
}

// ---
// Payload: CreateProduct
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductPayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    #[schema(example = "Café em grãos 1kg")]
    pub name: String,

    pub description: Option<String>,

    #[validate(custom(function = "validate_not_negative"))]
    #[schema(example = 59.9)]
    pub price: Decimal,

    // Estoque inicial entra direto, sem movimentação no razão.
    #[validate(range(min = 0, message = "O estoque não pode ser negativo."))]
    #[serde(default)]
    #[schema(example = 10)]
    pub stock: i32,

    #[validate(range(min = 0, message = "O estoque mínimo não pode ser negativo."))]
    #[serde(default = "default_min_stock")]
    #[schema(example = 5)]
    pub min_stock: i32,

    pub barcode: Option<String>,

    pub category_id: Option<Uuid>,
}

// POST /api/inventory/products
#[utoipa::path(
    post,
    path = "/api/inventory/products",
    tag = "Products",
    request_body = CreateProductPayload,
    responses(
        (status = 201, description = "Produto criado", body = Product),
        (status = 404, description = "Categoria não encontrada no tenant"),
        (status = 403, description = "Requer papel admin")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_product(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    _guard: RequireAdmin,
    Json(payload): Json<CreateProductPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let product = app_state
        .products_service
        .create_product(
            user.0.tenant_id,
            payload.name,
            payload.description,
            payload.price,
            payload.stock,
            payload.min_stock,
            payload.barcode,
            payload.category_id,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(product)))
}

// GET /api/inventory/products
#[utoipa::path(
    get,
    path = "/api/inventory/products",
    tag = "Products",
    responses(
        (status = 200, description = "Produtos ativos do tenant", body = Vec<Product>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_products(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    let products = app_state.products_service.list_products(user.0.tenant_id).await?;
    Ok((StatusCode::OK, Json(products)))
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub query: String,
}

// GET /api/inventory/products/search?query=
#[utoipa::path(
    get,
    path = "/api/inventory/products/search",
    tag = "Products",
    params(
        ("query" = Option<String>, Query, description = "Busca por nome, descrição ou código de barras; vazio lista tudo")
    ),
    responses(
        (status = 200, description = "Produtos que casam com o termo", body = Vec<Product>)
    ),
    security(("api_jwt" = []))
)]
pub async fn search_products(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Query(params): Query<SearchParams>,
) -> Result<impl IntoResponse, AppError> {
    let products = app_state
        .products_service
        .search_products(user.0.tenant_id, &params.query)
        .await?;
    Ok((StatusCode::OK, Json(products)))
}

// GET /api/inventory/products/low-stock
#[utoipa::path(
    get,
    path = "/api/inventory/products/low-stock",
    tag = "Products",
    responses(
        (status = 200, description = "Produtos ativos com estoque <= mínimo", body = Vec<Product>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_low_stock(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    let products = app_state.products_service.list_low_stock(user.0.tenant_id).await?;
    Ok((StatusCode::OK, Json(products)))
}

// GET /api/inventory/products/out-of-stock
#[utoipa::path(
    get,
    path = "/api/inventory/products/out-of-stock",
    tag = "Products",
    responses(
        (status = 200, description = "Produtos ativos com estoque zerado", body = Vec<Product>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_out_of_stock(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    let products = app_state.products_service.list_out_of_stock(user.0.tenant_id).await?;
    Ok((StatusCode::OK, Json(products)))
}

// GET /api/inventory/products/category/{category_id}
#[utoipa::path(
    get,
    path = "/api/inventory/products/category/{category_id}",
    tag = "Products",
    params(
        ("category_id" = Uuid, Path, description = "ID da categoria")
    ),
    responses(
        (status = 200, description = "Produtos ativos da categoria", body = Vec<Product>),
        (status = 404, description = "Categoria não encontrada no tenant")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_by_category(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(category_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let products = app_state
        .products_service
        .list_by_category(user.0.tenant_id, category_id)
        .await?;
    Ok((StatusCode::OK, Json(products)))
}

// GET /api/inventory/products/{id}
#[utoipa::path(
    get,
    path = "/api/inventory/products/{id}",
    tag = "Products",
    params(
        ("id" = Uuid, Path, description = "ID do produto")
    ),
    responses(
        (status = 200, description = "Produto encontrado", body = Product),
        (status = 404, description = "Produto não encontrado no tenant")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_product(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let product = app_state.products_service.get_product(user.0.tenant_id, id).await?;
    Ok((StatusCode::OK, Json(product)))
}

// ---
// Payload: UpdateProduct (lista fechada; estoque NUNCA entra aqui)
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductPayload {
    #[validate(length(min = 1, message = "O nome não pode ser vazio."))]
    pub name: Option<String>,

    pub description: Option<String>,

    #[validate(custom(function = "validate_not_negative"))]
    pub price: Option<Decimal>,

    #[validate(range(min = 0, message = "O estoque mínimo não pode ser negativo."))]
    pub min_stock: Option<i32>,

    pub barcode: Option<String>,

    // `null` explícito limpa o vínculo; campo ausente não mexe.
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<Uuid>)]
    pub category_id: Option<Option<Uuid>>,
}

// PATCH /api/inventory/products/{id}
#[utoipa::path(
    patch,
    path = "/api/inventory/products/{id}",
    tag = "Products",
    request_body = UpdateProductPayload,
    params(
        ("id" = Uuid, Path, description = "ID do produto")
    ),
    responses(
        (status = 200, description = "Produto atualizado", body = Product),
        (status = 404, description = "Produto ou categoria não encontrados"),
        (status = 403, description = "Requer papel admin")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_product(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    _guard: RequireAdmin,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateProductPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let changes = ProductChanges {
        name: payload.name,
        description: payload.description,
        price: payload.price,
        min_stock: payload.min_stock,
        barcode: payload.barcode,
        category_id: payload.category_id,
    };

    let product = app_state
        .products_service
        .update_product(user.0.tenant_id, id, changes)
        .await?;

    Ok((StatusCode::OK, Json(product)))
}

// DELETE /api/inventory/products/{id}
#[utoipa::path(
    delete,
    path = "/api/inventory/products/{id}",
    tag = "Products",
    params(
        ("id" = Uuid, Path, description = "ID do produto")
    ),
    responses(
        (status = 200, description = "Produto desativado (estoque preservado)", body = Product),
        (status = 404, description = "Produto não encontrado ou já inativo"),
        (status = 403, description = "Requer papel admin")
    ),
    security(("api_jwt" = []))
)]
pub async fn deactivate_product(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    _guard: RequireAdmin,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let product = app_state
        .products_service
        .deactivate_product(user.0.tenant_id, id)
        .await?;
    Ok((StatusCode::OK, Json(product)))
}

// PATCH /api/inventory/products/{id}/reactivate
#[utoipa::path(
    patch,
    path = "/api/inventory/products/{id}/reactivate",
    tag = "Products",
    params(
        ("id" = Uuid, Path, description = "ID do produto")
    ),
    responses(
        (status = 200, description = "Produto reativado", body = Product),
        (status = 404, description = "Produto não encontrado no tenant"),
        (status = 403, description = "Requer papel admin")
    ),
    security(("api_jwt" = []))
)]
pub async fn reactivate_product(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    _guard: RequireAdmin,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let product = app_state
        .products_service
        .reactivate_product(user.0.tenant_id, id)
        .await?;
    Ok((StatusCode::OK, Json(product)))
}

// ---
// Payload: ajuste direto de estoque (vira movimentação no razão)
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStockPayload {
    #[validate(range(min = 1, message = "A quantidade deve ser maior que zero."))]
    #[schema(example = 5)]
    pub quantity: i32,
}

// PATCH /api/inventory/products/{id}/restock
#[utoipa::path(
    patch,
    path = "/api/inventory/products/{id}/restock",
    tag = "Products",
    request_body = UpdateStockPayload,
    params(
        ("id" = Uuid, Path, description = "ID do produto")
    ),
    responses(
        (status = 200, description = "Entrada registrada no razão", body = Product),
        (status = 404, description = "Produto não encontrado no tenant"),
        (status = 403, description = "Requer papel admin")
    ),
    security(("api_jwt" = []))
)]
pub async fn restock_product(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    _guard: RequireAdmin,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateStockPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let (product, _) = app_state
        .ledger_service
        .restock(user.0.tenant_id, id, payload.quantity)
        .await?;
    Ok((StatusCode::OK, Json(product)))
}

// PATCH /api/inventory/products/{id}/decrease
#[utoipa::path(
    patch,
    path = "/api/inventory/products/{id}/decrease",
    tag = "Products",
    request_body = UpdateStockPayload,
    params(
        ("id" = Uuid, Path, description = "ID do produto")
    ),
    responses(
        (status = 200, description = "Saída registrada no razão", body = Product),
        (status = 400, description = "Estoque insuficiente"),
        (status = 404, description = "Produto não encontrado no tenant"),
        (status = 403, description = "Requer papel admin")
    ),
    security(("api_jwt" = []))
)]
pub async fn decrease_product(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    _guard: RequireAdmin,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateStockPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let (product, _) = app_state
        .ledger_service
        .decrease(user.0.tenant_id, id, payload.quantity)
        .await?;
    Ok((StatusCode::OK, Json(product)))
}
