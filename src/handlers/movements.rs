// src/handlers/movements.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{auth::AuthenticatedUser, rbac::RequireAdmin},
    models::inventory::{Movement, MovementType, Product},
};

/// Resposta das escritas no razão: a movimentação tocada e o produto com o
/// estoque resultante.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MovementOutcome {
    pub movement: Movement,
    pub product: Product,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateMovementPayload {
    pub product_id: Uuid,

    #[serde(rename = "type")]
    #[schema(example = "out")]
    pub movement_type: MovementType,

    #[validate(range(min = 1, message = "A quantidade deve ser maior que zero."))]
    #[schema(example = 3)]
    pub quantity: i32,

    #[schema(example = "Venda balcão")]
    pub reason: Option<String>,
}

// POST /api/inventory/movements
#[utoipa::path(
    post,
    path = "/api/inventory/movements",
    tag = "Movements",
    request_body = CreateMovementPayload,
    responses(
        (status = 201, description = "Movimentação aplicada ao estoque", body = MovementOutcome),
        (status = 400, description = "Quantidade inválida ou estoque insuficiente"),
        (status = 404, description = "Produto não encontrado no tenant"),
        (status = 409, description = "Corrida de concorrência persistiu após as tentativas")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_movement(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Json(payload): Json<CreateMovementPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let (product, movement) = app_state
        .ledger_service
        .apply_movement(
            user.0.tenant_id,
            payload.product_id,
            payload.movement_type,
            payload.quantity,
            payload.reason,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(MovementOutcome { movement, product })))
}

// GET /api/inventory/movements
#[utoipa::path(
    get,
    path = "/api/inventory/movements",
    tag = "Movements",
    responses(
        (status = 200, description = "Movimentações ativas do tenant, mais novas primeiro", body = Vec<Movement>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_movements(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    let movements = app_state.ledger_service.list_movements(user.0.tenant_id).await?;
    Ok((StatusCode::OK, Json(movements)))
}

// GET /api/inventory/movements/{product_id}
#[utoipa::path(
    get,
    path = "/api/inventory/movements/{product_id}",
    tag = "Movements",
    params(
        ("product_id" = Uuid, Path, description = "ID do produto")
    ),
    responses(
        (status = 200, description = "Movimentações ativas do produto", body = Vec<Movement>),
        (status = 404, description = "Produto não encontrado no tenant")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_movements_by_product(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(product_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let movements = app_state
        .ledger_service
        .list_movements_by_product(user.0.tenant_id, product_id)
        .await?;
    Ok((StatusCode::OK, Json(movements)))
}

// DELETE /api/inventory/movements/{id}
#[utoipa::path(
    delete,
    path = "/api/inventory/movements/{id}",
    tag = "Movements",
    params(
        ("id" = Uuid, Path, description = "ID da movimentação")
    ),
    responses(
        (status = 200, description = "Movimentação anulada e estoque restaurado", body = MovementOutcome),
        (status = 400, description = "A reversão deixaria o estoque negativo"),
        (status = 404, description = "Movimentação não encontrada ou já anulada"),
        (status = 403, description = "Requer papel admin")
    ),
    security(("api_jwt" = []))
)]
pub async fn reverse_movement(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    _guard: RequireAdmin,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let (product, movement) = app_state
        .ledger_service
        .reverse_movement(user.0.tenant_id, id)
        .await?;

    Ok((StatusCode::OK, Json(MovementOutcome { movement, product })))
}
