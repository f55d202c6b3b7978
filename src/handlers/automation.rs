// src/handlers/automation.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{auth::AuthenticatedUser, rbac::RequireAdmin},
    models::settings::{TenantSettings, VoiceOutcome},
};

// GET /api/inventory/automation/rfid-mode
#[utoipa::path(
    get,
    path = "/api/inventory/automation/rfid-mode",
    tag = "Automation",
    responses(
        (status = 200, description = "Configuração persistida do tenant (padrão: desligado)", body = TenantSettings)
    ),
    security(("api_jwt" = []))
)]
pub async fn get_rfid_mode(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    let settings = app_state.automation_service.get_rfid_mode(user.0.tenant_id).await?;
    Ok((StatusCode::OK, Json(settings)))
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRfidModePayload {
    #[schema(example = true)]
    pub enabled: bool,
}

// PATCH /api/inventory/automation/rfid-mode
#[utoipa::path(
    patch,
    path = "/api/inventory/automation/rfid-mode",
    tag = "Automation",
    request_body = UpdateRfidModePayload,
    responses(
        (status = 200, description = "Configuração gravada", body = TenantSettings),
        (status = 403, description = "Requer papel admin")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_rfid_mode(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    _guard: RequireAdmin,
    Json(payload): Json<UpdateRfidModePayload>,
) -> Result<impl IntoResponse, AppError> {
    let settings = app_state
        .automation_service
        .set_rfid_mode(user.0.tenant_id, payload.enabled)
        .await?;
    Ok((StatusCode::OK, Json(settings)))
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VoiceCommandPayload {
    #[validate(length(min = 1, message = "O comando é obrigatório."))]
    #[schema(example = "ativar rfid")]
    pub command: String,
}

// POST /api/inventory/automation/voice-command
#[utoipa::path(
    post,
    path = "/api/inventory/automation/voice-command",
    tag = "Automation",
    request_body = VoiceCommandPayload,
    responses(
        (status = 200, description = "Comando interpretado; frases de RFID gravam a configuração", body = VoiceOutcome)
    ),
    security(("api_jwt" = []))
)]
pub async fn voice_command(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Json(payload): Json<VoiceCommandPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let outcome = app_state
        .automation_service
        .voice_command(user.0.tenant_id, &payload.command)
        .await?;
    Ok((StatusCode::OK, Json(outcome)))
}

// POST /api/inventory/automation/voice-to-action
#[utoipa::path(
    post,
    path = "/api/inventory/automation/voice-to-action",
    tag = "Automation",
    request_body = VoiceCommandPayload,
    responses(
        (status = 200, description = "Comando interpretado com dica de ação para o painel", body = VoiceOutcome)
    ),
    security(("api_jwt" = []))
)]
pub async fn voice_to_action(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Json(payload): Json<VoiceCommandPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let outcome = app_state
        .automation_service
        .voice_to_action(user.0.tenant_id, &payload.command)
        .await?;
    Ok((StatusCode::OK, Json(outcome)))
}
