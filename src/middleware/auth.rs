// src/middleware/auth.rs

use axum::{
    extract::{FromRequestParts, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use chrono::Utc;

use crate::{common::error::AppError, config::AppState, models::auth::TenantIdentity};

// O middleware em si: exige `Authorization: Bearer <token>`, roda o
// verificador e injeta a identidade nos extensions da requisição. O motivo
// real da rejeição fica no log de debug; a resposta é sempre genérica.
pub async fn auth_guard(
    State(app_state): State<AppState>,
    mut request: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, AppError> {
    let headers = request.headers();
    let auth_header = headers.get("Authorization").and_then(|value| value.to_str().ok());

    if let Some(auth_header) = auth_header {
        if let Some(token) = auth_header.strip_prefix("Bearer ") {
            match app_state.token_verifier.verify(token, Utc::now()) {
                Ok(identity) => {
                    // Insere a identidade nos "extensions" da requisição
                    request.extensions_mut().insert(identity);
                    return Ok(next.run(request).await);
                }
                Err(rejection) => {
                    tracing::debug!("Token rejeitado: {}", rejection);
                    return Err(AppError::Unauthenticated);
                }
            }
        }
    }

    Err(AppError::Unauthenticated)
}

// Extrator para obter a identidade verificada diretamente nos handlers.
// Todo acesso a dados usa o tenant daqui; corpo e query nunca carregam
// tenant.
pub struct AuthenticatedUser(pub TenantIdentity);

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<TenantIdentity>()
            .cloned()
            .map(AuthenticatedUser)
            .ok_or(AppError::Unauthenticated)
    }
}
