// src/middleware/rbac.rs

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::{common::error::AppError, models::auth::TenantIdentity};

/// Guardião de papel: a rota só prossegue se a identidade do token for
/// `admin`. O papel vem assinado no próprio token, então não há consulta
/// ao banco aqui.
///
/// Criação de movimentação é a única mutação aberta a `employee`; ela não
/// usa este extrator.
pub struct RequireAdmin;

impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let identity = parts
            .extensions
            .get::<TenantIdentity>()
            .ok_or(AppError::Unauthenticated)?;

        if !identity.is_admin() {
            return Err(AppError::Forbidden);
        }

        Ok(RequireAdmin)
    }
}
