// src/models/auth.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;

// --- 1. Papel do usuário dentro do tenant ---
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Employee,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Employee => "employee",
        }
    }
}

impl FromStr for Role {
    type Err = ();

    // Comparação exata: qualquer outro valor é uma claim inválida.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "employee" => Ok(Role::Employee),
            _ => Err(()),
        }
    }
}

// --- 2. Claims do token (formato de fio) ---
// Todos os campos são opcionais na desserialização: a ordem das checagens
// (expiração antes de sujeito/papel/tenant) é responsabilidade do verificador,
// não do serde.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_id: Option<String>,
    /// Expiração em segundos desde a época (Unix).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
}

// --- 3. Identidade verificada ---
// Derivada do token a cada requisição; nunca é persistida. Todas as
// operações de dados usam o `tenant_id` daqui, jamais um valor vindo do
// corpo ou da query string.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TenantIdentity {
    pub subject: String,
    pub role: Role,
    pub tenant_id: Uuid,
    pub expires_at: Option<DateTime<Utc>>,
}

impl TenantIdentity {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}
