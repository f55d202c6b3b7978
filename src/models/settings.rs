// src/models/settings.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// Configuração de automação por tenant. Persistida: o estado sobrevive a
// reinícios e é compartilhado entre instâncias do serviço.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TenantSettings {
    #[schema(ignore)] // O contexto (token) já define a loja
    pub tenant_id: Uuid,

    #[schema(example = false)]
    pub rfid_enabled: bool,

    pub updated_at: DateTime<Utc>,
}

impl TenantSettings {
    /// Estado padrão de um tenant que nunca gravou configuração.
    pub fn default_for(tenant_id: Uuid) -> Self {
        Self {
            tenant_id,
            rfid_enabled: false,
            updated_at: Utc::now(),
        }
    }
}

// Resultado do processamento de um comando de voz.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VoiceOutcome {
    #[schema(example = "Modo RFID ativado por comando de voz")]
    pub message: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub rfid_enabled: Option<bool>,

    // Ação sugerida ao cliente (ex.: "dashboard.overview")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,

    // Comando original, ecoado quando nada foi reconhecido
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
}
