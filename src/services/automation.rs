// src/services/automation.rs

use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use crate::common::error::AppError;
use crate::db::InventoryStore;
use crate::models::settings::{TenantSettings, VoiceOutcome};

const ENABLE_PHRASES: [&str; 3] = ["ativar rfid", "activar rfid", "enable rfid"];
const DISABLE_PHRASES: [&str; 3] = ["desativar rfid", "desactivar rfid", "disable rfid"];
const OVERVIEW_PHRASES: [&str; 4] = ["inventário", "inventario", "estoque", "stock"];

#[derive(Clone)]
pub struct AutomationService {
    store: Arc<dyn InventoryStore>,
}

impl AutomationService {
    pub fn new(store: Arc<dyn InventoryStore>) -> Self {
        Self { store }
    }

    /// Configuração do tenant; quem nunca gravou nada recebe o padrão
    /// (RFID desligado).
    pub async fn get_rfid_mode(&self, tenant_id: Uuid) -> Result<TenantSettings, AppError> {
        Ok(self
            .store
            .get_settings(tenant_id)
            .await?
            .unwrap_or_else(|| TenantSettings::default_for(tenant_id)))
    }

    pub async fn set_rfid_mode(
        &self,
        tenant_id: Uuid,
        enabled: bool,
    ) -> Result<TenantSettings, AppError> {
        self.store
            .upsert_settings(TenantSettings {
                tenant_id,
                rfid_enabled: enabled,
                updated_at: Utc::now(),
            })
            .await
    }

    /// Interpreta um comando de voz livre. Frases de ligar/desligar RFID
    /// passam pela MESMA gravação persistida do PATCH; o resto é devolvido
    /// como não reconhecido.
    pub async fn voice_command(
        &self,
        tenant_id: Uuid,
        raw_command: &str,
    ) -> Result<VoiceOutcome, AppError> {
        let normalized = normalize(raw_command);

        if let Some(enabled) = rfid_intent(&normalized) {
            let settings = self.set_rfid_mode(tenant_id, enabled).await?;
            let message = if enabled {
                "Modo RFID ativado por voz."
            } else {
                "Modo RFID desativado por voz."
            };
            return Ok(VoiceOutcome {
                message: message.to_string(),
                rfid_enabled: Some(settings.rfid_enabled),
                action: None,
                command: None,
            });
        }

        Ok(unrecognized(&normalized))
    }

    /// Superconjunto do comando de voz: além do RFID, frases de estoque e
    /// inventário viram uma dica de ação para o painel.
    pub async fn voice_to_action(
        &self,
        tenant_id: Uuid,
        raw_command: &str,
    ) -> Result<VoiceOutcome, AppError> {
        let normalized = normalize(raw_command);

        if rfid_intent(&normalized).is_some() {
            return self.voice_command(tenant_id, raw_command).await;
        }

        if OVERVIEW_PHRASES.iter().any(|p| normalized.contains(p)) {
            return Ok(VoiceOutcome {
                message: "Abrindo a visão geral do estoque.".to_string(),
                rfid_enabled: None,
                action: Some("dashboard.overview".to_string()),
                command: None,
            });
        }

        Ok(unrecognized(&normalized))
    }
}

fn normalize(raw: &str) -> String {
    raw.trim().to_lowercase()
}

fn rfid_intent(normalized: &str) -> Option<bool> {
    // "desativar" contém "ativar": a negação é testada primeiro.
    if DISABLE_PHRASES.iter().any(|p| normalized.contains(p)) {
        return Some(false);
    }
    if ENABLE_PHRASES.iter().any(|p| normalized.contains(p)) {
        return Some(true);
    }
    None
}

fn unrecognized(normalized: &str) -> VoiceOutcome {
    VoiceOutcome {
        message: "Comando não reconhecido.".to_string(),
        rfid_enabled: None,
        action: None,
        command: Some(normalized.to_string()),
    }
}
