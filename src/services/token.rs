// src/services/token.rs

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, TimeZone, Utc};
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;
use std::str::FromStr;
use uuid::Uuid;

use crate::models::auth::{Claims, Role, TenantIdentity};

type HmacSha256 = Hmac<Sha256>;

/// Motivo interno da rejeição de um token. Nunca chega ao cliente: o
/// middleware converte qualquer variante em `AppError::Unauthenticated` e
/// registra o motivo apenas no log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TokenRejection {
    #[error("token malformado")]
    Malformed,
    #[error("algoritmo não permitido")]
    BadAlgorithm,
    #[error("assinatura inválida")]
    BadSignature,
    #[error("token expirado")]
    Expired,
    #[error("claims inválidas")]
    BadClaims,
    #[error("segredo de assinatura ausente")]
    MissingSecret,
}

// Só o `alg` importa; os demais campos do cabeçalho são ignorados.
#[derive(Debug, Deserialize)]
struct TokenHeader {
    #[serde(default)]
    alg: Option<String>,
}

/// Verificador do credencial compacto `header.payload.assinatura`.
///
/// A verificação é uma função pura de (token, segredo, instante atual):
/// não consulta banco, não guarda estado e nunca suspende.
#[derive(Clone)]
pub struct TokenVerifier {
    secret: String,
}

impl TokenVerifier {
    pub fn new(secret: impl Into<String>) -> Self {
        Self { secret: secret.into() }
    }

    pub fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<TenantIdentity, TokenRejection> {
        // Sem segredo configurado o verificador falha fechado: nenhum
        // token é aceito, assinado ou não.
        if self.secret.is_empty() {
            return Err(TokenRejection::MissingSecret);
        }

        // 1. Exatamente três segmentos separados por ponto.
        let mut segments = token.split('.');
        let (header_b64, payload_b64, signature_b64) =
            match (segments.next(), segments.next(), segments.next(), segments.next()) {
                (Some(h), Some(p), Some(s), None) => (h, p, s),
                _ => return Err(TokenRejection::Malformed),
            };

        // 2. O cabeçalho precisa declarar HS256. Qualquer outro valor
        //    (inclusive "none") é rejeitado antes de olhar a assinatura,
        //    fechando a troca de algoritmo.
        let header_bytes = URL_SAFE_NO_PAD
            .decode(header_b64)
            .map_err(|_| TokenRejection::Malformed)?;
        let header: TokenHeader =
            serde_json::from_slice(&header_bytes).map_err(|_| TokenRejection::Malformed)?;
        if header.alg.as_deref() != Some("HS256") {
            return Err(TokenRejection::BadAlgorithm);
        }

        // 3. HMAC-SHA256 sobre os bytes exatos `header.payload`. A
        //    comparação é de tempo constante (verify_slice); assinatura de
        //    tamanho errado é apenas mais uma assinatura inválida.
        let signature = URL_SAFE_NO_PAD
            .decode(signature_b64)
            .map_err(|_| TokenRejection::BadSignature)?;
        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes())
            .map_err(|_| TokenRejection::MissingSecret)?;
        mac.update(header_b64.as_bytes());
        mac.update(b".");
        mac.update(payload_b64.as_bytes());
        if mac.verify_slice(&signature).is_err() {
            return Err(TokenRejection::BadSignature);
        }

        // 4. Claims, nesta ordem: payload decodifica para um mapa;
        //    expiração; sujeito; papel; tenant.
        let payload_bytes = URL_SAFE_NO_PAD
            .decode(payload_b64)
            .map_err(|_| TokenRejection::Malformed)?;
        let claims: Claims =
            serde_json::from_slice(&payload_bytes).map_err(|_| TokenRejection::BadClaims)?;

        let expires_at = match claims.exp {
            Some(exp) => {
                if exp <= now.timestamp() {
                    return Err(TokenRejection::Expired);
                }
                Some(
                    Utc.timestamp_opt(exp, 0)
                        .single()
                        .ok_or(TokenRejection::BadClaims)?,
                )
            }
            None => None,
        };

        let subject = claims
            .user_id
            .filter(|s| !s.is_empty())
            .ok_or(TokenRejection::BadClaims)?;

        let role = claims
            .role
            .as_deref()
            .and_then(|r| Role::from_str(r).ok())
            .ok_or(TokenRejection::BadClaims)?;

        let tenant_id = claims
            .company_id
            .filter(|s| !s.is_empty())
            .and_then(|s| Uuid::parse_str(&s).ok())
            .ok_or(TokenRejection::BadClaims)?;

        Ok(TenantIdentity { subject, role, tenant_id, expires_at })
    }
}

/// Assina um conjunto de claims no formato compacto de três segmentos.
///
/// O serviço nunca emite tokens em produção (isso é papel do serviço de
/// autenticação upstream); este helper existe para o binário `mint-token`
/// e para os testes.
pub fn sign_token(claims: &Claims, secret: &str) -> anyhow::Result<String> {
    let header = serde_json::json!({ "alg": "HS256", "typ": "JWT" });
    let header_b64 = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&header)?);
    let payload_b64 = URL_SAFE_NO_PAD.encode(serde_json::to_vec(claims)?);

    let signing_input = format!("{header_b64}.{payload_b64}");
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| anyhow::anyhow!("chave HMAC inválida: {e}"))?;
    mac.update(signing_input.as_bytes());
    let signature_b64 = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

    Ok(format!("{signing_input}.{signature_b64}"))
}
