use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// Taxonomia de erros do serviço, com `thiserror` para melhor ergonomia.
// Falhas de autenticação são sempre genéricas na resposta: o motivo real
// (assinatura, expiração, claim ausente) fica só no log.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Não autenticado")]
    Unauthenticated,

    #[error("Papel insuficiente para a operação")]
    Forbidden,

    // A mensagem carregada é segura para exibir: "fora do tenant" e
    // "não existe" são indistinguíveis de propósito.
    #[error("{0}")]
    NotFound(&'static str),

    // Quantidade inválida, estoque insuficiente, conflito de reversão.
    #[error("{0}")]
    InvalidOperation(&'static str),

    // Corrida de atualização que sobreviveu às novas tentativas.
    #[error("Conflito de concorrência")]
    Conflict,

    // Variante para erros de banco de dados (sqlx)
    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            // Retorna todos os detalhes da validação, campo a campo.
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors.iter()
                        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                let body = Json(json!({
                    "error": "Um ou mais campos são inválidos.",
                    "details": details,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            AppError::Unauthenticated => {
                (StatusCode::UNAUTHORIZED, "Token de autenticação inválido ou ausente.")
            }
            AppError::Forbidden => (StatusCode::FORBIDDEN, "Ação não permitida."),
            AppError::NotFound(message) => (StatusCode::NOT_FOUND, message),
            AppError::InvalidOperation(message) => (StatusCode::BAD_REQUEST, message),
            AppError::Conflict => {
                (StatusCode::CONFLICT, "Operação conflitou com outra em andamento. Tente novamente.")
            }

            // Todos os outros erros (DatabaseError, InternalServerError) viram 500.
            // O `tracing` loga a mensagem detalhada; o cliente recebe só o genérico.
            ref e => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Ocorreu um erro inesperado.")
            }
        };

        // Resposta padrão para erros que só têm uma mensagem.
        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}

// Mensagens compartilhadas entre serviços e testes.
pub const PRODUCT_NOT_FOUND: &str = "Produto não encontrado.";
pub const CATEGORY_NOT_FOUND: &str = "Categoria não encontrada.";
pub const MOVEMENT_NOT_FOUND: &str = "Movimentação não encontrada.";
pub const INVALID_QUANTITY: &str = "Quantidade inválida.";
pub const INSUFFICIENT_STOCK: &str = "Estoque insuficiente.";
pub const REVERSAL_CONFLICT: &str = "A reversão deixaria o estoque negativo.";
