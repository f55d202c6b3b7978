// src/models/inventory.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// --- 1. Status das entidades ---
// Soft-delete explícito: nenhuma leitura filtra por status implicitamente,
// o filtro é sempre um parâmetro da consulta (ver db::StatusFilter).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "entity_status", rename_all = "lowercase")] // Banco
#[serde(rename_all = "lowercase")] // JSON
pub enum EntityStatus {
    Active,
    Inactive,
}

// --- 2. Tipo de movimentação ---
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "movement_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MovementType {
    In,  // entrada: aumenta o estoque
    Out, // saída: diminui o estoque
}

impl MovementType {
    /// Delta com sinal que um movimento deste tipo aplica ao estoque.
    /// Calculado em i64 para que a soma nunca estoure antes da checagem.
    pub fn signed_delta(self, quantity: i32) -> i64 {
        match self {
            MovementType::In => i64::from(quantity),
            MovementType::Out => -i64::from(quantity),
        }
    }

    /// Tipo cujo delta desfaz o deste movimento (usado na reversão).
    pub fn inverse(self) -> MovementType {
        match self {
            MovementType::In => MovementType::Out,
            MovementType::Out => MovementType::In,
        }
    }
}

// --- 3. Categorias ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    #[schema(example = "550e8400-e29b-41d4-a716-446655440000")]
    pub id: Uuid,
    #[schema(ignore)] // vem do token, não da API pública
    pub tenant_id: Uuid,
    #[schema(example = "Bebidas")]
    pub name: String,
    pub description: Option<String>,
    pub status: EntityStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// --- 4. Produtos ---
// O `stock` só muda através do registro de movimentações; nenhuma outra
// escrita toca nesse campo.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[schema(example = "550e8400-e29b-41d4-a716-446655440001")]
    pub id: Uuid,
    #[schema(ignore)]
    pub tenant_id: Uuid,
    pub category_id: Option<Uuid>,
    #[schema(example = "Café em grãos 1kg")]
    pub name: String,
    pub description: Option<String>,
    #[schema(example = 59.90)]
    pub price: Decimal,
    #[schema(example = 10)]
    pub stock: i32,
    #[schema(example = 5)]
    pub min_stock: i32,
    pub barcode: Option<String>,
    pub status: EntityStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// --- 5. Movimentações (histórico imutável) ---
// Uma movimentação nunca é editada; a reversão apenas marca o registro
// como inativo e devolve o delta ao estoque.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Movement {
    #[schema(example = "550e8400-e29b-41d4-a716-446655440002")]
    pub id: Uuid,
    #[schema(ignore)]
    pub tenant_id: Uuid,
    pub product_id: Uuid,
    #[serde(rename = "type")]
    pub movement_type: MovementType,
    #[schema(example = 3)]
    pub quantity: i32,
    #[schema(example = "Reposição manual")]
    pub reason: Option<String>,
    pub status: EntityStatus,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delta_de_entrada_e_saida() {
        assert_eq!(MovementType::In.signed_delta(4), 4);
        assert_eq!(MovementType::Out.signed_delta(4), -4);
    }

    #[test]
    fn inverso_desfaz_o_delta() {
        for tipo in [MovementType::In, MovementType::Out] {
            assert_eq!(tipo.signed_delta(7) + tipo.inverse().signed_delta(7), 0);
        }
    }

    #[test]
    fn delta_nao_estoura_com_valores_maximos() {
        // i32::MAX cabe em i64 com folga; a soma candidata também.
        let delta = MovementType::Out.signed_delta(i32::MAX);
        assert_eq!(i64::from(i32::MAX) + delta, 0);
    }
}
