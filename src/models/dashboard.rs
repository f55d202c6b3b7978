// src/models/dashboard.rs

use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::inventory::Movement;

// 1. Visão geral (os cards do topo)
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardOverview {
    pub total_products: i64,   // Todos os produtos do tenant, ativos ou não
    pub active_products: i64,
    pub total_categories: i64, // Apenas categorias ativas
    pub total_stock: i64,      // Soma do estoque dos produtos ativos
    pub recent_movements: Vec<Movement>,
}

// 2. Tendências (produtos mais movimentados)
#[derive(Debug, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductTrend {
    pub product_id: Uuid,
    pub name: String,
    pub total_quantity: i64, // SUM em SQL devolve bigint
}
