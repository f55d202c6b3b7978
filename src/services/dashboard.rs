// src/services/dashboard.rs

use std::sync::Arc;
use uuid::Uuid;

use crate::common::error::AppError;
use crate::db::{InventoryStore, StatusFilter};
use crate::models::dashboard::{DashboardOverview, ProductTrend};
use crate::models::inventory::Product;

const RECENT_MOVEMENTS: i64 = 5;
const TREND_PRODUCTS: i64 = 5;

#[derive(Clone)]
pub struct DashboardService {
    store: Arc<dyn InventoryStore>,
}

impl DashboardService {
    pub fn new(store: Arc<dyn InventoryStore>) -> Self {
        Self { store }
    }

    /// Visão geral do tenant: contagens, estoque somado (produtos ativos) e
    /// as cinco movimentações mais recentes, anuladas incluídas.
    pub async fn get_overview(&self, tenant_id: Uuid) -> Result<DashboardOverview, AppError> {
        let total_products = self.store.count_products(tenant_id, StatusFilter::Any).await?;
        let active_products = self
            .store
            .count_products(tenant_id, StatusFilter::Active)
            .await?;
        let total_categories = self
            .store
            .count_categories(tenant_id, StatusFilter::Active)
            .await?;
        let total_stock = self.store.total_stock(tenant_id).await?;
        let recent_movements = self
            .store
            .recent_movements(tenant_id, StatusFilter::Any, RECENT_MOVEMENTS)
            .await?;

        Ok(DashboardOverview {
            total_products,
            active_products,
            total_categories,
            total_stock,
            recent_movements,
        })
    }

    /// Produtos ativos com `stock < min_stock`, do mais crítico para o
    /// menos.
    pub async fn get_alerts(&self, tenant_id: Uuid) -> Result<Vec<Product>, AppError> {
        self.store.list_stock_alerts(tenant_id).await
    }

    /// Cinco produtos ativos com mais quantidade movimentada (razão ativo).
    pub async fn get_trends(&self, tenant_id: Uuid) -> Result<Vec<ProductTrend>, AppError> {
        self.store.movement_trends(tenant_id, TREND_PRODUCTS).await
    }
}
