// src/db/store.rs

use async_trait::async_trait;
use uuid::Uuid;

use crate::common::error::AppError;
use crate::models::dashboard::ProductTrend;
use crate::models::inventory::{Category, EntityStatus, Movement, Product};
use crate::models::settings::TenantSettings;

/// Filtro de status explícito: quem consulta sempre declara se quer as
/// linhas ativas, as inativas ou todas. Não existe filtro implícito.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusFilter {
    Active,
    Inactive,
    Any,
}

impl StatusFilter {
    pub fn matches(self, status: EntityStatus) -> bool {
        match self {
            StatusFilter::Active => status == EntityStatus::Active,
            StatusFilter::Inactive => status == EntityStatus::Inactive,
            StatusFilter::Any => true,
        }
    }

    /// Forma usada nas queries SQL: `None` significa "sem filtro".
    pub fn as_status(self) -> Option<EntityStatus> {
        match self {
            StatusFilter::Active => Some(EntityStatus::Active),
            StatusFilter::Inactive => Some(EntityStatus::Inactive),
            StatusFilter::Any => None,
        }
    }
}

/// Escrita condicional de estoque (compare-and-swap): só aplica se o
/// estoque atual ainda for `expected_stock`. Uma corrida perdida vira
/// `AppError::Conflict`, nunca uma escrita cega.
#[derive(Debug, Clone, Copy)]
pub struct StockWrite {
    pub tenant_id: Uuid,
    pub product_id: Uuid,
    pub expected_stock: i32,
    pub new_stock: i32,
}

/// Interface de persistência do inventário.
///
/// Duas implementações: Postgres (produção) e memória (desenvolvimento e
/// testes). As duas honram o mesmo contrato de atomicidade: os pares de
/// escrita `commit_*` ou aplicam tudo ou não aplicam nada.
#[async_trait]
pub trait InventoryStore: Send + Sync {
    // --- Produtos ---

    async fn insert_product(&self, product: Product) -> Result<Product, AppError>;

    async fn find_product(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        filter: StatusFilter,
    ) -> Result<Option<Product>, AppError>;

    async fn list_products(
        &self,
        tenant_id: Uuid,
        filter: StatusFilter,
    ) -> Result<Vec<Product>, AppError>;

    /// Busca por substring (caso-insensitivo) em nome, descrição e código
    /// de barras. Termo vazio devolve a listagem completa.
    async fn search_products(
        &self,
        tenant_id: Uuid,
        term: &str,
        filter: StatusFilter,
    ) -> Result<Vec<Product>, AppError>;

    async fn list_products_by_category(
        &self,
        tenant_id: Uuid,
        category_id: Uuid,
        filter: StatusFilter,
    ) -> Result<Vec<Product>, AppError>;

    /// Produtos ativos com `stock <= min_stock`.
    async fn list_low_stock(&self, tenant_id: Uuid) -> Result<Vec<Product>, AppError>;

    /// Produtos ativos com `stock = 0`.
    async fn list_out_of_stock(&self, tenant_id: Uuid) -> Result<Vec<Product>, AppError>;

    /// Atualização permitida de cadastro: grava tudo MENOS o estoque. O
    /// estoque só muda pelos pares `commit_*`, senão uma leitura velha
    /// poderia sobrescrever uma movimentação concorrente.
    async fn update_product_details(&self, product: Product) -> Result<Option<Product>, AppError>;

    /// Muda o status de um produto que hoje casa com `from`. `None` quando
    /// nada casou (inexistente, fora do tenant ou status errado).
    async fn set_product_status(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        from: StatusFilter,
        to: EntityStatus,
    ) -> Result<Option<Product>, AppError>;

    // --- Categorias ---

    async fn insert_category(&self, category: Category) -> Result<Category, AppError>;

    async fn find_category(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        filter: StatusFilter,
    ) -> Result<Option<Category>, AppError>;

    async fn list_categories(
        &self,
        tenant_id: Uuid,
        filter: StatusFilter,
    ) -> Result<Vec<Category>, AppError>;

    async fn update_category_details(
        &self,
        category: Category,
    ) -> Result<Option<Category>, AppError>;

    async fn set_category_status(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        from: StatusFilter,
        to: EntityStatus,
    ) -> Result<Option<Category>, AppError>;

    // --- Movimentações ---

    async fn find_movement(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        filter: StatusFilter,
    ) -> Result<Option<Movement>, AppError>;

    /// Mais recentes primeiro.
    async fn list_movements(
        &self,
        tenant_id: Uuid,
        filter: StatusFilter,
    ) -> Result<Vec<Movement>, AppError>;

    async fn list_movements_by_product(
        &self,
        tenant_id: Uuid,
        product_id: Uuid,
        filter: StatusFilter,
    ) -> Result<Vec<Movement>, AppError>;

    /// Par atômico da aplicação de movimento: CAS no estoque + inserção da
    /// movimentação, na mesma transação. `Err(Conflict)` se o estoque já
    /// não era o esperado.
    async fn commit_stock_change(
        &self,
        write: StockWrite,
        movement: Movement,
    ) -> Result<(Product, Movement), AppError>;

    /// Par atômico da reversão: CAS no estoque + anulação (ativa →
    /// inativa) da movimentação, na mesma transação. `Err(Conflict)` se o
    /// estoque mudou ou se outra requisição anulou a movimentação antes.
    async fn commit_reversal(
        &self,
        write: StockWrite,
        movement_id: Uuid,
    ) -> Result<(Product, Movement), AppError>;

    // --- Agregações (dashboard) ---

    async fn count_products(
        &self,
        tenant_id: Uuid,
        filter: StatusFilter,
    ) -> Result<i64, AppError>;

    async fn count_categories(
        &self,
        tenant_id: Uuid,
        filter: StatusFilter,
    ) -> Result<i64, AppError>;

    /// Soma do estoque dos produtos ativos.
    async fn total_stock(&self, tenant_id: Uuid) -> Result<i64, AppError>;

    async fn recent_movements(
        &self,
        tenant_id: Uuid,
        filter: StatusFilter,
        limit: i64,
    ) -> Result<Vec<Movement>, AppError>;

    /// Produtos ativos com `stock < min_stock`, do mais crítico para o
    /// menos (estoque ascendente).
    async fn list_stock_alerts(&self, tenant_id: Uuid) -> Result<Vec<Product>, AppError>;

    /// Produtos ativos mais movimentados (soma das quantidades), maiores
    /// primeiro.
    async fn movement_trends(
        &self,
        tenant_id: Uuid,
        limit: i64,
    ) -> Result<Vec<ProductTrend>, AppError>;

    // --- Configuração por tenant ---

    async fn get_settings(&self, tenant_id: Uuid) -> Result<Option<TenantSettings>, AppError>;

    async fn upsert_settings(
        &self,
        settings: TenantSettings,
    ) -> Result<TenantSettings, AppError>;
}
