// src/db/memory.rs

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

use crate::common::error::AppError;
use crate::db::store::{InventoryStore, StatusFilter, StockWrite};
use crate::models::dashboard::ProductTrend;
use crate::models::inventory::{Category, EntityStatus, Movement, Product};
use crate::models::settings::TenantSettings;

#[derive(Default)]
struct Inner {
    products: HashMap<Uuid, Product>,
    categories: HashMap<Uuid, Category>,
    movements: HashMap<Uuid, Movement>,
    settings: HashMap<Uuid, TenantSettings>,
}

/// Implementação em memória do `InventoryStore`.
///
/// Feita para desenvolvimento e testes; não otimizada. Um único mutex
/// cobre todo o estado, então os pares `commit_*` são atômicos por
/// construção e as corridas de CAS se resolvem exatamente como no
/// Postgres: pela comparação com o valor esperado.
#[derive(Default)]
pub struct InMemoryInventoryStore {
    inner: Mutex<Inner>,
}

impl InMemoryInventoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>, AppError> {
        self.inner
            .lock()
            .map_err(|_| anyhow::anyhow!("mutex do store em memória envenenado").into())
    }
}

// Mais recentes primeiro, como a listagem de movimentações exige.
fn sort_newest_first(movements: &mut [Movement]) {
    movements.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}

#[async_trait]
impl InventoryStore for InMemoryInventoryStore {
    // --- Produtos ---

    async fn insert_product(&self, product: Product) -> Result<Product, AppError> {
        let mut inner = self.lock()?;
        inner.products.insert(product.id, product.clone());
        Ok(product)
    }

    async fn find_product(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        filter: StatusFilter,
    ) -> Result<Option<Product>, AppError> {
        let inner = self.lock()?;
        Ok(inner
            .products
            .get(&id)
            .filter(|p| p.tenant_id == tenant_id && filter.matches(p.status))
            .cloned())
    }

    async fn list_products(
        &self,
        tenant_id: Uuid,
        filter: StatusFilter,
    ) -> Result<Vec<Product>, AppError> {
        let inner = self.lock()?;
        let mut products: Vec<Product> = inner
            .products
            .values()
            .filter(|p| p.tenant_id == tenant_id && filter.matches(p.status))
            .cloned()
            .collect();
        products.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(products)
    }

    async fn search_products(
        &self,
        tenant_id: Uuid,
        term: &str,
        filter: StatusFilter,
    ) -> Result<Vec<Product>, AppError> {
        let needle = term.trim().to_lowercase();
        let mut products = self.list_products(tenant_id, filter).await?;
        if needle.is_empty() {
            return Ok(products);
        }

        products.retain(|p| {
            p.name.to_lowercase().contains(&needle)
                || p.description
                    .as_deref()
                    .is_some_and(|d| d.to_lowercase().contains(&needle))
                || p.barcode
                    .as_deref()
                    .is_some_and(|b| b.to_lowercase().contains(&needle))
        });
        Ok(products)
    }

    async fn list_products_by_category(
        &self,
        tenant_id: Uuid,
        category_id: Uuid,
        filter: StatusFilter,
    ) -> Result<Vec<Product>, AppError> {
        let mut products = self.list_products(tenant_id, filter).await?;
        products.retain(|p| p.category_id == Some(category_id));
        Ok(products)
    }

    async fn list_low_stock(&self, tenant_id: Uuid) -> Result<Vec<Product>, AppError> {
        let mut products = self.list_products(tenant_id, StatusFilter::Active).await?;
        products.retain(|p| p.stock <= p.min_stock);
        Ok(products)
    }

    async fn list_out_of_stock(&self, tenant_id: Uuid) -> Result<Vec<Product>, AppError> {
        let mut products = self.list_products(tenant_id, StatusFilter::Active).await?;
        products.retain(|p| p.stock == 0);
        Ok(products)
    }

    async fn update_product_details(&self, product: Product) -> Result<Option<Product>, AppError> {
        let mut inner = self.lock()?;
        let Some(existing) = inner
            .products
            .get_mut(&product.id)
            .filter(|p| p.tenant_id == product.tenant_id)
        else {
            return Ok(None);
        };

        // Tudo menos o estoque: `stock` só muda pelos pares commit_*.
        existing.category_id = product.category_id;
        existing.name = product.name;
        existing.description = product.description;
        existing.price = product.price;
        existing.min_stock = product.min_stock;
        existing.barcode = product.barcode;
        existing.status = product.status;
        existing.updated_at = Utc::now();
        Ok(Some(existing.clone()))
    }

    async fn set_product_status(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        from: StatusFilter,
        to: EntityStatus,
    ) -> Result<Option<Product>, AppError> {
        let mut inner = self.lock()?;
        let Some(product) = inner
            .products
            .get_mut(&id)
            .filter(|p| p.tenant_id == tenant_id && from.matches(p.status))
        else {
            return Ok(None);
        };

        product.status = to;
        product.updated_at = Utc::now();
        Ok(Some(product.clone()))
    }

    // --- Categorias ---

    async fn insert_category(&self, category: Category) -> Result<Category, AppError> {
        let mut inner = self.lock()?;
        inner.categories.insert(category.id, category.clone());
        Ok(category)
    }

    async fn find_category(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        filter: StatusFilter,
    ) -> Result<Option<Category>, AppError> {
        let inner = self.lock()?;
        Ok(inner
            .categories
            .get(&id)
            .filter(|c| c.tenant_id == tenant_id && filter.matches(c.status))
            .cloned())
    }

    async fn list_categories(
        &self,
        tenant_id: Uuid,
        filter: StatusFilter,
    ) -> Result<Vec<Category>, AppError> {
        let inner = self.lock()?;
        let mut categories: Vec<Category> = inner
            .categories
            .values()
            .filter(|c| c.tenant_id == tenant_id && filter.matches(c.status))
            .cloned()
            .collect();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }

    async fn update_category_details(
        &self,
        category: Category,
    ) -> Result<Option<Category>, AppError> {
        let mut inner = self.lock()?;
        let Some(existing) = inner
            .categories
            .get_mut(&category.id)
            .filter(|c| c.tenant_id == category.tenant_id)
        else {
            return Ok(None);
        };

        existing.name = category.name;
        existing.description = category.description;
        existing.status = category.status;
        existing.updated_at = Utc::now();
        Ok(Some(existing.clone()))
    }

    async fn set_category_status(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        from: StatusFilter,
        to: EntityStatus,
    ) -> Result<Option<Category>, AppError> {
        let mut inner = self.lock()?;
        let Some(category) = inner
            .categories
            .get_mut(&id)
            .filter(|c| c.tenant_id == tenant_id && from.matches(c.status))
        else {
            return Ok(None);
        };

        category.status = to;
        category.updated_at = Utc::now();
        Ok(Some(category.clone()))
    }

    // --- Movimentações ---

    async fn find_movement(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        filter: StatusFilter,
    ) -> Result<Option<Movement>, AppError> {
        let inner = self.lock()?;
        Ok(inner
            .movements
            .get(&id)
            .filter(|m| m.tenant_id == tenant_id && filter.matches(m.status))
            .cloned())
    }

    async fn list_movements(
        &self,
        tenant_id: Uuid,
        filter: StatusFilter,
    ) -> Result<Vec<Movement>, AppError> {
        let inner = self.lock()?;
        let mut movements: Vec<Movement> = inner
            .movements
            .values()
            .filter(|m| m.tenant_id == tenant_id && filter.matches(m.status))
            .cloned()
            .collect();
        sort_newest_first(&mut movements);
        Ok(movements)
    }

    async fn list_movements_by_product(
        &self,
        tenant_id: Uuid,
        product_id: Uuid,
        filter: StatusFilter,
    ) -> Result<Vec<Movement>, AppError> {
        let mut movements = self.list_movements(tenant_id, filter).await?;
        movements.retain(|m| m.product_id == product_id);
        Ok(movements)
    }

    async fn commit_stock_change(
        &self,
        write: StockWrite,
        movement: Movement,
    ) -> Result<(Product, Movement), AppError> {
        let mut inner = self.lock()?;

        // CAS: o produto ainda precisa estar ativo e com o estoque lido.
        let Some(product) = inner.products.get_mut(&write.product_id).filter(|p| {
            p.tenant_id == write.tenant_id
                && p.status == EntityStatus::Active
                && p.stock == write.expected_stock
        }) else {
            return Err(AppError::Conflict);
        };

        product.stock = write.new_stock;
        product.updated_at = Utc::now();
        let updated = product.clone();

        inner.movements.insert(movement.id, movement.clone());
        Ok((updated, movement))
    }

    async fn commit_reversal(
        &self,
        write: StockWrite,
        movement_id: Uuid,
    ) -> Result<(Product, Movement), AppError> {
        let mut inner = self.lock()?;

        // A anulação só vale sobre uma movimentação ainda ativa; se outra
        // requisição anulou antes, é conflito (e a releitura verá o sumiço).
        let movement_ok = inner
            .movements
            .get(&movement_id)
            .is_some_and(|m| m.tenant_id == write.tenant_id && m.status == EntityStatus::Active);
        if !movement_ok {
            return Err(AppError::Conflict);
        }

        // Produto pode estar inativo: desativação não congela o acerto de
        // estoque de uma reversão.
        let Some(product) = inner.products.get_mut(&write.product_id).filter(|p| {
            p.tenant_id == write.tenant_id && p.stock == write.expected_stock
        }) else {
            return Err(AppError::Conflict);
        };

        product.stock = write.new_stock;
        product.updated_at = Utc::now();
        let updated = product.clone();

        let Some(movement) = inner.movements.get_mut(&movement_id) else {
            return Err(AppError::Conflict);
        };
        movement.status = EntityStatus::Inactive;
        Ok((updated, movement.clone()))
    }

    // --- Agregações (dashboard) ---

    async fn count_products(
        &self,
        tenant_id: Uuid,
        filter: StatusFilter,
    ) -> Result<i64, AppError> {
        let inner = self.lock()?;
        Ok(inner
            .products
            .values()
            .filter(|p| p.tenant_id == tenant_id && filter.matches(p.status))
            .count() as i64)
    }

    async fn count_categories(
        &self,
        tenant_id: Uuid,
        filter: StatusFilter,
    ) -> Result<i64, AppError> {
        let inner = self.lock()?;
        Ok(inner
            .categories
            .values()
            .filter(|c| c.tenant_id == tenant_id && filter.matches(c.status))
            .count() as i64)
    }

    async fn total_stock(&self, tenant_id: Uuid) -> Result<i64, AppError> {
        let inner = self.lock()?;
        Ok(inner
            .products
            .values()
            .filter(|p| p.tenant_id == tenant_id && p.status == EntityStatus::Active)
            .map(|p| i64::from(p.stock))
            .sum())
    }

    async fn recent_movements(
        &self,
        tenant_id: Uuid,
        filter: StatusFilter,
        limit: i64,
    ) -> Result<Vec<Movement>, AppError> {
        let mut movements = self.list_movements(tenant_id, filter).await?;
        movements.truncate(limit.max(0) as usize);
        Ok(movements)
    }

    async fn list_stock_alerts(&self, tenant_id: Uuid) -> Result<Vec<Product>, AppError> {
        let mut products = self.list_products(tenant_id, StatusFilter::Active).await?;
        products.retain(|p| p.stock < p.min_stock);
        products.sort_by_key(|p| p.stock);
        Ok(products)
    }

    async fn movement_trends(
        &self,
        tenant_id: Uuid,
        limit: i64,
    ) -> Result<Vec<ProductTrend>, AppError> {
        let inner = self.lock()?;

        // Soma as movimentações ativas de produtos ativos do tenant, como
        // a consulta SQL equivalente.
        let mut totals: HashMap<Uuid, i64> = HashMap::new();
        for movement in inner.movements.values() {
            if movement.tenant_id != tenant_id || movement.status != EntityStatus::Active {
                continue;
            }
            let product_active = inner
                .products
                .get(&movement.product_id)
                .is_some_and(|p| p.status == EntityStatus::Active);
            if product_active {
                *totals.entry(movement.product_id).or_insert(0) += i64::from(movement.quantity);
            }
        }

        let mut trends: Vec<ProductTrend> = totals
            .into_iter()
            .filter_map(|(product_id, total_quantity)| {
                inner.products.get(&product_id).map(|p| ProductTrend {
                    product_id,
                    name: p.name.clone(),
                    total_quantity,
                })
            })
            .collect();
        trends.sort_by(|a, b| b.total_quantity.cmp(&a.total_quantity));
        trends.truncate(limit.max(0) as usize);
        Ok(trends)
    }

    // --- Configuração por tenant ---

    async fn get_settings(&self, tenant_id: Uuid) -> Result<Option<TenantSettings>, AppError> {
        let inner = self.lock()?;
        Ok(inner.settings.get(&tenant_id).cloned())
    }

    async fn upsert_settings(
        &self,
        settings: TenantSettings,
    ) -> Result<TenantSettings, AppError> {
        let mut inner = self.lock()?;
        inner.settings.insert(settings.tenant_id, settings.clone());
        Ok(settings)
    }
}
