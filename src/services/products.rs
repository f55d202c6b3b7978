// src/services/products.rs

use chrono::Utc;
use rust_decimal::Decimal;
use std::sync::Arc;
use uuid::Uuid;

use crate::common::error::{AppError, CATEGORY_NOT_FOUND, PRODUCT_NOT_FOUND};
use crate::db::{InventoryStore, StatusFilter};
use crate::models::inventory::{EntityStatus, Product};

/// Alterações permitidas num produto existente. Campo `None` = intocado;
/// `category_id` aceita `Some(None)` para limpar o vínculo. Estoque fica de
/// fora de propósito: só o razão mexe nele.
#[derive(Debug, Default, Clone)]
pub struct ProductChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub min_stock: Option<i32>,
    pub barcode: Option<String>,
    pub category_id: Option<Option<Uuid>>,
}

#[derive(Clone)]
pub struct ProductsService {
    store: Arc<dyn InventoryStore>,
}

impl ProductsService {
    pub fn new(store: Arc<dyn InventoryStore>) -> Self {
        Self { store }
    }

    // Categoria informada precisa existir ativa no MESMO tenant.
    async fn ensure_category(&self, tenant_id: Uuid, category_id: Uuid) -> Result<(), AppError> {
        self.store
            .find_category(tenant_id, category_id, StatusFilter::Active)
            .await?
            .ok_or(AppError::NotFound(CATEGORY_NOT_FOUND))?;
        Ok(())
    }

    // --- CREATE ---
    #[allow(clippy::too_many_arguments)]
    pub async fn create_product(
        &self,
        tenant_id: Uuid,
        name: String,
        description: Option<String>,
        price: Decimal,
        stock: i32,
        min_stock: i32,
        barcode: Option<String>,
        category_id: Option<Uuid>,
    ) -> Result<Product, AppError> {
        if let Some(cid) = category_id {
            self.ensure_category(tenant_id, cid).await?;
        }

        let now = Utc::now();
        let product = Product {
            id: Uuid::new_v4(),
            tenant_id,
            category_id,
            name,
            description,
            price,
            stock,
            min_stock,
            barcode,
            status: EntityStatus::Active,
            created_at: now,
            updated_at: now,
        };

        self.store.insert_product(product).await
    }

    // --- READ ---

    pub async fn list_products(&self, tenant_id: Uuid) -> Result<Vec<Product>, AppError> {
        self.store.list_products(tenant_id, StatusFilter::Active).await
    }

    pub async fn get_product(&self, tenant_id: Uuid, product_id: Uuid) -> Result<Product, AppError> {
        self.store
            .find_product(tenant_id, product_id, StatusFilter::Active)
            .await?
            .ok_or(AppError::NotFound(PRODUCT_NOT_FOUND))
    }

    /// Busca por substring (nome, descrição ou código de barras); termo
    /// vazio devolve a lista completa.
    pub async fn search_products(
        &self,
        tenant_id: Uuid,
        term: &str,
    ) -> Result<Vec<Product>, AppError> {
        self.store
            .search_products(tenant_id, term.trim(), StatusFilter::Active)
            .await
    }

    pub async fn list_low_stock(&self, tenant_id: Uuid) -> Result<Vec<Product>, AppError> {
        self.store.list_low_stock(tenant_id).await
    }

    pub async fn list_out_of_stock(&self, tenant_id: Uuid) -> Result<Vec<Product>, AppError> {
        self.store.list_out_of_stock(tenant_id).await
    }

    pub async fn list_by_category(
        &self,
        tenant_id: Uuid,
        category_id: Uuid,
    ) -> Result<Vec<Product>, AppError> {
        self.ensure_category(tenant_id, category_id).await?;
        self.store
            .list_products_by_category(tenant_id, category_id, StatusFilter::Active)
            .await
    }

    // --- UPDATE (lista fechada de campos) ---

    pub async fn update_product(
        &self,
        tenant_id: Uuid,
        product_id: Uuid,
        changes: ProductChanges,
    ) -> Result<Product, AppError> {
        let mut product = self.get_product(tenant_id, product_id).await?;

        if let Some(category_id) = changes.category_id {
            if let Some(cid) = category_id {
                self.ensure_category(tenant_id, cid).await?;
            }
            product.category_id = category_id;
        }
        if let Some(name) = changes.name {
            product.name = name;
        }
        if let Some(description) = changes.description {
            product.description = Some(description);
        }
        if let Some(price) = changes.price {
            product.price = price;
        }
        if let Some(min_stock) = changes.min_stock {
            product.min_stock = min_stock;
        }
        if let Some(barcode) = changes.barcode {
            product.barcode = Some(barcode);
        }

        self.store
            .update_product_details(product)
            .await?
            .ok_or(AppError::NotFound(PRODUCT_NOT_FOUND))
    }

    // --- STATUS ---

    pub async fn deactivate_product(
        &self,
        tenant_id: Uuid,
        product_id: Uuid,
    ) -> Result<Product, AppError> {
        self.store
            .set_product_status(
                tenant_id,
                product_id,
                StatusFilter::Active,
                EntityStatus::Inactive,
            )
            .await?
            .ok_or(AppError::NotFound(PRODUCT_NOT_FOUND))
    }

    /// Reativa um produto em qualquer estado; reativar um ativo é no-op.
    pub async fn reactivate_product(
        &self,
        tenant_id: Uuid,
        product_id: Uuid,
    ) -> Result<Product, AppError> {
        self.store
            .set_product_status(tenant_id, product_id, StatusFilter::Any, EntityStatus::Active)
            .await?
            .ok_or(AppError::NotFound(PRODUCT_NOT_FOUND))
    }
}
