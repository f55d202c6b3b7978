// src/services/categories.rs

use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use crate::common::error::{AppError, CATEGORY_NOT_FOUND};
use crate::db::{InventoryStore, StatusFilter};
use crate::models::inventory::{Category, EntityStatus};

#[derive(Clone)]
pub struct CategoriesService {
    store: Arc<dyn InventoryStore>,
}

impl CategoriesService {
    pub fn new(store: Arc<dyn InventoryStore>) -> Self {
        Self { store }
    }

    pub async fn create_category(
        &self,
        tenant_id: Uuid,
        name: String,
        description: Option<String>,
    ) -> Result<Category, AppError> {
        let now = Utc::now();
        let category = Category {
            id: Uuid::new_v4(),
            tenant_id,
            name,
            description,
            status: EntityStatus::Active,
            created_at: now,
            updated_at: now,
        };

        self.store.insert_category(category).await
    }

    pub async fn list_categories(&self, tenant_id: Uuid) -> Result<Vec<Category>, AppError> {
        self.store.list_categories(tenant_id, StatusFilter::Active).await
    }

    pub async fn get_category(
        &self,
        tenant_id: Uuid,
        category_id: Uuid,
    ) -> Result<Category, AppError> {
        self.store
            .find_category(tenant_id, category_id, StatusFilter::Active)
            .await?
            .ok_or(AppError::NotFound(CATEGORY_NOT_FOUND))
    }

    pub async fn update_category(
        &self,
        tenant_id: Uuid,
        category_id: Uuid,
        name: Option<String>,
        description: Option<String>,
    ) -> Result<Category, AppError> {
        let mut category = self.get_category(tenant_id, category_id).await?;

        if let Some(name) = name {
            category.name = name;
        }
        if let Some(description) = description {
            category.description = Some(description);
        }

        self.store
            .update_category_details(category)
            .await?
            .ok_or(AppError::NotFound(CATEGORY_NOT_FOUND))
    }

    /// Desativação é suave: produtos que apontam para a categoria mantêm o
    /// vínculo.
    pub async fn deactivate_category(
        &self,
        tenant_id: Uuid,
        category_id: Uuid,
    ) -> Result<Category, AppError> {
        self.store
            .set_category_status(
                tenant_id,
                category_id,
                StatusFilter::Active,
                EntityStatus::Inactive,
            )
            .await?
            .ok_or(AppError::NotFound(CATEGORY_NOT_FOUND))
    }
}
