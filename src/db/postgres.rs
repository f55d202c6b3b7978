// src/db/postgres.rs

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::common::error::AppError;
use crate::db::store::{InventoryStore, StatusFilter, StockWrite};
use crate::models::dashboard::ProductTrend;
use crate::models::inventory::{Category, EntityStatus, Movement, Product};
use crate::models::settings::TenantSettings;

/// Implementação Postgres do `InventoryStore`.
///
/// As escritas condicionais usam `UPDATE ... WHERE stock = $esperado`
/// com `RETURNING`: nenhuma linha de volta significa corrida perdida
/// (`Conflict`). Os pares `commit_*` rodam em uma transação; o rollback é
/// automático quando a transação é descartada sem commit.
#[derive(Clone)]
pub struct PostgresInventoryStore {
    pool: PgPool,
}

impl PostgresInventoryStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl InventoryStore for PostgresInventoryStore {
    // --- Produtos ---

    async fn insert_product(&self, product: Product) -> Result<Product, AppError> {
        let created = sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO products
                (id, tenant_id, category_id, name, description, price, stock,
                 min_stock, barcode, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING *
            "#,
        )
        .bind(product.id)
        .bind(product.tenant_id)
        .bind(product.category_id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price)
        .bind(product.stock)
        .bind(product.min_stock)
        .bind(&product.barcode)
        .bind(product.status)
        .bind(product.created_at)
        .bind(product.updated_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    async fn find_product(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        filter: StatusFilter,
    ) -> Result<Option<Product>, AppError> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            SELECT * FROM products
            WHERE id = $1 AND tenant_id = $2
              AND ($3::entity_status IS NULL OR status = $3)
            "#,
        )
        .bind(id)
        .bind(tenant_id)
        .bind(filter.as_status())
        .fetch_optional(&self.pool)
        .await?;
        Ok(product)
    }

    async fn list_products(
        &self,
        tenant_id: Uuid,
        filter: StatusFilter,
    ) -> Result<Vec<Product>, AppError> {
        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT * FROM products
            WHERE tenant_id = $1
              AND ($2::entity_status IS NULL OR status = $2)
            ORDER BY name ASC
            "#,
        )
        .bind(tenant_id)
        .bind(filter.as_status())
        .fetch_all(&self.pool)
        .await?;
        Ok(products)
    }

    async fn search_products(
        &self,
        tenant_id: Uuid,
        term: &str,
        filter: StatusFilter,
    ) -> Result<Vec<Product>, AppError> {
        let needle = term.trim();
        let pattern = format!("%{}%", needle);
        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT * FROM products
            WHERE tenant_id = $1
              AND ($2::entity_status IS NULL OR status = $2)
              AND ($3 = ''
                   OR name ILIKE $4
                   OR description ILIKE $4
                   OR barcode ILIKE $4)
            ORDER BY name ASC
            "#,
        )
        .bind(tenant_id)
        .bind(filter.as_status())
        .bind(needle)
        .bind(pattern)
        .fetch_all(&self.pool)
        .await?;
        Ok(products)
    }

    async fn list_products_by_category(
        &self,
        tenant_id: Uuid,
        category_id: Uuid,
        filter: StatusFilter,
    ) -> Result<Vec<Product>, AppError> {
        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT * FROM products
            WHERE tenant_id = $1 AND category_id = $2
              AND ($3::entity_status IS NULL OR status = $3)
            ORDER BY name ASC
            "#,
        )
        .bind(tenant_id)
        .bind(category_id)
        .bind(filter.as_status())
        .fetch_all(&self.pool)
        .await?;
        Ok(products)
    }

    async fn list_low_stock(&self, tenant_id: Uuid) -> Result<Vec<Product>, AppError> {
        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT * FROM products
            WHERE tenant_id = $1 AND status = $2 AND stock <= min_stock
            ORDER BY name ASC
            "#,
        )
        .bind(tenant_id)
        .bind(EntityStatus::Active)
        .fetch_all(&self.pool)
        .await?;
        Ok(products)
    }

    async fn list_out_of_stock(&self, tenant_id: Uuid) -> Result<Vec<Product>, AppError> {
        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT * FROM products
            WHERE tenant_id = $1 AND status = $2 AND stock = 0
            ORDER BY name ASC
            "#,
        )
        .bind(tenant_id)
        .bind(EntityStatus::Active)
        .fetch_all(&self.pool)
        .await?;
        Ok(products)
    }

    async fn update_product_details(&self, product: Product) -> Result<Option<Product>, AppError> {
        // Tudo menos `stock`: o estoque só muda pelos pares commit_*.
        let updated = sqlx::query_as::<_, Product>(
            r#"
            UPDATE products
            SET category_id = $3, name = $4, description = $5, price = $6,
                min_stock = $7, barcode = $8, status = $9, updated_at = NOW()
            WHERE id = $1 AND tenant_id = $2
            RETURNING *
            "#,
        )
        .bind(product.id)
        .bind(product.tenant_id)
        .bind(product.category_id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price)
        .bind(product.min_stock)
        .bind(&product.barcode)
        .bind(product.status)
        .fetch_optional(&self.pool)
        .await?;
        Ok(updated)
    }

    async fn set_product_status(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        from: StatusFilter,
        to: EntityStatus,
    ) -> Result<Option<Product>, AppError> {
        let updated = sqlx::query_as::<_, Product>(
            r#"
            UPDATE products
            SET status = $3, updated_at = NOW()
            WHERE id = $1 AND tenant_id = $2
              AND ($4::entity_status IS NULL OR status = $4)
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(tenant_id)
        .bind(to)
        .bind(from.as_status())
        .fetch_optional(&self.pool)
        .await?;
        Ok(updated)
    }

    // --- Categorias ---

    async fn insert_category(&self, category: Category) -> Result<Category, AppError> {
        let created = sqlx::query_as::<_, Category>(
            r#"
            INSERT INTO categories
                (id, tenant_id, name, description, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(category.id)
        .bind(category.tenant_id)
        .bind(&category.name)
        .bind(&category.description)
        .bind(category.status)
        .bind(category.created_at)
        .bind(category.updated_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    async fn find_category(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        filter: StatusFilter,
    ) -> Result<Option<Category>, AppError> {
        let category = sqlx::query_as::<_, Category>(
            r#"
            SELECT * FROM categories
            WHERE id = $1 AND tenant_id = $2
              AND ($3::entity_status IS NULL OR status = $3)
            "#,
        )
        .bind(id)
        .bind(tenant_id)
        .bind(filter.as_status())
        .fetch_optional(&self.pool)
        .await?;
        Ok(category)
    }

    async fn list_categories(
        &self,
        tenant_id: Uuid,
        filter: StatusFilter,
    ) -> Result<Vec<Category>, AppError> {
        let categories = sqlx::query_as::<_, Category>(
            r#"
            SELECT * FROM categories
            WHERE tenant_id = $1
              AND ($2::entity_status IS NULL OR status = $2)
            ORDER BY name ASC
            "#,
        )
        .bind(tenant_id)
        .bind(filter.as_status())
        .fetch_all(&self.pool)
        .await?;
        Ok(categories)
    }

    async fn update_category_details(
        &self,
        category: Category,
    ) -> Result<Option<Category>, AppError> {
        let updated = sqlx::query_as::<_, Category>(
            r#"
            UPDATE categories
            SET name = $3, description = $4, status = $5, updated_at = NOW()
            WHERE id = $1 AND tenant_id = $2
            RETURNING *
            "#,
        )
        .bind(category.id)
        .bind(category.tenant_id)
        .bind(&category.name)
        .bind(&category.description)
        .bind(category.status)
        .fetch_optional(&self.pool)
        .await?;
        Ok(updated)
    }

    async fn set_category_status(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        from: StatusFilter,
        to: EntityStatus,
    ) -> Result<Option<Category>, AppError> {
        let updated = sqlx::query_as::<_, Category>(
            r#"
            UPDATE categories
            SET status = $3, updated_at = NOW()
            WHERE id = $1 AND tenant_id = $2
              AND ($4::entity_status IS NULL OR status = $4)
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(tenant_id)
        .bind(to)
        .bind(from.as_status())
        .fetch_optional(&self.pool)
        .await?;
        Ok(updated)
    }

    // --- Movimentações ---

    async fn find_movement(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        filter: StatusFilter,
    ) -> Result<Option<Movement>, AppError> {
        let movement = sqlx::query_as::<_, Movement>(
            r#"
            SELECT * FROM movements
            WHERE id = $1 AND tenant_id = $2
              AND ($3::entity_status IS NULL OR status = $3)
            "#,
        )
        .bind(id)
        .bind(tenant_id)
        .bind(filter.as_status())
        .fetch_optional(&self.pool)
        .await?;
        Ok(movement)
    }

    async fn list_movements(
        &self,
        tenant_id: Uuid,
        filter: StatusFilter,
    ) -> Result<Vec<Movement>, AppError> {
        let movements = sqlx::query_as::<_, Movement>(
            r#"
            SELECT * FROM movements
            WHERE tenant_id = $1
              AND ($2::entity_status IS NULL OR status = $2)
            ORDER BY created_at DESC
            "#,
        )
        .bind(tenant_id)
        .bind(filter.as_status())
        .fetch_all(&self.pool)
        .await?;
        Ok(movements)
    }

    async fn list_movements_by_product(
        &self,
        tenant_id: Uuid,
        product_id: Uuid,
        filter: StatusFilter,
    ) -> Result<Vec<Movement>, AppError> {
        let movements = sqlx::query_as::<_, Movement>(
            r#"
            SELECT * FROM movements
            WHERE tenant_id = $1 AND product_id = $2
              AND ($3::entity_status IS NULL OR status = $3)
            ORDER BY created_at DESC
            "#,
        )
        .bind(tenant_id)
        .bind(product_id)
        .bind(filter.as_status())
        .fetch_all(&self.pool)
        .await?;
        Ok(movements)
    }

    async fn commit_stock_change(
        &self,
        write: StockWrite,
        movement: Movement,
    ) -> Result<(Product, Movement), AppError> {
        // --- INÍCIO DA TRANSAÇÃO ---
        let mut tx = self.pool.begin().await?;

        // CAS: nenhuma linha de volta = corrida perdida (ou produto
        // desativado no meio do caminho). O drop da tx desfaz tudo.
        let Some(product) = sqlx::query_as::<_, Product>(
            r#"
            UPDATE products
            SET stock = $4, updated_at = NOW()
            WHERE id = $1 AND tenant_id = $2 AND stock = $3 AND status = $5
            RETURNING *
            "#,
        )
        .bind(write.product_id)
        .bind(write.tenant_id)
        .bind(write.expected_stock)
        .bind(write.new_stock)
        .bind(EntityStatus::Active)
        .fetch_optional(&mut *tx)
        .await?
        else {
            return Err(AppError::Conflict);
        };

        let created = sqlx::query_as::<_, Movement>(
            r#"
            INSERT INTO movements
                (id, tenant_id, product_id, movement_type, quantity, reason,
                 status, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(movement.id)
        .bind(movement.tenant_id)
        .bind(movement.product_id)
        .bind(movement.movement_type)
        .bind(movement.quantity)
        .bind(&movement.reason)
        .bind(movement.status)
        .bind(movement.created_at)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        // --- FIM DA TRANSAÇÃO ---
        Ok((product, created))
    }

    async fn commit_reversal(
        &self,
        write: StockWrite,
        movement_id: Uuid,
    ) -> Result<(Product, Movement), AppError> {
        let mut tx = self.pool.begin().await?;

        // Anula só se a movimentação ainda estiver ativa: duas reversões
        // concorrentes nunca acertam o estoque duas vezes.
        let Some(movement) = sqlx::query_as::<_, Movement>(
            r#"
            UPDATE movements
            SET status = $3
            WHERE id = $1 AND tenant_id = $2 AND status = $4
            RETURNING *
            "#,
        )
        .bind(movement_id)
        .bind(write.tenant_id)
        .bind(EntityStatus::Inactive)
        .bind(EntityStatus::Active)
        .fetch_optional(&mut *tx)
        .await?
        else {
            return Err(AppError::Conflict);
        };

        // Sem exigência de produto ativo: a desativação não congela o
        // acerto de estoque de uma reversão.
        let Some(product) = sqlx::query_as::<_, Product>(
            r#"
            UPDATE products
            SET stock = $4, updated_at = NOW()
            WHERE id = $1 AND tenant_id = $2 AND stock = $3
            RETURNING *
            "#,
        )
        .bind(write.product_id)
        .bind(write.tenant_id)
        .bind(write.expected_stock)
        .bind(write.new_stock)
        .fetch_optional(&mut *tx)
        .await?
        else {
            return Err(AppError::Conflict);
        };

        tx.commit().await?;
        Ok((product, movement))
    }

    // --- Agregações (dashboard) ---

    async fn count_products(
        &self,
        tenant_id: Uuid,
        filter: StatusFilter,
    ) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM products
            WHERE tenant_id = $1
              AND ($2::entity_status IS NULL OR status = $2)
            "#,
        )
        .bind(tenant_id)
        .bind(filter.as_status())
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    async fn count_categories(
        &self,
        tenant_id: Uuid,
        filter: StatusFilter,
    ) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM categories
            WHERE tenant_id = $1
              AND ($2::entity_status IS NULL OR status = $2)
            "#,
        )
        .bind(tenant_id)
        .bind(filter.as_status())
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    async fn total_stock(&self, tenant_id: Uuid) -> Result<i64, AppError> {
        let total = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COALESCE(SUM(stock), 0) FROM products
            WHERE tenant_id = $1 AND status = $2
            "#,
        )
        .bind(tenant_id)
        .bind(EntityStatus::Active)
        .fetch_one(&self.pool)
        .await?;
        Ok(total)
    }

    async fn recent_movements(
        &self,
        tenant_id: Uuid,
        filter: StatusFilter,
        limit: i64,
    ) -> Result<Vec<Movement>, AppError> {
        let movements = sqlx::query_as::<_, Movement>(
            r#"
            SELECT * FROM movements
            WHERE tenant_id = $1
              AND ($2::entity_status IS NULL OR status = $2)
            ORDER BY created_at DESC
            LIMIT $3
            "#,
        )
        .bind(tenant_id)
        .bind(filter.as_status())
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(movements)
    }

    async fn list_stock_alerts(&self, tenant_id: Uuid) -> Result<Vec<Product>, AppError> {
        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT * FROM products
            WHERE tenant_id = $1 AND status = $2 AND stock < min_stock
            ORDER BY stock ASC
            "#,
        )
        .bind(tenant_id)
        .bind(EntityStatus::Active)
        .fetch_all(&self.pool)
        .await?;
        Ok(products)
    }

    async fn movement_trends(
        &self,
        tenant_id: Uuid,
        limit: i64,
    ) -> Result<Vec<ProductTrend>, AppError> {
        // Movimentações anuladas não contam; o produto também precisa
        // estar ativo.
        let trends = sqlx::query_as::<_, ProductTrend>(
            r#"
            SELECT p.id AS product_id, p.name AS name,
                   SUM(m.quantity) AS total_quantity
            FROM movements m
            JOIN products p ON p.id = m.product_id
            WHERE m.tenant_id = $1 AND m.status = $2 AND p.status = $2
            GROUP BY p.id, p.name
            ORDER BY SUM(m.quantity) DESC
            LIMIT $3
            "#,
        )
        .bind(tenant_id)
        .bind(EntityStatus::Active)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(trends)
    }

    // --- Configuração por tenant ---

    async fn get_settings(&self, tenant_id: Uuid) -> Result<Option<TenantSettings>, AppError> {
        let settings = sqlx::query_as::<_, TenantSettings>(
            r#"
            SELECT * FROM tenant_settings WHERE tenant_id = $1
            "#,
        )
        .bind(tenant_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(settings)
    }

    async fn upsert_settings(
        &self,
        settings: TenantSettings,
    ) -> Result<TenantSettings, AppError> {
        let saved = sqlx::query_as::<_, TenantSettings>(
            r#"
            INSERT INTO tenant_settings (tenant_id, rfid_enabled, updated_at)
            VALUES ($1, $2, NOW())
            ON CONFLICT (tenant_id)
            DO UPDATE SET rfid_enabled = EXCLUDED.rfid_enabled, updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(settings.tenant_id)
        .bind(settings.rfid_enabled)
        .fetch_one(&self.pool)
        .await?;
        Ok(saved)
    }
}
