// src/config.rs

use crate::{
    db::{InMemoryInventoryStore, InventoryStore, PostgresInventoryStore},
    services::{
        automation::AutomationService, categories::CategoriesService,
        dashboard::DashboardService, ledger::LedgerService, products::ProductsService,
        token::TokenVerifier,
    },
};
use sqlx::postgres::PgPoolOptions;
use std::{env, sync::Arc, time::Duration};

#[derive(Clone)]
pub struct AppState {
    pub token_verifier: TokenVerifier,
    pub store: Arc<dyn InventoryStore>,
    pub products_service: ProductsService,
    pub categories_service: CategoriesService,
    pub ledger_service: LedgerService,
    pub dashboard_service: DashboardService,
    pub automation_service: AutomationService,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let jwt_secret = env::var("JWT_SECRET").expect("JWT_SECRET deve ser definido");

        // DATABASE_URL presente liga o Postgres; ausente cai no store em
        // memória, que some quando o processo morre.
        let store: Arc<dyn InventoryStore> = match env::var("DATABASE_URL") {
            Ok(database_url) => {
                let db_pool = PgPoolOptions::new()
                    .max_connections(5)
                    .acquire_timeout(Duration::from_secs(3))
                    .connect(&database_url)
                    .await?;

                sqlx::migrate!().run(&db_pool).await?;
                tracing::info!("✅ Conexão com o banco de dados e migrações OK!");

                Arc::new(PostgresInventoryStore::new(db_pool))
            }
            Err(_) => {
                tracing::warn!(
                    "⚠️ DATABASE_URL ausente; usando store em memória (dados voláteis)."
                );
                Arc::new(InMemoryInventoryStore::new())
            }
        };

        Ok(Self::with_store(store, jwt_secret))
    }

    /// Monta o gráfico de serviços sobre um store já escolhido; os testes
    /// de API chamam direto com o store em memória.
    pub fn with_store(store: Arc<dyn InventoryStore>, jwt_secret: impl Into<String>) -> Self {
        let token_verifier = TokenVerifier::new(jwt_secret);

        Self {
            token_verifier,
            products_service: ProductsService::new(store.clone()),
            categories_service: CategoriesService::new(store.clone()),
            ledger_service: LedgerService::new(store.clone()),
            dashboard_service: DashboardService::new(store.clone()),
            automation_service: AutomationService::new(store.clone()),
            store,
        }
    }
}
