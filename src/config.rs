// src/config.rs

use sqlx::{PgPool, postgres::PgPoolOptions};
use std::{env, sync::Arc, time::Duration};

use crate::common::clock::{SharedClock, SystemClock};
use crate::db::{
    CatalogRepository, DashboardRepository, FinanceRepository, InvoiceRepository,
    LocationRepository, PartiesRepository, StockRepository,
};
use crate::services::{
    CatalogService, CostingService, DashboardService, FinanceService, InvoiceService,
    LocationService, PartiesService, StockService,
};

/// Inicializa o logger. Fica aqui (e não no binário) para os handlers e
/// ferramentas de linha de comando compartilharem a mesma configuração.
pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub clock: SharedClock,

    pub catalog: CatalogService,
    pub costing: CostingService,
    pub stock: StockService,
    pub finance: FinanceService,
    pub parties: PartiesService,
    pub locations: LocationService,
    pub invoices: InvoiceService,
    pub dashboard: DashboardService,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL")?;

        let db_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&database_url)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        Ok(Self::with_pool(db_pool))
    }

    /// Monta o gráfico de dependências sobre uma pool já criada (os testes
    /// de integração passam a própria pool por aqui).
    pub fn with_pool(db_pool: PgPool) -> Self {
        let clock: SharedClock = Arc::new(SystemClock);
        Self::with_pool_and_clock(db_pool, clock)
    }

    pub fn with_pool_and_clock(db_pool: PgPool, clock: SharedClock) -> Self {
        let catalog_repo = CatalogRepository::new(db_pool.clone());
        let stock_repo = StockRepository::new(db_pool.clone());
        let finance_repo = FinanceRepository::new(db_pool.clone());
        let parties_repo = PartiesRepository::new(db_pool.clone());
        let location_repo = LocationRepository::new(db_pool.clone());
        let invoice_repo = InvoiceRepository::new(db_pool.clone());
        let dashboard_repo = DashboardRepository::new(db_pool.clone());

        let catalog = CatalogService::new(catalog_repo.clone(), clock.clone());
        let costing = CostingService::new(catalog_repo.clone(), clock.clone());
        let stock = StockService::new(stock_repo.clone(), catalog_repo.clone(), clock.clone());
        let finance = FinanceService::new(finance_repo.clone(), clock.clone());
        let parties = PartiesService::new(parties_repo.clone(), clock.clone());
        let locations = LocationService::new(location_repo.clone(), clock.clone());
        let dashboard = DashboardService::new(dashboard_repo);

        let invoices = InvoiceService::new(
            db_pool.clone(),
            invoice_repo,
            catalog_repo,
            parties_repo,
            location_repo,
            costing.clone(),
            stock.clone(),
            finance.clone(),
            clock.clone(),
        );

        Self {
            db_pool,
            clock,
            catalog,
            costing,
            stock,
            finance,
            parties,
            locations,
            invoices,
            dashboard,
        }
    }

    /// Roda as migrações embutidas. Chamado na subida da aplicação.
    pub async fn run_migrations(&self) -> anyhow::Result<()> {
        crate::MIGRATOR.run(&self.db_pool).await?;
        tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");
        Ok(())
    }
}
