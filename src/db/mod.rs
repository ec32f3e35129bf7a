pub mod catalog_repo;
pub use catalog_repo::CatalogRepository;
pub mod stock_repo;
pub use stock_repo::StockRepository;
pub mod finance_repo;
pub use finance_repo::FinanceRepository;
pub mod parties_repo;
pub use parties_repo::PartiesRepository;
pub mod location_repo;
pub use location_repo::LocationRepository;
pub mod invoice_repo;
pub use invoice_repo::InvoiceRepository;
pub mod dashboard_repo;
pub use dashboard_repo::DashboardRepository;
