pub mod catalog_service;
pub mod costing_service;
pub mod dashboard_service;
pub mod finance_service;
pub mod invoice_service;
pub mod location_service;
pub mod parties_service;
pub mod stock_service;

pub use catalog_service::CatalogService;
pub use costing_service::CostingService;
pub use dashboard_service::DashboardService;
pub use finance_service::FinanceService;
pub use invoice_service::InvoiceService;
pub use location_service::LocationService;
pub use parties_service::PartiesService;
pub use stock_service::StockService;
