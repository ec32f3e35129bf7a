// src/lib.rs

// Núcleo do ERP: estoque multi-filial com custo médio, contas a
// pagar/receber parceladas e entrada de mercadoria via XML de NF-e.
// A camada HTTP consome os serviços expostos em `config::AppState`.

pub mod common;
pub mod config;
pub mod db;
pub mod models;
pub mod nfe;
pub mod services;

pub use common::error::AppError;
pub use config::AppState;

pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!();
