// src/models/dashboard.rs

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::models::finance::TitleKind;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub customers: i64,
    pub suppliers: i64,
    pub products: i64,
    pub locations: i64,

    pub payables_open: Decimal,
    pub receivables_open: Decimal,
    pub bank_balance: Decimal,

    // Valorização do estoque: SUM(quantidade * custo médio), no banco.
    pub stock_value: Decimal,
}

// Uma linha do histórico mensal de baixas (entradas x saídas por mês).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyFlowEntry {
    pub month: String, // "YYYY-MM"
    pub kind: TitleKind,
    pub total: Decimal,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinanceReport {
    pub receipts: Decimal,
    pub expenses: Decimal,
    pub balance: Decimal,
}
