// src/db/dashboard_repo.rs

use rust_decimal::Decimal;
use sqlx::{Acquire, Executor, PgPool, Postgres};

use crate::{
    common::error::AppError,
    models::dashboard::{DashboardSummary, FinanceReport, MonthlyFlowEntry},
};

#[derive(Clone)]
pub struct DashboardRepository {
    pool: PgPool,
}

impl DashboardRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // Resumo geral. Tudo agregado no banco: as coleções nunca passam
    // inteiras pela memória do processo.
    pub async fn get_summary<'e, E>(&self, executor: E) -> Result<DashboardSummary, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        // Transação só para ler um snapshot consistente dos números.
        let mut tx = executor.begin().await?;

        let customers =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM customers WHERE active = TRUE")
                .fetch_one(&mut *tx)
                .await?;

        let suppliers =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM suppliers WHERE active = TRUE")
                .fetch_one(&mut *tx)
                .await?;

        let products =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM products WHERE active = TRUE")
                .fetch_one(&mut *tx)
                .await?;

        let locations =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM locations WHERE active = TRUE")
                .fetch_one(&mut *tx)
                .await?;

        let payables_open = sqlx::query_scalar::<_, Decimal>(
            r#"
            SELECT COALESCE(SUM(amount), 0) FROM financial_titles
            WHERE kind = 'PAGAR' AND status = 'PENDENTE'
            "#,
        )
        .fetch_one(&mut *tx)
        .await?;

        let receivables_open = sqlx::query_scalar::<_, Decimal>(
            r#"
            SELECT COALESCE(SUM(amount), 0) FROM financial_titles
            WHERE kind = 'RECEBER' AND status = 'PENDENTE'
            "#,
        )
        .fetch_one(&mut *tx)
        .await?;

        let bank_balance = sqlx::query_scalar::<_, Decimal>(
            "SELECT COALESCE(SUM(current_balance), 0) FROM bank_accounts WHERE active = TRUE",
        )
        .fetch_one(&mut *tx)
        .await?;

        let stock_value = sqlx::query_scalar::<_, Decimal>(
            r#"
            SELECT COALESCE(SUM(sp.quantity * p.average_cost), 0)
            FROM stock_positions sp
            JOIN products p ON p.id = sp.product_id
            "#,
        )
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(DashboardSummary {
            customers,
            suppliers,
            products,
            locations,
            payables_open,
            receivables_open,
            bank_balance,
            stock_value,
        })
    }

    /// Histórico mensal de baixas (o que de fato entrou/saiu do caixa),
    /// agrupado por mês e tipo, mais recente primeiro.
    pub async fn get_monthly_flow<'e, E>(
        &self,
        executor: E,
    ) -> Result<Vec<MonthlyFlowEntry>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let entries = sqlx::query_as::<_, MonthlyFlowEntry>(
            r#"
            SELECT
                to_char(paid_at, 'YYYY-MM') AS month,
                kind,
                COALESCE(SUM(paid_amount), 0) AS total,
                COUNT(*) AS count
            FROM financial_titles
            WHERE status = 'PAGO'
            GROUP BY 1, 2
            ORDER BY 1 DESC
            "#,
        )
        .fetch_all(executor)
        .await?;
        Ok(entries)
    }

    /// Totais consolidados de recebimentos x pagamentos já baixados.
    pub async fn get_finance_report<'e, E>(&self, executor: E) -> Result<FinanceReport, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let receipts = sqlx::query_scalar::<_, Decimal>(
            r#"
            SELECT COALESCE(SUM(paid_amount), 0) FROM financial_titles
            WHERE kind = 'RECEBER' AND status = 'PAGO'
            "#,
        )
        .fetch_one(&mut *tx)
        .await?;

        let expenses = sqlx::query_scalar::<_, Decimal>(
            r#"
            SELECT COALESCE(SUM(paid_amount), 0) FROM financial_titles
            WHERE kind = 'PAGAR' AND status = 'PAGO'
            "#,
        )
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(FinanceReport {
            receipts,
            expenses,
            balance: receipts - expenses,
        })
    }
}
