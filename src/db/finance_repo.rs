// src/db/finance_repo.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::finance::{
        BankAccount, BankAccountPatch, FinancialTitle, NewBankAccount, TitleKind, TitleStatus,
    },
};

#[derive(Clone)]
pub struct FinanceRepository {
    pool: PgPool,
}

impl FinanceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  TÍTULOS (Contas a Pagar / Receber)
    // =========================================================================

    #[allow(clippy::too_many_arguments)]
    pub async fn insert_title<'e, E>(
        &self,
        executor: E,
        kind: TitleKind,
        description: &str,
        amount: Decimal,
        due_date: NaiveDate,
        installment_number: i32,
        installment_count: i32,
        supplier_id: Option<Uuid>,
        customer_id: Option<Uuid>,
        invoice_id: Option<Uuid>,
        now: DateTime<Utc>,
    ) -> Result<FinancialTitle, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let title = sqlx::query_as::<_, FinancialTitle>(
            r#"
            INSERT INTO financial_titles
                (kind, description, amount, due_date, installment_number,
                 installment_count, supplier_id, customer_id, invoice_id,
                 created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $10)
            RETURNING *
            "#,
        )
        .bind(kind)
        .bind(description)
        .bind(amount)
        .bind(due_date)
        .bind(installment_number)
        .bind(installment_count)
        .bind(supplier_id)
        .bind(customer_id)
        .bind(invoice_id)
        .bind(now)
        .fetch_one(executor)
        .await?;
        Ok(title)
    }

    pub async fn get_title_for_update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<FinancialTitle>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let title = sqlx::query_as::<_, FinancialTitle>(
            "SELECT * FROM financial_titles WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(executor)
        .await?;
        Ok(title)
    }

    pub async fn list_titles<'e, E>(
        &self,
        executor: E,
        kind: Option<TitleKind>,
        status: Option<TitleStatus>,
    ) -> Result<Vec<FinancialTitle>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let titles = sqlx::query_as::<_, FinancialTitle>(
            r#"
            SELECT * FROM financial_titles
            WHERE ($1::title_kind IS NULL OR kind = $1)
              AND ($2::title_status IS NULL OR status = $2)
            ORDER BY due_date ASC, created_at ASC
            "#,
        )
        .bind(kind)
        .bind(status)
        .fetch_all(executor)
        .await?;
        Ok(titles)
    }

    /// Baixa do título: PENDENTE -> PAGO, uma única vez. A checagem de
    /// estado fica no serviço, com a linha trancada.
    pub async fn mark_paid<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        bank_account_id: Uuid,
        paid_amount: Decimal,
        paid_at: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<FinancialTitle, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let title = sqlx::query_as::<_, FinancialTitle>(
            r#"
            UPDATE financial_titles
            SET status = 'PAGO',
                bank_account_id = $2,
                paid_amount = $3,
                paid_at = $4,
                updated_at = $5
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(bank_account_id)
        .bind(paid_amount)
        .bind(paid_at)
        .bind(now)
        .fetch_one(executor)
        .await?;
        Ok(title)
    }

    // =========================================================================
    //  CONTAS BANCÁRIAS
    // =========================================================================

    pub async fn create_account<'e, E>(
        &self,
        executor: E,
        payload: &NewBankAccount,
        now: DateTime<Utc>,
    ) -> Result<BankAccount, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let account = sqlx::query_as::<_, BankAccount>(
            r#"
            INSERT INTO bank_accounts (name, bank_name, current_balance, created_at)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(&payload.name)
        .bind(&payload.bank_name)
        .bind(payload.initial_balance)
        .bind(now)
        .fetch_one(executor)
        .await?;
        Ok(account)
    }

    pub async fn list_accounts<'e, E>(&self, executor: E) -> Result<Vec<BankAccount>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let accounts =
            sqlx::query_as::<_, BankAccount>("SELECT * FROM bank_accounts ORDER BY name ASC")
                .fetch_all(executor)
                .await?;
        Ok(accounts)
    }

    pub async fn get_account_for_update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<BankAccount>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let account =
            sqlx::query_as::<_, BankAccount>("SELECT * FROM bank_accounts WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(executor)
                .await?;
        Ok(account)
    }

    pub async fn update_account<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        patch: &BankAccountPatch,
    ) -> Result<Option<BankAccount>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let account = sqlx::query_as::<_, BankAccount>(
            r#"
            UPDATE bank_accounts SET
                name      = COALESCE($2, name),
                bank_name = COALESCE($3, bank_name),
                active    = COALESCE($4, active)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&patch.name)
        .bind(&patch.bank_name)
        .bind(patch.active)
        .fetch_optional(executor)
        .await?;
        Ok(account)
    }

    /// Ajuste de saldo: positivo credita, negativo debita. Chamado apenas
    /// na mesma transação da baixa do título.
    pub async fn adjust_balance<'e, E>(
        &self,
        executor: E,
        account_id: Uuid,
        delta: Decimal,
    ) -> Result<BankAccount, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let account = sqlx::query_as::<_, BankAccount>(
            r#"
            UPDATE bank_accounts
            SET current_balance = current_balance + $2
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(account_id)
        .bind(delta)
        .fetch_one(executor)
        .await?;
        Ok(account)
    }
}
