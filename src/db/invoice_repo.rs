// src/db/invoice_repo.rs

use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::invoice::IncomingInvoice,
    nfe::ParsedInvoice,
};

#[derive(Clone)]
pub struct InvoiceRepository {
    pool: PgPool,
}

impl InvoiceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Persiste a nota recém-analisada como PENDENTE.
    pub async fn insert_invoice<'e, E>(
        &self,
        executor: E,
        parsed: &ParsedInvoice,
        location_id: Uuid,
        items: Value,
        now: DateTime<Utc>,
    ) -> Result<IncomingInvoice, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let invoice = sqlx::query_as::<_, IncomingInvoice>(
            r#"
            INSERT INTO incoming_invoices
                (supplier_tax_id, supplier_name, number, location_id,
                 products_total, icms_total, total, items, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(&parsed.supplier_tax_id)
        .bind(&parsed.supplier_name)
        .bind(&parsed.number)
        .bind(location_id)
        .bind(parsed.products_total)
        .bind(parsed.icms_total)
        .bind(parsed.total)
        .bind(items)
        .bind(now)
        .fetch_one(executor)
        .await?;
        Ok(invoice)
    }

    pub async fn list_invoices<'e, E>(&self, executor: E) -> Result<Vec<IncomingInvoice>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let invoices = sqlx::query_as::<_, IncomingInvoice>(
            "SELECT * FROM incoming_invoices ORDER BY created_at DESC",
        )
        .fetch_all(executor)
        .await?;
        Ok(invoices)
    }

    pub async fn get_invoice<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<IncomingInvoice>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let invoice =
            sqlx::query_as::<_, IncomingInvoice>("SELECT * FROM incoming_invoices WHERE id = $1")
                .bind(id)
                .fetch_optional(executor)
                .await?;
        Ok(invoice)
    }

    /// Tranca a nota durante o processamento: duas chamadas concorrentes
    /// sobre a mesma nota ficam serializadas e a segunda enxerga o status
    /// terminal da primeira.
    pub async fn get_invoice_for_update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<IncomingInvoice>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let invoice = sqlx::query_as::<_, IncomingInvoice>(
            "SELECT * FROM incoming_invoices WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(executor)
        .await?;
        Ok(invoice)
    }

    pub async fn mark_processed<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<IncomingInvoice, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let invoice = sqlx::query_as::<_, IncomingInvoice>(
            r#"
            UPDATE incoming_invoices
            SET status = 'PROCESSADO', error_message = NULL, processed_at = $2
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(now)
        .fetch_one(executor)
        .await?;
        Ok(invoice)
    }

    /// Marca ERRO com a mensagem para diagnóstico. Roda fora da transação
    /// que falhou, senão a marca seria desfeita junto com o rollback.
    pub async fn mark_error<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        message: &str,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            r#"
            UPDATE incoming_invoices
            SET status = 'ERRO', error_message = $2
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(message)
        .execute(executor)
        .await?;
        Ok(())
    }
}
