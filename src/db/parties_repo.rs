// src/db/parties_repo.rs

use chrono::{DateTime, Utc};
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::parties::{Customer, CustomerPatch, NewCustomer, NewSupplier, Supplier, SupplierPatch},
};

#[derive(Clone)]
pub struct PartiesRepository {
    pool: PgPool,
}

impl PartiesRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  FORNECEDORES
    // =========================================================================

    pub async fn create_supplier<'e, E>(
        &self,
        executor: E,
        payload: &NewSupplier,
        now: DateTime<Utc>,
    ) -> Result<Supplier, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let supplier = sqlx::query_as::<_, Supplier>(
            r#"
            INSERT INTO suppliers
                (name, tax_id, email, phone, address, city, state, contact,
                 payment_term_days, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(&payload.name)
        .bind(&payload.tax_id)
        .bind(&payload.email)
        .bind(&payload.phone)
        .bind(&payload.address)
        .bind(&payload.city)
        .bind(&payload.state)
        .bind(&payload.contact)
        .bind(payload.payment_term_days)
        .bind(now)
        .fetch_one(executor)
        .await?;
        Ok(supplier)
    }

    pub async fn list_suppliers<'e, E>(&self, executor: E) -> Result<Vec<Supplier>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let suppliers =
            sqlx::query_as::<_, Supplier>("SELECT * FROM suppliers ORDER BY name ASC")
                .fetch_all(executor)
                .await?;
        Ok(suppliers)
    }

    pub async fn get_supplier<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<Supplier>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let supplier = sqlx::query_as::<_, Supplier>("SELECT * FROM suppliers WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(supplier)
    }

    /// Busca por CNPJ: é como o pipeline de nota decide entre reaproveitar
    /// e auto-cadastrar o fornecedor.
    pub async fn find_supplier_by_tax_id<'e, E>(
        &self,
        executor: E,
        tax_id: &str,
    ) -> Result<Option<Supplier>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let supplier =
            sqlx::query_as::<_, Supplier>("SELECT * FROM suppliers WHERE tax_id = $1 LIMIT 1")
                .bind(tax_id)
                .fetch_optional(executor)
                .await?;
        Ok(supplier)
    }

    pub async fn update_supplier<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        patch: &SupplierPatch,
    ) -> Result<Option<Supplier>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let supplier = sqlx::query_as::<_, Supplier>(
            r#"
            UPDATE suppliers SET
                name              = COALESCE($2, name),
                tax_id            = COALESCE($3, tax_id),
                email             = COALESCE($4, email),
                phone             = COALESCE($5, phone),
                address           = COALESCE($6, address),
                city              = COALESCE($7, city),
                state             = COALESCE($8, state),
                contact           = COALESCE($9, contact),
                payment_term_days = COALESCE($10, payment_term_days),
                active            = COALESCE($11, active)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&patch.name)
        .bind(&patch.tax_id)
        .bind(&patch.email)
        .bind(&patch.phone)
        .bind(&patch.address)
        .bind(&patch.city)
        .bind(&patch.state)
        .bind(&patch.contact)
        .bind(patch.payment_term_days)
        .bind(patch.active)
        .fetch_optional(executor)
        .await?;
        Ok(supplier)
    }

    // =========================================================================
    //  CLIENTES
    // =========================================================================

    pub async fn create_customer<'e, E>(
        &self,
        executor: E,
        payload: &NewCustomer,
        now: DateTime<Utc>,
    ) -> Result<Customer, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let customer = sqlx::query_as::<_, Customer>(
            r#"
            INSERT INTO customers
                (name, tax_id, email, phone, address, city, state, notes, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(&payload.name)
        .bind(&payload.tax_id)
        .bind(&payload.email)
        .bind(&payload.phone)
        .bind(&payload.address)
        .bind(&payload.city)
        .bind(&payload.state)
        .bind(&payload.notes)
        .bind(now)
        .fetch_one(executor)
        .await?;
        Ok(customer)
    }

    pub async fn list_customers<'e, E>(&self, executor: E) -> Result<Vec<Customer>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let customers =
            sqlx::query_as::<_, Customer>("SELECT * FROM customers ORDER BY name ASC")
                .fetch_all(executor)
                .await?;
        Ok(customers)
    }

    pub async fn get_customer<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<Customer>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let customer = sqlx::query_as::<_, Customer>("SELECT * FROM customers WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(customer)
    }

    pub async fn update_customer<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        patch: &CustomerPatch,
    ) -> Result<Option<Customer>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let customer = sqlx::query_as::<_, Customer>(
            r#"
            UPDATE customers SET
                name    = COALESCE($2, name),
                tax_id  = COALESCE($3, tax_id),
                email   = COALESCE($4, email),
                phone   = COALESCE($5, phone),
                address = COALESCE($6, address),
                city    = COALESCE($7, city),
                state   = COALESCE($8, state),
                notes   = COALESCE($9, notes),
                active  = COALESCE($10, active)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&patch.name)
        .bind(&patch.tax_id)
        .bind(&patch.email)
        .bind(&patch.phone)
        .bind(&patch.address)
        .bind(&patch.city)
        .bind(&patch.state)
        .bind(&patch.notes)
        .bind(patch.active)
        .fetch_optional(executor)
        .await?;
        Ok(customer)
    }
}
