// src/db/catalog_repo.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::catalog::{NewProduct, Product, ProductPatch},
};

#[derive(Clone)]
pub struct CatalogRepository {
    pool: PgPool,
}

impl CatalogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ---
    // Leitura
    // ---

    pub async fn list_products<'e, E>(&self, executor: E) -> Result<Vec<Product>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let products =
            sqlx::query_as::<_, Product>("SELECT * FROM products ORDER BY name ASC")
                .fetch_all(executor)
                .await?;
        Ok(products)
    }

    pub async fn get_product<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<Product>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let product = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(product)
    }

    /// Tranca a linha do produto: é o ponto de exclusão mútua por produto.
    /// Toda transação que lê custo/quantidade para depois gravar passa
    /// por aqui primeiro.
    pub async fn get_product_for_update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<Product>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let product =
            sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(executor)
                .await?;
        Ok(product)
    }

    /// Candidatos ao match de item de nota: código interno OU EAN.
    /// A classificação (único/ambíguo/ausente) fica com quem chama.
    pub async fn find_by_code_or_barcode<'e, E>(
        &self,
        executor: E,
        code: &str,
        barcode: Option<&str>,
    ) -> Result<Vec<Product>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT * FROM products
            WHERE active = TRUE
              AND (code = $1 OR ($2::text IS NOT NULL AND barcode = $2))
            "#,
        )
        .bind(code)
        .bind(barcode)
        .fetch_all(executor)
        .await?;
        Ok(products)
    }

    // ---
    // Escrita
    // ---

    pub async fn create_product<'e, E>(
        &self,
        executor: E,
        payload: &NewProduct,
        now: DateTime<Utc>,
    ) -> Result<Product, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let product = sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO products
                (name, code, barcode, category, description, unit, sale_price,
                 out_of_state, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $9)
            RETURNING *
            "#,
        )
        .bind(&payload.name)
        .bind(&payload.code)
        .bind(&payload.barcode)
        .bind(&payload.category)
        .bind(&payload.description)
        .bind(&payload.unit)
        .bind(payload.sale_price)
        .bind(payload.out_of_state)
        .bind(now)
        .fetch_one(executor)
        .await?;
        Ok(product)
    }

    /// Aplica o patch campo a campo; ausente = mantém o valor atual.
    pub async fn update_product<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        patch: &ProductPatch,
        now: DateTime<Utc>,
    ) -> Result<Option<Product>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let product = sqlx::query_as::<_, Product>(
            r#"
            UPDATE products SET
                name         = COALESCE($2, name),
                code         = COALESCE($3, code),
                barcode      = COALESCE($4, barcode),
                category     = COALESCE($5, category),
                description  = COALESCE($6, description),
                unit         = COALESCE($7, unit),
                sale_price   = COALESCE($8, sale_price),
                out_of_state = COALESCE($9, out_of_state),
                active       = COALESCE($10, active),
                updated_at   = $11
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&patch.name)
        .bind(&patch.code)
        .bind(&patch.barcode)
        .bind(&patch.category)
        .bind(&patch.description)
        .bind(&patch.unit)
        .bind(patch.sale_price)
        .bind(patch.out_of_state)
        .bind(patch.active)
        .bind(now)
        .fetch_optional(executor)
        .await?;
        Ok(product)
    }

    /// Grava o resultado do recálculo de custo. Único caminho de escrita
    /// para `average_cost` e `last_purchase_price`.
    pub async fn update_costs<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        average_cost: Decimal,
        last_purchase_price: Decimal,
        now: DateTime<Utc>,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            r#"
            UPDATE products
            SET average_cost = $2, last_purchase_price = $3, updated_at = $4
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(average_cost)
        .bind(last_purchase_price)
        .bind(now)
        .execute(executor)
        .await?;
        Ok(())
    }
}
