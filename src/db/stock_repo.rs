// src/db/stock_repo.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::inventory::{MovementKind, MovementTotals, StockMovement, StockPosition},
};

#[derive(Clone)]
pub struct StockRepository {
    pool: PgPool,
}

impl StockRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ---
    // Posições
    // ---

    pub async fn get_position<'e, E>(
        &self,
        executor: E,
        product_id: Uuid,
        location_id: Uuid,
    ) -> Result<Option<StockPosition>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let position = sqlx::query_as::<_, StockPosition>(
            "SELECT * FROM stock_positions WHERE product_id = $1 AND location_id = $2",
        )
        .bind(product_id)
        .bind(location_id)
        .fetch_optional(executor)
        .await?;
        Ok(position)
    }

    pub async fn get_position_for_update<'e, E>(
        &self,
        executor: E,
        product_id: Uuid,
        location_id: Uuid,
    ) -> Result<Option<StockPosition>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let position = sqlx::query_as::<_, StockPosition>(
            "SELECT * FROM stock_positions WHERE product_id = $1 AND location_id = $2 FOR UPDATE",
        )
        .bind(product_id)
        .bind(location_id)
        .fetch_optional(executor)
        .await?;
        Ok(position)
    }

    pub async fn list_positions_for_product<'e, E>(
        &self,
        executor: E,
        product_id: Uuid,
    ) -> Result<Vec<StockPosition>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let positions = sqlx::query_as::<_, StockPosition>(
            "SELECT * FROM stock_positions WHERE product_id = $1 ORDER BY location_id",
        )
        .bind(product_id)
        .fetch_all(executor)
        .await?;
        Ok(positions)
    }

    /// UPSERT atômico da posição: cria na primeira movimentação da filial,
    /// senão soma o delta à quantidade existente.
    pub async fn apply_position_delta<'e, E>(
        &self,
        executor: E,
        product_id: Uuid,
        location_id: Uuid,
        delta: Decimal,
        now: DateTime<Utc>,
    ) -> Result<StockPosition, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let position = sqlx::query_as::<_, StockPosition>(
            r#"
            INSERT INTO stock_positions (product_id, location_id, quantity, updated_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (product_id, location_id)
            DO UPDATE SET
                quantity = stock_positions.quantity + $3,
                updated_at = $4
            RETURNING *
            "#,
        )
        .bind(product_id)
        .bind(location_id)
        .bind(delta)
        .bind(now)
        .fetch_one(executor)
        .await?;
        Ok(position)
    }

    // ---
    // Razão de movimentos
    // ---

    /// Insere no razão. Não existe UPDATE nem DELETE para esta tabela.
    #[allow(clippy::too_many_arguments)]
    pub async fn insert_movement<'e, E>(
        &self,
        executor: E,
        product_id: Uuid,
        location_id: Uuid,
        kind: MovementKind,
        quantity_changed: Decimal,
        quantity_before: Decimal,
        unit_value: Option<Decimal>,
        document_ref: Option<&str>,
        actor: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<StockMovement, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let movement = sqlx::query_as::<_, StockMovement>(
            r#"
            INSERT INTO stock_movements
                (product_id, location_id, kind, quantity_changed, quantity_before,
                 unit_value, document_ref, actor, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(product_id)
        .bind(location_id)
        .bind(kind)
        .bind(quantity_changed)
        .bind(quantity_before)
        .bind(unit_value)
        .bind(document_ref)
        .bind(actor)
        .bind(now)
        .fetch_one(executor)
        .await?;
        Ok(movement)
    }

    pub async fn list_movements<'e, E>(
        &self,
        executor: E,
        product_id: Uuid,
        location_id: Option<Uuid>,
    ) -> Result<Vec<StockMovement>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let movements = sqlx::query_as::<_, StockMovement>(
            r#"
            SELECT * FROM stock_movements
            WHERE product_id = $1
              AND ($2::uuid IS NULL OR location_id = $2)
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(product_id)
        .bind(location_id)
        .fetch_all(executor)
        .await?;
        Ok(movements)
    }

    /// Totais do histórico filtrado, agregados no banco.
    pub async fn movement_totals<'e, E>(
        &self,
        executor: E,
        product_id: Uuid,
        location_id: Option<Uuid>,
    ) -> Result<MovementTotals, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let totals = sqlx::query_as::<_, MovementTotals>(
            r#"
            SELECT
                COALESCE(SUM(quantity_changed) FILTER (WHERE quantity_changed > 0), 0) AS total_in,
                COALESCE(-SUM(quantity_changed) FILTER (WHERE quantity_changed < 0), 0) AS total_out,
                COALESCE(SUM(quantity_changed), 0) AS net
            FROM stock_movements
            WHERE product_id = $1
              AND ($2::uuid IS NULL OR location_id = $2)
            "#,
        )
        .bind(product_id)
        .bind(location_id)
        .fetch_one(executor)
        .await?;
        Ok(totals)
    }

    /// Recalcula a quantidade total do produto como a soma das posições.
    /// Sempre a soma inteira, nunca incremento: escrita concorrente em
    /// outra filial não deixa o total defasado.
    pub async fn recompute_product_total<'e, E>(
        &self,
        executor: E,
        product_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Decimal, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let total = sqlx::query_scalar::<_, Decimal>(
            r#"
            UPDATE products
            SET total_quantity = COALESCE(
                    (SELECT SUM(quantity) FROM stock_positions WHERE product_id = $1), 0),
                updated_at = $2
            WHERE id = $1
            RETURNING total_quantity
            "#,
        )
        .bind(product_id)
        .bind(now)
        .fetch_one(executor)
        .await?;
        Ok(total)
    }
}
