// src/db/location_repo.rs

use chrono::{DateTime, Utc};
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::locations::{Location, LocationPatch, NewLocation},
};

#[derive(Clone)]
pub struct LocationRepository {
    pool: PgPool,
}

impl LocationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create_location<'e, E>(
        &self,
        executor: E,
        payload: &NewLocation,
        now: DateTime<Utc>,
    ) -> Result<Location, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Location>(
            r#"
            INSERT INTO locations (tax_id, name, created_at)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(&payload.tax_id)
        .bind(&payload.name)
        .bind(now)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::Invalid(format!("CNPJ já cadastrado: {}", payload.tax_id));
                }
            }
            e.into()
        })
    }

    pub async fn list_locations<'e, E>(&self, executor: E) -> Result<Vec<Location>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let locations = sqlx::query_as::<_, Location>(
            "SELECT * FROM locations WHERE active = TRUE ORDER BY name ASC",
        )
        .fetch_all(executor)
        .await?;
        Ok(locations)
    }

    pub async fn get_location<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<Location>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let location = sqlx::query_as::<_, Location>("SELECT * FROM locations WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(location)
    }

    pub async fn find_by_tax_id<'e, E>(
        &self,
        executor: E,
        tax_id: &str,
    ) -> Result<Option<Location>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let location = sqlx::query_as::<_, Location>(
            "SELECT * FROM locations WHERE tax_id = $1 AND active = TRUE",
        )
        .bind(tax_id)
        .fetch_optional(executor)
        .await?;
        Ok(location)
    }

    pub async fn update_location<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        patch: &LocationPatch,
    ) -> Result<Option<Location>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let location = sqlx::query_as::<_, Location>(
            r#"
            UPDATE locations SET
                name   = COALESCE($2, name),
                active = COALESCE($3, active)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&patch.name)
        .bind(patch.active)
        .fetch_optional(executor)
        .await?;
        Ok(location)
    }
}
