// src/services/catalog_service.rs

use sqlx::{Executor, Postgres};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{clock::SharedClock, error::AppError},
    db::CatalogRepository,
    models::catalog::{NewProduct, Product, ProductPatch},
};

#[derive(Clone)]
pub struct CatalogService {
    repo: CatalogRepository,
    clock: SharedClock,
}

impl CatalogService {
    pub fn new(repo: CatalogRepository, clock: SharedClock) -> Self {
        Self { repo, clock }
    }

    pub async fn create_product<'e, E>(
        &self,
        executor: E,
        payload: &NewProduct,
    ) -> Result<Product, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        payload.validate()?;
        self.repo
            .create_product(executor, payload, self.clock.now())
            .await
    }

    pub async fn list_products<'e, E>(&self, executor: E) -> Result<Vec<Product>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.list_products(executor).await
    }

    pub async fn get_product<'e, E>(&self, executor: E, id: Uuid) -> Result<Product, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo
            .get_product(executor, id)
            .await?
            .ok_or_else(|| AppError::not_found("Produto", id))
    }

    pub async fn update_product<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        patch: &ProductPatch,
    ) -> Result<Product, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        patch.validate()?;
        self.repo
            .update_product(executor, id, patch, self.clock.now())
            .await?
            .ok_or_else(|| AppError::not_found("Produto", id))
    }
}
