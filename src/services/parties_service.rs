// src/services/parties_service.rs

use sqlx::{Executor, Postgres};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{clock::SharedClock, error::AppError},
    db::PartiesRepository,
    models::parties::{Customer, CustomerPatch, NewCustomer, NewSupplier, Supplier, SupplierPatch},
};

#[derive(Clone)]
pub struct PartiesService {
    repo: PartiesRepository,
    clock: SharedClock,
}

impl PartiesService {
    pub fn new(repo: PartiesRepository, clock: SharedClock) -> Self {
        Self { repo, clock }
    }

    // --- Fornecedores ---

    pub async fn create_supplier<'e, E>(
        &self,
        executor: E,
        payload: &NewSupplier,
    ) -> Result<Supplier, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        payload.validate()?;
        self.repo
            .create_supplier(executor, payload, self.clock.now())
            .await
    }

    pub async fn list_suppliers<'e, E>(&self, executor: E) -> Result<Vec<Supplier>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.list_suppliers(executor).await
    }

    pub async fn get_supplier<'e, E>(&self, executor: E, id: Uuid) -> Result<Supplier, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo
            .get_supplier(executor, id)
            .await?
            .ok_or_else(|| AppError::not_found("Fornecedor", id))
    }

    pub async fn update_supplier<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        patch: &SupplierPatch,
    ) -> Result<Supplier, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        patch.validate()?;
        self.repo
            .update_supplier(executor, id, patch)
            .await?
            .ok_or_else(|| AppError::not_found("Fornecedor", id))
    }

    // --- Clientes ---

    pub async fn create_customer<'e, E>(
        &self,
        executor: E,
        payload: &NewCustomer,
    ) -> Result<Customer, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        payload.validate()?;
        self.repo
            .create_customer(executor, payload, self.clock.now())
            .await
    }

    pub async fn list_customers<'e, E>(&self, executor: E) -> Result<Vec<Customer>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.list_customers(executor).await
    }

    pub async fn get_customer<'e, E>(&self, executor: E, id: Uuid) -> Result<Customer, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo
            .get_customer(executor, id)
            .await?
            .ok_or_else(|| AppError::not_found("Cliente", id))
    }

    pub async fn update_customer<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        patch: &CustomerPatch,
    ) -> Result<Customer, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        patch.validate()?;
        self.repo
            .update_customer(executor, id, patch)
            .await?
            .ok_or_else(|| AppError::not_found("Cliente", id))
    }
}
