// src/services/location_service.rs

use sqlx::{Executor, Postgres};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{clock::SharedClock, error::AppError},
    db::LocationRepository,
    models::locations::{Location, LocationPatch, NewLocation},
};

#[derive(Clone)]
pub struct LocationService {
    repo: LocationRepository,
    clock: SharedClock,
}

impl LocationService {
    pub fn new(repo: LocationRepository, clock: SharedClock) -> Self {
        Self { repo, clock }
    }

    pub async fn create_location<'e, E>(
        &self,
        executor: E,
        payload: &NewLocation,
    ) -> Result<Location, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        payload.validate()?;
        self.repo
            .create_location(executor, payload, self.clock.now())
            .await
    }

    pub async fn list_locations<'e, E>(&self, executor: E) -> Result<Vec<Location>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.list_locations(executor).await
    }

    pub async fn get_location<'e, E>(&self, executor: E, id: Uuid) -> Result<Location, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo
            .get_location(executor, id)
            .await?
            .ok_or_else(|| AppError::not_found("Filial", id))
    }

    pub async fn update_location<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        patch: &LocationPatch,
    ) -> Result<Location, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        patch.validate()?;
        self.repo
            .update_location(executor, id, patch)
            .await?
            .ok_or_else(|| AppError::not_found("Filial", id))
    }
}
