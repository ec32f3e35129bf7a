// src/services/dashboard_service.rs

use sqlx::{Acquire, Executor, Postgres};

use crate::{
    common::error::AppError,
    db::DashboardRepository,
    models::dashboard::{DashboardSummary, FinanceReport, MonthlyFlowEntry},
};

#[derive(Clone)]
pub struct DashboardService {
    repo: DashboardRepository,
}

impl DashboardService {
    pub fn new(repo: DashboardRepository) -> Self {
        Self { repo }
    }

    pub async fn summary<'e, E>(&self, executor: E) -> Result<DashboardSummary, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        self.repo.get_summary(executor).await
    }

    pub async fn monthly_flow<'e, E>(&self, executor: E) -> Result<Vec<MonthlyFlowEntry>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.get_monthly_flow(executor).await
    }

    pub async fn finance_report<'e, E>(&self, executor: E) -> Result<FinanceReport, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        self.repo.get_finance_report(executor).await
    }
}
