// src/common/clock.rs

use chrono::{DateTime, NaiveDate, Utc};
use std::sync::Arc;

/// Fonte de "agora" dos serviços. Em produção usamos o relógio do sistema;
/// nos testes um relógio fixo torna datas de vencimento e carimbos
/// determinísticos.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

pub type SharedClock = Arc<dyn Clock>;

#[derive(Debug, Clone, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Relógio congelado para testes.
#[derive(Debug, Clone)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
