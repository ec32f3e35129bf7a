// src/models/finance.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

// --- Enums (mapeando o Postgres) ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "title_kind", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TitleKind {
    Pagar,   // Conta a pagar
    Receber, // Conta a receber
}

// VENCIDO não existe no banco: é uma visão derivada de PENDENTE + data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "title_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TitleStatus {
    Pendente,
    Pago,
}

// --- Título financeiro (obrigação a pagar/receber) ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct FinancialTitle {
    pub id: Uuid,

    pub description: String,
    pub kind: TitleKind,
    pub status: TitleStatus,

    pub amount: Decimal,
    pub paid_amount: Option<Decimal>,
    pub paid_at: Option<NaiveDate>,
    pub due_date: NaiveDate,

    // Parcela i de N (1/1 quando não parcelado)
    pub installment_number: i32,
    pub installment_count: i32,

    // Vínculos
    pub supplier_id: Option<Uuid>,
    pub customer_id: Option<Uuid>,
    pub bank_account_id: Option<Uuid>,
    pub invoice_id: Option<Uuid>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FinancialTitle {
    /// Função pura: nunca altera o status gravado.
    pub fn is_overdue(&self, as_of: NaiveDate) -> bool {
        self.status == TitleStatus::Pendente && self.due_date < as_of
    }

    /// Status exibido nas telas: PENDENTE vencido vira "VENCIDO".
    pub fn display_status(&self, as_of: NaiveDate) -> &'static str {
        match self.status {
            TitleStatus::Pago => "PAGO",
            TitleStatus::Pendente if self.due_date < as_of => "VENCIDO",
            TitleStatus::Pendente => "PENDENTE",
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewTitle {
    pub kind: TitleKind,
    #[validate(length(min = 1, message = "descrição é obrigatória"))]
    pub description: String,
    #[validate(custom(function = "super::positive_decimal"))]
    pub total_amount: Decimal,
    pub first_due_date: NaiveDate,
    #[serde(default = "default_installments")]
    pub installments: u32,
    pub supplier_id: Option<Uuid>,
    pub customer_id: Option<Uuid>,
    pub invoice_id: Option<Uuid>,
}

fn default_installments() -> u32 {
    1
}

// --- Conta bancária ---
// O saldo só muda como efeito da baixa de um título; por isso o patch não
// expõe `current_balance`.

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct BankAccount {
    pub id: Uuid,
    pub name: String,
    pub bank_name: Option<String>,
    pub current_balance: Decimal,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewBankAccount {
    #[validate(length(min = 1, message = "nome é obrigatório"))]
    pub name: String,
    pub bank_name: Option<String>,
    #[serde(default)]
    pub initial_balance: Decimal,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BankAccountPatch {
    #[validate(length(min = 1, message = "nome não pode ficar vazio"))]
    pub name: Option<String>,
    pub bank_name: Option<String>,
    pub active: Option<bool>,
}
