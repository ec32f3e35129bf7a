// src/models/parties.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

// --- Fornecedor ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Supplier {
    pub id: Uuid,
    pub name: String,
    pub tax_id: Option<String>, // CNPJ
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub contact: Option<String>,

    // Prazo de pagamento em dias: define o vencimento do título gerado
    // pela entrada de nota. Zero = à vista.
    pub payment_term_days: i32,

    pub active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewSupplier {
    #[validate(length(min = 1, message = "nome é obrigatório"))]
    pub name: String,
    pub tax_id: Option<String>,
    #[validate(email(message = "e-mail inválido"))]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub contact: Option<String>,
    #[serde(default = "default_payment_term")]
    #[validate(range(min = 0, message = "prazo não pode ser negativo"))]
    pub payment_term_days: i32,
}

fn default_payment_term() -> i32 {
    30
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SupplierPatch {
    #[validate(length(min = 1, message = "nome não pode ficar vazio"))]
    pub name: Option<String>,
    pub tax_id: Option<String>,
    #[validate(email(message = "e-mail inválido"))]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub contact: Option<String>,
    #[validate(range(min = 0, message = "prazo não pode ser negativo"))]
    pub payment_term_days: Option<i32>,
    pub active: Option<bool>,
}

// --- Cliente ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: Uuid,
    pub name: String,
    pub tax_id: Option<String>, // CPF ou CNPJ
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub notes: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewCustomer {
    #[validate(length(min = 1, message = "nome é obrigatório"))]
    pub name: String,
    pub tax_id: Option<String>,
    #[validate(email(message = "e-mail inválido"))]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CustomerPatch {
    #[validate(length(min = 1, message = "nome não pode ficar vazio"))]
    pub name: Option<String>,
    pub tax_id: Option<String>,
    #[validate(email(message = "e-mail inválido"))]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub notes: Option<String>,
    pub active: Option<bool>,
}
