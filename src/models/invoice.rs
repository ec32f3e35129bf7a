// src/models/invoice.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

// PENDENTE -> PROCESSADO ou PENDENTE -> ERRO; ambos terminais.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "invoice_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InvoiceStatus {
    Pendente,
    Processado,
    Erro,
}

// --- Nota fiscal de compra (XML recebido) ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct IncomingInvoice {
    pub id: Uuid,

    // Cabeçalho extraído do XML
    pub supplier_tax_id: String,
    pub supplier_name: String,
    pub number: String,

    // Filial de destino da mercadoria
    pub location_id: Uuid,

    pub products_total: Decimal,
    pub icms_total: Decimal,
    pub total: Decimal,

    // Itens da nota como JSONB (Vec<InvoiceItem> serializado)
    pub items: Value,

    pub status: InvoiceStatus,
    pub error_message: Option<String>,

    pub created_at: DateTime<Utc>,
    pub processed_at: Option<DateTime<Utc>>,
}

impl IncomingInvoice {
    pub fn parsed_items(&self) -> Result<Vec<InvoiceItem>, serde_json::Error> {
        serde_json::from_value(self.items.clone())
    }
}

// Item de nota, persistido dentro do JSONB da invoice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceItem {
    pub code: String,
    pub ean: Option<String>,
    pub description: String,
    pub quantity: Decimal,
    pub unit_value: Decimal,
    pub total_value: Decimal,
}

// Resultado do processamento: linhas sem produto cadastrado são puladas
// e contadas, não são erro.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceProcessOutcome {
    pub invoice_id: Uuid,
    pub matched_items: usize,
    pub skipped_items: usize,
    pub payable_id: Uuid,
}
