// src/models/inventory.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

// Mapeia o CREATE TYPE movement_kind do banco.
// ENTRADA e SAIDA têm sinal fixo; AJUSTE carrega o próprio sinal
// (positivo = entrada, negativo = saída), como no acerto de inventário.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "movement_kind", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MovementKind {
    Entrada,
    Saida,
    Ajuste,
}

// --- Posição de estoque (Produto x Filial) ---
// Criada de forma preguiçosa na primeira movimentação. A quantidade é
// sempre a soma dos deltas do razão de movimentos, nunca ajustada à mão.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct StockPosition {
    pub id: Uuid,
    pub product_id: Uuid,
    pub location_id: Uuid,

    pub quantity: Decimal,
    pub reserved_quantity: Decimal,
    pub low_stock_threshold: Decimal,

    pub updated_at: DateTime<Utc>,
}

impl StockPosition {
    /// Posição "zerada" para consultas de produto que ainda não movimentou
    /// naquela filial. Estoque inexistente não é erro.
    pub fn empty(product_id: Uuid, location_id: Uuid, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::nil(),
            product_id,
            location_id,
            quantity: Decimal::ZERO,
            reserved_quantity: Decimal::ZERO,
            low_stock_threshold: Decimal::ZERO,
            updated_at: now,
        }
    }
}

// --- Movimentação (razão de estoque) ---
// Registro imutável: é a fonte de verdade para auditoria e para a
// reconstrução das posições.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct StockMovement {
    pub id: Uuid,
    pub product_id: Uuid,
    pub location_id: Uuid,

    pub kind: MovementKind,
    pub quantity_changed: Decimal,
    pub quantity_before: Decimal,

    pub unit_value: Option<Decimal>,
    pub document_ref: Option<String>,
    pub actor: Option<String>,

    pub created_at: DateTime<Utc>,
}

// Agregados do histórico filtrado, calculados no banco.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct MovementTotals {
    pub total_in: Decimal,
    pub total_out: Decimal,
    pub net: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovementHistory {
    pub movements: Vec<StockMovement>,
    pub totals: MovementTotals,
}
