// src/models/locations.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

// --- Filial / inscrição (CNPJ operador) ---
// Entidade consultada do banco no lugar da antiga lista fixa de CNPJs:
// cadastrar uma filial nova não exige redeploy.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub id: Uuid,
    pub tax_id: String, // CNPJ da filial
    pub name: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewLocation {
    #[validate(length(min = 14, max = 14, message = "CNPJ deve ter 14 dígitos"))]
    pub tax_id: String,
    #[validate(length(min = 1, message = "nome é obrigatório"))]
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LocationPatch {
    #[validate(length(min = 1, message = "nome não pode ficar vazio"))]
    pub name: Option<String>,
    pub active: Option<bool>,
}
