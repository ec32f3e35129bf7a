// src/models/catalog.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

// --- Produto (catálogo) ---
// `average_cost` e `total_quantity` são derivados: o custo médio só muda
// pelo recálculo de compra e a quantidade total é a soma das posições por
// filial. Nenhum dos dois entra no patch.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub code: Option<String>,
    pub barcode: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub unit: String,

    pub sale_price: Decimal,
    pub last_purchase_price: Decimal,
    pub average_cost: Decimal,
    pub total_quantity: Decimal,

    // Mercadoria comprada de fora do estado: o custo de entrada recebe o
    // diferencial de ICMS antes de entrar no custo médio.
    pub out_of_state: bool,

    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    #[validate(length(min = 1, message = "nome é obrigatório"))]
    pub name: String,
    pub code: Option<String>,
    pub barcode: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    #[serde(default = "default_unit")]
    pub unit: String,
    #[validate(custom(function = "super::non_negative_decimal"))]
    #[serde(default)]
    pub sale_price: Decimal,
    #[serde(default)]
    pub out_of_state: bool,
}

fn default_unit() -> String {
    "UN".to_string()
}

// Patch explícito: enumera os campos que podem ser alterados por fora.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProductPatch {
    #[validate(length(min = 1, message = "nome não pode ficar vazio"))]
    pub name: Option<String>,
    pub code: Option<String>,
    pub barcode: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub unit: Option<String>,
    #[validate(custom(function = "super::non_negative_decimal"))]
    pub sale_price: Option<Decimal>,
    pub out_of_state: Option<bool>,
    pub active: Option<bool>,
}

// --- Resolução de produto por código/EAN ---
// O match de um item de nota pode cair em três situações distintas e o
// pipeline precisa distingui-las: só o caso único dá baixa no estoque.
#[derive(Debug)]
pub enum ProductMatch {
    Unique(Box<Product>),
    Ambiguous { reference: String, count: usize },
    NotFound,
}

impl ProductMatch {
    /// Classifica os candidatos retornados pela consulta `código OU EAN`.
    /// Código interno tem precedência sobre o código de barras.
    pub fn classify(code: &str, ean: Option<&str>, candidates: Vec<Product>) -> ProductMatch {
        let by_code: Vec<&Product> = candidates
            .iter()
            .filter(|p| !code.is_empty() && p.code.as_deref() == Some(code))
            .collect();

        match by_code.len() {
            1 => return ProductMatch::Unique(Box::new(by_code[0].clone())),
            n if n > 1 => {
                return ProductMatch::Ambiguous {
                    reference: code.to_string(),
                    count: n,
                };
            }
            _ => {}
        }

        let ean = match ean {
            Some(e) if !e.is_empty() => e,
            _ => return ProductMatch::NotFound,
        };

        let by_ean: Vec<&Product> = candidates
            .iter()
            .filter(|p| p.barcode.as_deref() == Some(ean))
            .collect();

        match by_ean.len() {
            0 => ProductMatch::NotFound,
            1 => ProductMatch::Unique(Box::new(by_ean[0].clone())),
            n => ProductMatch::Ambiguous {
                reference: ean.to_string(),
                count: n,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn product(code: Option<&str>, barcode: Option<&str>) -> Product {
        Product {
            id: Uuid::new_v4(),
            name: "Produto".to_string(),
            code: code.map(str::to_string),
            barcode: barcode.map(str::to_string),
            category: None,
            description: None,
            unit: "UN".to_string(),
            sale_price: Decimal::ZERO,
            last_purchase_price: Decimal::ZERO,
            average_cost: Decimal::ZERO,
            total_quantity: Decimal::ZERO,
            out_of_state: false,
            active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn match_unico_por_codigo() {
        let candidates = vec![product(Some("A1"), None), product(Some("B2"), Some("789"))];
        match ProductMatch::classify("A1", Some("789"), candidates) {
            ProductMatch::Unique(p) => assert_eq!(p.code.as_deref(), Some("A1")),
            other => panic!("esperava match único, veio {other:?}"),
        }
    }

    #[test]
    fn codigo_tem_precedencia_sobre_ean() {
        // O EAN aponta para outro produto; o código interno decide.
        let certo = product(Some("A1"), Some("111"));
        let errado = product(Some("B2"), Some("789"));
        let id_certo = certo.id;
        match ProductMatch::classify("A1", Some("789"), vec![certo, errado]) {
            ProductMatch::Unique(p) => assert_eq!(p.id, id_certo),
            other => panic!("esperava match único, veio {other:?}"),
        }
    }

    #[test]
    fn codigo_duplicado_e_ambiguo() {
        let candidates = vec![product(Some("A1"), None), product(Some("A1"), None)];
        match ProductMatch::classify("A1", None, candidates) {
            ProductMatch::Ambiguous { count, .. } => assert_eq!(count, 2),
            other => panic!("esperava ambíguo, veio {other:?}"),
        }
    }

    #[test]
    fn cai_no_ean_quando_codigo_nao_bate() {
        let candidates = vec![product(Some("X9"), Some("789"))];
        match ProductMatch::classify("A1", Some("789"), candidates) {
            ProductMatch::Unique(p) => assert_eq!(p.barcode.as_deref(), Some("789")),
            other => panic!("esperava match único, veio {other:?}"),
        }
    }

    #[test]
    fn sem_candidatos_e_not_found() {
        assert!(matches!(
            ProductMatch::classify("A1", None, vec![]),
            ProductMatch::NotFound
        ));
    }
}
