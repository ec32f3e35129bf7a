// src/common/error.rs

use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

// Nosso tipo de erro central, com `thiserror` para melhor ergonomia.
// A camada de API (fora deste crate) mapeia cada variante para um status
// HTTP; aqui carregamos apenas o tipo do erro + os ids de contexto.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    Validation(#[from] validator::ValidationErrors),

    // Valores escalares inválidos (quantidade não positiva, parcelas = 0...)
    #[error("Dados inválidos: {0}")]
    Invalid(String),

    #[error("{entity} não encontrado: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error(
        "Estoque insuficiente para o produto {product_id}: disponível {available}, solicitado {requested}"
    )]
    InsufficientStock {
        product_id: Uuid,
        available: Decimal,
        requested: Decimal,
    },

    #[error("Nota fiscal {0} já foi processada")]
    AlreadyProcessed(Uuid),

    #[error("Título {0} já foi quitado")]
    AlreadySettled(Uuid),

    #[error("Falha ao interpretar o XML da nota: {0}")]
    Parse(String),

    // Variante para erros de banco de dados (sqlx)
    #[error("Erro de banco de dados")]
    Database(#[from] sqlx::Error),

    // Variante genérica para qualquer outro erro inesperado.
    // `anyhow::Error` é ótimo para capturar o contexto do erro.
    #[error("Erro interno")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        AppError::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}
