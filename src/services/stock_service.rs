// src/services/stock_service.rs

use rust_decimal::Decimal;
use sqlx::{Acquire, Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::{clock::SharedClock, error::AppError},
    db::{CatalogRepository, StockRepository},
    models::inventory::{MovementHistory, MovementKind, StockMovement, StockPosition},
};

/// Delta com sinal a partir do tipo de movimentação.
/// ENTRADA e SAIDA exigem quantidade positiva e o tipo dá o sinal;
/// AJUSTE carrega o próprio sinal (positivo entra, negativo sai).
pub fn signed_delta(kind: MovementKind, quantity: Decimal) -> Result<Decimal, AppError> {
    match kind {
        MovementKind::Entrada => {
            if quantity > Decimal::ZERO {
                Ok(quantity)
            } else {
                Err(AppError::Invalid(
                    "quantidade de entrada deve ser maior que zero".to_string(),
                ))
            }
        }
        MovementKind::Saida => {
            if quantity > Decimal::ZERO {
                Ok(-quantity)
            } else {
                Err(AppError::Invalid(
                    "quantidade de saída deve ser maior que zero".to_string(),
                ))
            }
        }
        MovementKind::Ajuste => {
            if quantity != Decimal::ZERO {
                Ok(quantity)
            } else {
                Err(AppError::Invalid(
                    "ajuste de estoque não pode ser zero".to_string(),
                ))
            }
        }
    }
}

/// Saldo resultante da movimentação. SAIDA não pode negativar o saldo;
/// AJUSTE pode, porque reflete a contagem física mesmo quando o sistema
/// estava errado para mais.
pub fn quantity_after(
    kind: MovementKind,
    product_id: Uuid,
    before: Decimal,
    delta: Decimal,
) -> Result<Decimal, AppError> {
    let after = before + delta;
    if kind == MovementKind::Saida && after < Decimal::ZERO {
        return Err(AppError::InsufficientStock {
            product_id,
            available: before,
            requested: -delta,
        });
    }
    Ok(after)
}

#[derive(Clone)]
pub struct StockService {
    stock_repo: StockRepository,
    catalog_repo: CatalogRepository,
    clock: SharedClock,
}

impl StockService {
    pub fn new(
        stock_repo: StockRepository,
        catalog_repo: CatalogRepository,
        clock: SharedClock,
    ) -> Self {
        Self {
            stock_repo,
            catalog_repo,
            clock,
        }
    }

    /// Lança uma movimentação no razão e atualiza a posição (produto x
    /// filial) na mesma transação.
    ///
    /// Ordem fixa: lock do produto, leitura do saldo, validação, append no
    /// razão com o saldo anterior, upsert da posição e recálculo do total
    /// do produto pela soma das posições.
    #[allow(clippy::too_many_arguments)]
    pub async fn post_movement<'e, E>(
        &self,
        executor: E,
        product_id: Uuid,
        location_id: Uuid,
        kind: MovementKind,
        quantity: Decimal,
        unit_value: Option<Decimal>,
        document_ref: Option<&str>,
        actor: Option<&str>,
    ) -> Result<StockMovement, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let delta = signed_delta(kind, quantity)?;

        let mut tx = executor.begin().await?;

        // Exclusão mútua por produto: compras/baixas concorrentes do mesmo
        // produto ficam serializadas aqui.
        self.catalog_repo
            .get_product_for_update(&mut *tx, product_id)
            .await?
            .ok_or_else(|| AppError::not_found("Produto", product_id))?;

        let before = self
            .stock_repo
            .get_position_for_update(&mut *tx, product_id, location_id)
            .await?
            .map(|p| p.quantity)
            .unwrap_or(Decimal::ZERO);

        quantity_after(kind, product_id, before, delta)?;

        let now = self.clock.now();
        let movement = self
            .stock_repo
            .insert_movement(
                &mut *tx,
                product_id,
                location_id,
                kind,
                delta,
                before,
                unit_value,
                document_ref,
                actor,
                now,
            )
            .await?;

        self.stock_repo
            .apply_position_delta(&mut *tx, product_id, location_id, delta, now)
            .await?;

        self.stock_repo
            .recompute_product_total(&mut *tx, product_id, now)
            .await?;

        tx.commit().await?;

        tracing::info!(
            %product_id,
            %location_id,
            ?kind,
            %delta,
            "movimentação de estoque lançada"
        );

        Ok(movement)
    }

    /// Posição de um produto numa filial. Nunca ter movimentado não é
    /// erro: devolve posição zerada.
    pub async fn get_position<'e, E>(
        &self,
        executor: E,
        product_id: Uuid,
        location_id: Uuid,
    ) -> Result<StockPosition, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let position = self
            .stock_repo
            .get_position(executor, product_id, location_id)
            .await?;
        Ok(position
            .unwrap_or_else(|| StockPosition::empty(product_id, location_id, self.clock.now())))
    }

    pub async fn list_positions<'e, E>(
        &self,
        executor: E,
        product_id: Uuid,
    ) -> Result<Vec<StockPosition>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.stock_repo
            .list_positions_for_product(executor, product_id)
            .await
    }

    /// Histórico (mais recente primeiro) + totais agregados do filtro,
    /// lidos num snapshot só.
    pub async fn movement_history<'e, E>(
        &self,
        executor: E,
        product_id: Uuid,
        location_id: Option<Uuid>,
    ) -> Result<MovementHistory, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let movements = self
            .stock_repo
            .list_movements(&mut *tx, product_id, location_id)
            .await?;
        let totals = self
            .stock_repo
            .movement_totals(&mut *tx, product_id, location_id)
            .await?;

        tx.commit().await?;

        Ok(MovementHistory { movements, totals })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn entrada_vira_delta_positivo() {
        assert_eq!(
            signed_delta(MovementKind::Entrada, dec!(5)).unwrap(),
            dec!(5)
        );
    }

    #[test]
    fn saida_vira_delta_negativo() {
        assert_eq!(signed_delta(MovementKind::Saida, dec!(5)).unwrap(), dec!(-5));
    }

    #[test]
    fn ajuste_mantem_o_proprio_sinal() {
        assert_eq!(
            signed_delta(MovementKind::Ajuste, dec!(-3)).unwrap(),
            dec!(-3)
        );
        assert_eq!(signed_delta(MovementKind::Ajuste, dec!(3)).unwrap(), dec!(3));
    }

    #[test]
    fn quantidade_nao_positiva_e_invalida() {
        assert!(matches!(
            signed_delta(MovementKind::Entrada, dec!(0)),
            Err(AppError::Invalid(_))
        ));
        assert!(matches!(
            signed_delta(MovementKind::Saida, dec!(-1)),
            Err(AppError::Invalid(_))
        ));
        assert!(matches!(
            signed_delta(MovementKind::Ajuste, dec!(0)),
            Err(AppError::Invalid(_))
        ));
    }

    #[test]
    fn saida_alem_do_saldo_e_estoque_insuficiente() {
        let product_id = Uuid::new_v4();
        let err =
            quantity_after(MovementKind::Saida, product_id, dec!(3), dec!(-5)).unwrap_err();
        match err {
            AppError::InsufficientStock {
                available,
                requested,
                ..
            } => {
                assert_eq!(available, dec!(3));
                assert_eq!(requested, dec!(5));
            }
            other => panic!("esperava estoque insuficiente, veio {other:?}"),
        }
    }

    #[test]
    fn saida_ate_zerar_e_permitida() {
        let after =
            quantity_after(MovementKind::Saida, Uuid::new_v4(), dec!(5), dec!(-5)).unwrap();
        assert_eq!(after, dec!(0));
    }

    #[test]
    fn ajuste_pode_negativar_o_saldo() {
        // Acerto de inventário reflete a contagem física, mesmo que o
        // sistema estivesse errado para mais.
        let after =
            quantity_after(MovementKind::Ajuste, Uuid::new_v4(), dec!(2), dec!(-10)).unwrap();
        assert_eq!(after, dec!(-8));
    }

    #[test]
    fn soma_dos_deltas_reconstroi_o_saldo() {
        // Propriedade do razão: posição = soma dos deltas aplicados.
        let deltas = [
            signed_delta(MovementKind::Entrada, dec!(10)).unwrap(),
            signed_delta(MovementKind::Saida, dec!(4)).unwrap(),
            signed_delta(MovementKind::Ajuste, dec!(-1)).unwrap(),
            signed_delta(MovementKind::Entrada, dec!(2.5)).unwrap(),
        ];
        let balance: Decimal = deltas.iter().sum();
        assert_eq!(balance, dec!(7.5));
    }
}
