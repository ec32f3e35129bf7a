// src/services/costing_service.rs

use rust_decimal::Decimal;
use sqlx::{Acquire, Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::{clock::SharedClock, error::AppError},
    db::CatalogRepository,
};

/// Casas decimais do custo médio. O arredondamento a cada recálculo
/// limita o acúmulo de resíduo ao longo de compras repetidas.
pub const AVERAGE_COST_SCALE: u32 = 4;

// Diferencial de alíquota de ICMS embutido no custo de mercadoria
// comprada de fora do estado.
fn out_of_state_rate() -> Decimal {
    Decimal::new(6, 2) // 6%
}

/// Custo de entrada efetivo: produto sinalizado como de fora do estado
/// recebe o diferencial antes de entrar na média.
pub fn landed_unit_cost(unit_cost: Decimal, out_of_state: bool) -> Decimal {
    if out_of_state {
        (unit_cost * (Decimal::ONE + out_of_state_rate())).round_dp(AVERAGE_COST_SCALE)
    } else {
        unit_cost
    }
}

/// Média ponderada do custo. Com estoque zerado (ou negativo) a média
/// antiga não corresponde a mercadoria nenhuma: o custo novo entra puro,
/// sem blend.
pub fn blended_average_cost(
    on_hand: Decimal,
    current_average: Decimal,
    incoming_quantity: Decimal,
    incoming_cost: Decimal,
) -> Decimal {
    if on_hand <= Decimal::ZERO {
        return incoming_cost.round_dp(AVERAGE_COST_SCALE);
    }
    let blended = (on_hand * current_average + incoming_quantity * incoming_cost)
        / (on_hand + incoming_quantity);
    blended.round_dp(AVERAGE_COST_SCALE)
}

/// Resultado do recálculo de uma compra.
#[derive(Debug, Clone, Copy)]
pub struct PurchaseCosting {
    pub average_cost: Decimal,
    pub landed_unit_cost: Decimal,
}

#[derive(Clone)]
pub struct CostingService {
    catalog_repo: CatalogRepository,
    clock: SharedClock,
}

impl CostingService {
    pub fn new(catalog_repo: CatalogRepository, clock: SharedClock) -> Self {
        Self { catalog_repo, clock }
    }

    /// Recalcula o custo médio do produto para uma entrada de compra.
    ///
    /// Tranca a linha do produto e lê a quantidade em mãos ANTES da baixa
    /// no estoque: deve rodar antes do lançamento da movimentação na mesma
    /// transação, e o lock serializa compras concorrentes do mesmo produto.
    pub async fn apply_purchase<'e, E>(
        &self,
        executor: E,
        product_id: Uuid,
        quantity: Decimal,
        unit_cost: Decimal,
    ) -> Result<PurchaseCosting, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        if quantity <= Decimal::ZERO {
            return Err(AppError::Invalid(
                "quantidade da compra deve ser maior que zero".to_string(),
            ));
        }
        if unit_cost < Decimal::ZERO {
            return Err(AppError::Invalid(
                "custo unitário não pode ser negativo".to_string(),
            ));
        }

        let mut tx = executor.begin().await?;

        let product = self
            .catalog_repo
            .get_product_for_update(&mut *tx, product_id)
            .await?
            .ok_or_else(|| AppError::not_found("Produto", product_id))?;

        let landed = landed_unit_cost(unit_cost, product.out_of_state);
        let average_cost = blended_average_cost(
            product.total_quantity,
            product.average_cost,
            quantity,
            landed,
        );

        // `last_purchase_price` guarda o valor de nota, sem o diferencial.
        self.catalog_repo
            .update_costs(&mut *tx, product_id, average_cost, unit_cost, self.clock.now())
            .await?;

        tx.commit().await?;

        tracing::debug!(
            %product_id,
            %quantity,
            %average_cost,
            "custo médio recalculado"
        );

        Ok(PurchaseCosting {
            average_cost,
            landed_unit_cost: landed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn estoque_zerado_assume_o_custo_da_compra() {
        // Média antiga "órfã" (sem estoque) não pode contaminar o custo novo.
        let avg = blended_average_cost(dec!(0), dec!(99.9999), dec!(10), dec!(2.50));
        assert_eq!(avg, dec!(2.50));
    }

    #[test]
    fn estoque_negativo_tambem_assume_o_custo_da_compra() {
        let avg = blended_average_cost(dec!(-3), dec!(1.00), dec!(10), dec!(2.00));
        assert_eq!(avg, dec!(2.00));
    }

    #[test]
    fn duas_compras_a_partir_do_zero_dao_a_media_ponderada() {
        // (10 * 2.00 + 5 * 3.50) / 15 = 2.5000
        let first = blended_average_cost(dec!(0), dec!(0), dec!(10), dec!(2.00));
        let second = blended_average_cost(dec!(10), first, dec!(5), dec!(3.50));
        assert_eq!(second, dec!(2.5000));
    }

    #[test]
    fn media_e_arredondada_em_quatro_casas() {
        // (3 * 1.00 + 3 * 2.00) / 6 = 1.5; (1 * 1.00 + 2 * 2.00) / 3 = 1.6667
        let avg = blended_average_cost(dec!(1), dec!(1.00), dec!(2), dec!(2.00));
        assert_eq!(avg, dec!(1.6667));
    }

    #[test]
    fn compra_de_fora_do_estado_recebe_diferencial() {
        assert_eq!(landed_unit_cost(dec!(100.00), true), dec!(106.0000));
        assert_eq!(landed_unit_cost(dec!(100.00), false), dec!(100.00));
    }

    #[test]
    fn diferencial_entra_na_media() {
        // Entrada de 10 un a 1.00 com diferencial: custo efetivo 1.06
        let landed = landed_unit_cost(dec!(1.00), true);
        let avg = blended_average_cost(dec!(0), dec!(0), dec!(10), landed);
        assert_eq!(avg, dec!(1.0600));
    }
}
