// src/services/finance_service.rs

use chrono::{Months, NaiveDate};
use rust_decimal::{Decimal, RoundingStrategy};
use sqlx::{Acquire, Executor, Postgres};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{clock::SharedClock, error::AppError},
    db::FinanceRepository,
    models::finance::{
        BankAccount, BankAccountPatch, FinancialTitle, NewBankAccount, NewTitle, TitleKind,
        TitleStatus,
    },
};

pub const MONEY_SCALE: u32 = 2;

/// Uma parcela calculada, pronta para virar título.
#[derive(Debug, Clone, PartialEq)]
pub struct InstallmentSlice {
    pub number: u32,
    pub amount: Decimal,
    pub due_date: NaiveDate,
    pub description: String,
}

/// Divide uma obrigação em parcelas mensais.
///
/// Cada parcela vale total/N arredondado em 2 casas; a última absorve o
/// resíduo do arredondamento, então a soma das parcelas bate com o total.
/// Vencimentos avançam de mês em mês a partir do primeiro (dia 31 vira o
/// último dia do mês mais curto).
pub fn split_installments(
    description: &str,
    total: Decimal,
    count: u32,
    first_due: NaiveDate,
) -> Result<Vec<InstallmentSlice>, AppError> {
    if total <= Decimal::ZERO {
        return Err(AppError::Invalid(
            "valor total deve ser maior que zero".to_string(),
        ));
    }
    if count == 0 {
        return Err(AppError::Invalid(
            "número de parcelas deve ser pelo menos 1".to_string(),
        ));
    }

    if count == 1 {
        return Ok(vec![InstallmentSlice {
            number: 1,
            amount: total,
            due_date: first_due,
            description: description.to_string(),
        }]);
    }

    let base = (total / Decimal::from(count))
        .round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero);

    let mut slices = Vec::with_capacity(count as usize);
    for number in 1..=count {
        let due_date = first_due
            .checked_add_months(Months::new(number - 1))
            .ok_or_else(|| {
                AppError::Invalid("data de vencimento fora do intervalo suportado".to_string())
            })?;

        let amount = if number == count {
            total - base * Decimal::from(count - 1)
        } else {
            base
        };

        slices.push(InstallmentSlice {
            number,
            amount,
            due_date,
            description: format!("{description} - Parcela {number}/{count}"),
        });
    }

    Ok(slices)
}

#[derive(Clone)]
pub struct FinanceService {
    repo: FinanceRepository,
    clock: SharedClock,
}

impl FinanceService {
    pub fn new(repo: FinanceRepository, clock: SharedClock) -> Self {
        Self { repo, clock }
    }

    /// Cria os títulos de uma obrigação (1..N parcelas) numa transação só.
    pub async fn create_obligation<'e, E>(
        &self,
        executor: E,
        payload: &NewTitle,
    ) -> Result<Vec<FinancialTitle>, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        payload.validate()?;

        let slices = split_installments(
            &payload.description,
            payload.total_amount,
            payload.installments,
            payload.first_due_date,
        )?;

        let now = self.clock.now();
        let count = slices.len() as i32;

        let mut tx = executor.begin().await?;
        let mut titles = Vec::with_capacity(slices.len());
        for slice in &slices {
            let title = self
                .repo
                .insert_title(
                    &mut *tx,
                    payload.kind,
                    &slice.description,
                    slice.amount,
                    slice.due_date,
                    slice.number as i32,
                    count,
                    payload.supplier_id,
                    payload.customer_id,
                    payload.invoice_id,
                    now,
                )
                .await?;
            titles.push(title);
        }
        tx.commit().await?;

        Ok(titles)
    }

    pub async fn list_titles<'e, E>(
        &self,
        executor: E,
        kind: Option<TitleKind>,
        status: Option<TitleStatus>,
    ) -> Result<Vec<FinancialTitle>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.list_titles(executor, kind, status).await
    }

    /// Baixa de um título: PENDENTE -> PAGO + ajuste do saldo bancário,
    /// atomicamente. Título já PAGO é rejeitado, nunca re-aplicado.
    pub async fn settle<'e, E>(
        &self,
        executor: E,
        title_id: Uuid,
        bank_account_id: Uuid,
        amount_paid: Decimal,
        paid_at: NaiveDate,
    ) -> Result<FinancialTitle, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        if amount_paid <= Decimal::ZERO {
            return Err(AppError::Invalid(
                "valor pago deve ser maior que zero".to_string(),
            ));
        }

        let mut tx = executor.begin().await?;

        let title = self
            .repo
            .get_title_for_update(&mut *tx, title_id)
            .await?
            .ok_or_else(|| AppError::not_found("Título", title_id))?;

        if title.status == TitleStatus::Pago {
            return Err(AppError::AlreadySettled(title_id));
        }

        let account = self
            .repo
            .get_account_for_update(&mut *tx, bank_account_id)
            .await?
            .ok_or_else(|| AppError::not_found("Conta bancária", bank_account_id))?;

        let updated = self
            .repo
            .mark_paid(
                &mut *tx,
                title_id,
                account.id,
                amount_paid,
                paid_at,
                self.clock.now(),
            )
            .await?;

        // Pagar debita, receber credita.
        let delta = match title.kind {
            TitleKind::Pagar => -amount_paid,
            TitleKind::Receber => amount_paid,
        };
        self.repo.adjust_balance(&mut *tx, account.id, delta).await?;

        tx.commit().await?;

        tracing::info!(%title_id, %bank_account_id, %amount_paid, "título baixado");

        Ok(updated)
    }

    // --- Contas bancárias ---

    pub async fn create_account<'e, E>(
        &self,
        executor: E,
        payload: &NewBankAccount,
    ) -> Result<BankAccount, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        payload.validate()?;
        self.repo
            .create_account(executor, payload, self.clock.now())
            .await
    }

    pub async fn list_accounts<'e, E>(&self, executor: E) -> Result<Vec<BankAccount>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.list_accounts(executor).await
    }

    pub async fn update_account<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        patch: &BankAccountPatch,
    ) -> Result<BankAccount, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        patch.validate()?;
        self.repo
            .update_account(executor, id, patch)
            .await?
            .ok_or_else(|| AppError::not_found("Conta bancária", id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parcela_unica_fica_com_o_valor_cheio() {
        let slices =
            split_installments("Compra de insumos", dec!(100.00), 1, date(2024, 3, 10)).unwrap();
        assert_eq!(slices.len(), 1);
        assert_eq!(slices[0].amount, dec!(100.00));
        assert_eq!(slices[0].due_date, date(2024, 3, 10));
        // Sem marcador de parcela quando não há parcelamento
        assert_eq!(slices[0].description, "Compra de insumos");
    }

    #[test]
    fn tres_parcelas_de_cem_somam_cem() {
        let slices = split_installments("Aluguel", dec!(100.00), 3, date(2024, 1, 15)).unwrap();

        assert_eq!(slices[0].amount, dec!(33.33));
        assert_eq!(slices[1].amount, dec!(33.33));
        // A última absorve o resíduo do arredondamento
        assert_eq!(slices[2].amount, dec!(33.34));

        let total: Decimal = slices.iter().map(|s| s.amount).sum();
        assert_eq!(total, dec!(100.00));
    }

    #[test]
    fn vencimentos_avancam_um_mes_por_parcela() {
        let slices = split_installments("Aluguel", dec!(100.00), 3, date(2024, 1, 15)).unwrap();
        assert_eq!(slices[0].due_date, date(2024, 1, 15));
        assert_eq!(slices[1].due_date, date(2024, 2, 15));
        assert_eq!(slices[2].due_date, date(2024, 3, 15));
    }

    #[test]
    fn dia_31_encolhe_para_o_fim_do_mes_curto() {
        let slices = split_installments("Compra", dec!(90.00), 3, date(2024, 1, 31)).unwrap();
        assert_eq!(slices[1].due_date, date(2024, 2, 29)); // bissexto
        assert_eq!(slices[2].due_date, date(2024, 3, 31));
    }

    #[test]
    fn descricao_ganha_o_marcador_de_parcela() {
        let slices = split_installments("Frete", dec!(60.00), 2, date(2024, 5, 1)).unwrap();
        assert_eq!(slices[0].description, "Frete - Parcela 1/2");
        assert_eq!(slices[1].description, "Frete - Parcela 2/2");
    }

    #[test]
    fn zero_parcelas_e_invalido() {
        assert!(matches!(
            split_installments("X", dec!(10.00), 0, date(2024, 1, 1)),
            Err(AppError::Invalid(_))
        ));
    }

    #[test]
    fn valor_nao_positivo_e_invalido() {
        assert!(matches!(
            split_installments("X", dec!(0), 2, date(2024, 1, 1)),
            Err(AppError::Invalid(_))
        ));
    }

    fn title(status: TitleStatus, due: NaiveDate) -> FinancialTitle {
        let created: DateTime<Utc> = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        FinancialTitle {
            id: Uuid::new_v4(),
            description: "Teste".to_string(),
            kind: TitleKind::Pagar,
            status,
            amount: dec!(10.00),
            paid_amount: None,
            paid_at: None,
            due_date: due,
            installment_number: 1,
            installment_count: 1,
            supplier_id: None,
            customer_id: None,
            bank_account_id: None,
            invoice_id: None,
            created_at: created,
            updated_at: created,
        }
    }

    #[test]
    fn pendente_com_vencimento_passado_esta_vencido() {
        let t = title(TitleStatus::Pendente, date(2024, 2, 1));
        assert!(t.is_overdue(date(2024, 2, 2)));
        assert_eq!(t.display_status(date(2024, 2, 2)), "VENCIDO");
    }

    #[test]
    fn pendente_no_dia_do_vencimento_nao_esta_vencido() {
        let t = title(TitleStatus::Pendente, date(2024, 2, 1));
        assert!(!t.is_overdue(date(2024, 2, 1)));
        assert_eq!(t.display_status(date(2024, 2, 1)), "PENDENTE");
    }

    #[test]
    fn pago_nunca_esta_vencido() {
        let t = title(TitleStatus::Pago, date(2020, 1, 1));
        assert!(!t.is_overdue(date(2024, 1, 1)));
        assert_eq!(t.display_status(date(2024, 1, 1)), "PAGO");
    }
}
