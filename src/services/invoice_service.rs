// src/services/invoice_service.rs

use chrono::Days;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::{clock::SharedClock, error::AppError},
    db::{CatalogRepository, InvoiceRepository, LocationRepository, PartiesRepository},
    models::{
        catalog::ProductMatch,
        finance::{NewTitle, TitleKind},
        inventory::MovementKind,
        invoice::{IncomingInvoice, InvoiceProcessOutcome, InvoiceStatus},
        parties::{NewSupplier, Supplier},
    },
    nfe,
    services::{costing_service::CostingService, finance_service::FinanceService,
        stock_service::StockService},
};

#[derive(Clone)]
pub struct InvoiceService {
    // O pipeline é dono das próprias transações (e da marcação de ERRO,
    // que precisa sobreviver ao rollback), então carrega a pool.
    pool: PgPool,
    invoice_repo: InvoiceRepository,
    catalog_repo: CatalogRepository,
    parties_repo: PartiesRepository,
    location_repo: LocationRepository,
    costing: CostingService,
    stock: StockService,
    finance: FinanceService,
    clock: SharedClock,
}

impl InvoiceService {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        pool: PgPool,
        invoice_repo: InvoiceRepository,
        catalog_repo: CatalogRepository,
        parties_repo: PartiesRepository,
        location_repo: LocationRepository,
        costing: CostingService,
        stock: StockService,
        finance: FinanceService,
        clock: SharedClock,
    ) -> Self {
        Self {
            pool,
            invoice_repo,
            catalog_repo,
            parties_repo,
            location_repo,
            costing,
            stock,
            finance,
            clock,
        }
    }

    /// Analisa o XML e grava a nota como PENDENTE na filial de destino.
    /// Erro de parse acontece antes de qualquer escrita.
    pub async fn upload(
        &self,
        xml: &str,
        destination_tax_id: &str,
    ) -> Result<IncomingInvoice, AppError> {
        let parsed = nfe::parse_purchase_invoice(xml)?;

        let location = self
            .location_repo
            .find_by_tax_id(&self.pool, destination_tax_id)
            .await?
            .ok_or_else(|| AppError::not_found("Filial", destination_tax_id))?;

        let items = serde_json::to_value(&parsed.items)
            .map_err(|e| AppError::Internal(anyhow::anyhow!(e)))?;

        let invoice = self
            .invoice_repo
            .insert_invoice(&self.pool, &parsed, location.id, items, self.clock.now())
            .await?;

        tracing::info!(
            invoice_id = %invoice.id,
            number = %invoice.number,
            supplier = %invoice.supplier_name,
            "nota fiscal recebida para processamento"
        );

        Ok(invoice)
    }

    pub async fn list(&self) -> Result<Vec<IncomingInvoice>, AppError> {
        self.invoice_repo.list_invoices(&self.pool).await
    }

    pub async fn get(&self, id: Uuid) -> Result<IncomingInvoice, AppError> {
        self.invoice_repo
            .get_invoice(&self.pool, id)
            .await?
            .ok_or_else(|| AppError::not_found("Nota fiscal", id))
    }

    /// Processa uma nota PENDENTE: estoque + custo médio + conta a pagar +
    /// PROCESSADO, tudo ou nada. Falha depois do parse marca ERRO (fora da
    /// transação desfeita) e propaga o erro.
    pub async fn process(
        &self,
        invoice_id: Uuid,
        actor: Option<&str>,
    ) -> Result<InvoiceProcessOutcome, AppError> {
        match self.process_in_tx(invoice_id, actor).await {
            Ok(outcome) => {
                tracing::info!(
                    %invoice_id,
                    matched = outcome.matched_items,
                    skipped = outcome.skipped_items,
                    "nota fiscal processada"
                );
                Ok(outcome)
            }
            // Nota inexistente ou já terminal: nenhum estado mudou e o
            // status gravado não pode ser sobrescrito com ERRO.
            Err(err @ (AppError::NotFound { .. } | AppError::AlreadyProcessed(_))) => Err(err),
            Err(err) => {
                tracing::error!(%invoice_id, error = %err, "falha no processamento da nota");
                if let Err(mark_err) = self
                    .invoice_repo
                    .mark_error(&self.pool, invoice_id, &err.to_string())
                    .await
                {
                    tracing::error!(%invoice_id, error = %mark_err, "falha ao marcar nota com ERRO");
                }
                Err(err)
            }
        }
    }

    async fn process_in_tx(
        &self,
        invoice_id: Uuid,
        actor: Option<&str>,
    ) -> Result<InvoiceProcessOutcome, AppError> {
        let mut tx = self.pool.begin().await?;

        let invoice = self
            .invoice_repo
            .get_invoice_for_update(&mut *tx, invoice_id)
            .await?
            .ok_or_else(|| AppError::not_found("Nota fiscal", invoice_id))?;

        if invoice.status != InvoiceStatus::Pendente {
            return Err(AppError::AlreadyProcessed(invoice_id));
        }

        let supplier = self.resolve_supplier(&mut tx, &invoice).await?;

        let items = invoice
            .parsed_items()
            .map_err(|e| AppError::Internal(anyhow::anyhow!("itens da nota ilegíveis: {e}")))?;

        let document_ref = format!("NF {}", invoice.number);
        let mut matched = 0usize;
        let mut skipped = 0usize;

        for item in &items {
            let candidates = self
                .catalog_repo
                .find_by_code_or_barcode(&mut *tx, &item.code, item.ean.as_deref())
                .await?;

            match ProductMatch::classify(&item.code, item.ean.as_deref(), candidates) {
                ProductMatch::NotFound => {
                    // Item sem produto cadastrado não é erro: a nota pode
                    // cobrir mais catálogo do que o sistema conhece.
                    skipped += 1;
                    tracing::info!(code = %item.code, "item sem produto cadastrado, pulado");
                }
                ProductMatch::Ambiguous { reference, count } => {
                    skipped += 1;
                    tracing::warn!(
                        %reference,
                        count,
                        "item com cadastro ambíguo, pulado"
                    );
                }
                ProductMatch::Unique(product) => {
                    // Custo médio primeiro: ele lê a quantidade em mãos
                    // anterior à entrada desta mesma transação.
                    let costing = self
                        .costing
                        .apply_purchase(&mut *tx, product.id, item.quantity, item.unit_value)
                        .await?;

                    self.stock
                        .post_movement(
                            &mut *tx,
                            product.id,
                            invoice.location_id,
                            MovementKind::Entrada,
                            item.quantity,
                            Some(costing.landed_unit_cost),
                            Some(&document_ref),
                            actor,
                        )
                        .await?;

                    matched += 1;
                }
            }
        }

        // A conta a pagar sai pelo total declarado da nota, com ou sem
        // itens pulados.
        let due_date = self
            .clock
            .today()
            .checked_add_days(Days::new(
                u64::try_from(supplier.payment_term_days).unwrap_or(0),
            ))
            .ok_or_else(|| {
                AppError::Invalid("data de vencimento fora do intervalo suportado".to_string())
            })?;

        let payable = NewTitle {
            kind: TitleKind::Pagar,
            description: format!("{} - {}", document_ref, supplier.name),
            total_amount: invoice.total,
            first_due_date: due_date,
            installments: 1,
            supplier_id: Some(supplier.id),
            customer_id: None,
            invoice_id: Some(invoice.id),
        };
        let titles = self.finance.create_obligation(&mut *tx, &payable).await?;

        self.invoice_repo
            .mark_processed(&mut *tx, invoice.id, self.clock.now())
            .await?;

        tx.commit().await?;

        Ok(InvoiceProcessOutcome {
            invoice_id: invoice.id,
            matched_items: matched,
            skipped_items: skipped,
            payable_id: titles[0].id,
        })
    }

    /// Fornecedor pelo CNPJ do emitente; sem cadastro, cria na hora com o
    /// nome da nota.
    async fn resolve_supplier(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        invoice: &IncomingInvoice,
    ) -> Result<Supplier, AppError> {
        if let Some(supplier) = self
            .parties_repo
            .find_supplier_by_tax_id(&mut **tx, &invoice.supplier_tax_id)
            .await?
        {
            return Ok(supplier);
        }

        tracing::info!(
            tax_id = %invoice.supplier_tax_id,
            name = %invoice.supplier_name,
            "fornecedor não cadastrado, criando a partir da nota"
        );

        let payload = NewSupplier {
            name: invoice.supplier_name.clone(),
            tax_id: Some(invoice.supplier_tax_id.clone()),
            email: None,
            phone: None,
            address: None,
            city: None,
            state: None,
            contact: None,
            payment_term_days: 30,
        };
        self.parties_repo
            .create_supplier(&mut **tx, &payload, self.clock.now())
            .await
    }
}
