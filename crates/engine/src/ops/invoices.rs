use chrono::Utc;
use sea_orm::{
    ActiveValue, DatabaseTransaction, ModelTrait, PaginatorTrait, QueryFilter, QueryOrder,
    TransactionTrait, prelude::*,
};
use uuid::Uuid;

use crate::{
    Card, EngineError, Invoice, InvoiceStatus, Period, ResultEngine, invoices, transactions,
};

use super::{Engine, with_tx};

/// Filters for listing invoices. All fields are optional and combine with
/// AND.
#[derive(Clone, Debug, Default)]
pub struct InvoiceListFilter {
    pub card_id: Option<Uuid>,
    pub month: Option<u32>,
    pub year: Option<i32>,
    pub status: Option<InvoiceStatus>,
}

impl Engine {
    /// Lists invoices, newest billing period first.
    pub async fn list_invoices(&self, filter: &InvoiceListFilter) -> ResultEngine<Vec<Invoice>> {
        with_tx!(self, |db_tx| {
            let mut query = invoices::Entity::find()
                .order_by_desc(invoices::Column::Year)
                .order_by_desc(invoices::Column::Month);

            if let Some(card_id) = filter.card_id {
                query = query.filter(invoices::Column::CardId.eq(card_id.to_string()));
            }
            if let Some(month) = filter.month {
                query = query.filter(invoices::Column::Month.eq(month as i32));
            }
            if let Some(year) = filter.year {
                query = query.filter(invoices::Column::Year.eq(year));
            }
            if let Some(status) = filter.status {
                query = query.filter(invoices::Column::Status.eq(status.as_str()));
            }

            let rows = query.all(&db_tx).await?;
            let mut out = Vec::with_capacity(rows.len());
            for model in rows {
                out.push(Invoice::try_from(model)?);
            }
            Ok(out)
        })
    }

    /// Returns a single invoice by id.
    pub async fn find_invoice(&self, invoice_id: Uuid) -> ResultEngine<Invoice> {
        with_tx!(self, |db_tx| {
            let model = self.require_invoice(&db_tx, invoice_id).await?;
            Invoice::try_from(model)
        })
    }

    /// Explicitly creates the invoice of a card for one billing period.
    ///
    /// The same period is normally materialized lazily by the installment
    /// splitter; creating it twice is a conflict either way.
    pub async fn create_invoice(
        &self,
        card_id: Uuid,
        month: u32,
        year: i32,
    ) -> ResultEngine<Invoice> {
        let period = Period::new(year, month)?;
        with_tx!(self, |db_tx| {
            let card_model = self.require_card(&db_tx, card_id).await?;
            let card = Card::try_from(card_model)?;

            if self.find_invoice_for_period(&db_tx, card_id, period).await?.is_some() {
                return Err(EngineError::Conflict(
                    "invoice already exists for this card and period".to_string(),
                ));
            }

            let invoice = Invoice::open(&card, period);
            invoices::ActiveModel::from(&invoice).insert(&db_tx).await?;
            Ok(invoice)
        })
    }

    /// Closes an open invoice: freezes the sum of its linked transactions
    /// into `total_amount_minor` and flips every linked transaction to paid.
    ///
    /// Runs inside one database transaction; a failure rolls the whole close
    /// back. Closing anything but an open invoice fails, and a second close
    /// leaves the frozen total untouched.
    pub async fn close_invoice(&self, invoice_id: Uuid) -> ResultEngine<Invoice> {
        with_tx!(self, |db_tx| {
            let model = self.require_invoice(&db_tx, invoice_id).await?;
            let mut invoice = Invoice::try_from(model)?;
            if invoice.status != InvoiceStatus::Open {
                return Err(EngineError::InvalidState(
                    "invoice already closed".to_string(),
                ));
            }

            let rows = transactions::Entity::find()
                .filter(transactions::Column::InvoiceId.eq(invoice_id.to_string()))
                .all(&db_tx)
                .await?;

            let total_minor: i64 = rows.iter().map(|row| row.amount_minor).sum();
            let now = Utc::now();

            let linked = rows.len();
            for row in rows {
                let paid = transactions::ActiveModel {
                    id: ActiveValue::Set(row.id),
                    status: ActiveValue::Set(crate::TransactionStatus::Paid.as_str().to_string()),
                    updated_at: ActiveValue::Set(now),
                    ..Default::default()
                };
                paid.update(&db_tx).await?;
            }

            invoice.total_amount_minor = total_minor;
            invoice.status = InvoiceStatus::Closed;
            invoice.updated_at = now;
            invoices::ActiveModel::from(&invoice).update(&db_tx).await?;

            tracing::info!(
                invoice = %invoice_id,
                total_minor,
                transactions = linked,
                "closed invoice"
            );
            Ok(invoice)
        })
    }

    /// Marks a closed invoice as settled. Linked transactions are untouched;
    /// they were already flipped to paid when the invoice closed.
    pub async fn mark_invoice_paid(&self, invoice_id: Uuid) -> ResultEngine<Invoice> {
        with_tx!(self, |db_tx| {
            let model = self.require_invoice(&db_tx, invoice_id).await?;
            let mut invoice = Invoice::try_from(model)?;
            if invoice.status != InvoiceStatus::Closed {
                return Err(EngineError::InvalidState("invoice not closed".to_string()));
            }

            invoice.status = InvoiceStatus::Paid;
            invoice.updated_at = Utc::now();
            invoices::ActiveModel::from(&invoice).update(&db_tx).await?;
            Ok(invoice)
        })
    }

    /// Deletes an open invoice with no linked transactions.
    pub async fn delete_invoice(&self, invoice_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let model = self.require_invoice(&db_tx, invoice_id).await?;
            let invoice = Invoice::try_from(model.clone())?;
            if invoice.status != InvoiceStatus::Open {
                return Err(EngineError::InvalidState(
                    "cannot delete a settled invoice".to_string(),
                ));
            }

            let linked = transactions::Entity::find()
                .filter(transactions::Column::InvoiceId.eq(invoice_id.to_string()))
                .count(&db_tx)
                .await?;
            if linked > 0 {
                return Err(EngineError::Conflict(
                    "invoice has linked transactions".to_string(),
                ));
            }

            model.delete(&db_tx).await?;
            Ok(())
        })
    }

    async fn find_invoice_for_period(
        &self,
        db_tx: &DatabaseTransaction,
        card_id: Uuid,
        period: Period,
    ) -> ResultEngine<Option<invoices::Model>> {
        invoices::Entity::find()
            .filter(invoices::Column::CardId.eq(card_id.to_string()))
            .filter(invoices::Column::Year.eq(period.year))
            .filter(invoices::Column::Month.eq(period.month as i32))
            .one(db_tx)
            .await
            .map_err(Into::into)
    }

    /// Returns the invoice of `card` for `period`, creating it open when the
    /// period has none yet.
    pub(super) async fn resolve_or_create_invoice(
        &self,
        db_tx: &DatabaseTransaction,
        card: &Card,
        period: Period,
    ) -> ResultEngine<Invoice> {
        if let Some(model) = self.find_invoice_for_period(db_tx, card.id, period).await? {
            return Invoice::try_from(model);
        }

        let invoice = Invoice::open(card, period);
        invoices::ActiveModel::from(&invoice).insert(db_tx).await?;
        tracing::debug!(invoice = %invoice.id, card = %card.id, "created invoice lazily");
        Ok(invoice)
    }
}
