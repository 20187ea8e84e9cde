use chrono::Utc;
use sea_orm::{ModelTrait, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    CreateTransactionCmd, EngineError, ResultEngine, Transaction, TransactionKind,
    TransactionStatus, UpdateTransactionCmd, invoices, transactions,
};

use super::super::{Engine, normalize_optional_text, with_tx};

impl Engine {
    /// Creates one transaction, or a whole installment group when the
    /// command carries an installment plan.
    ///
    /// Returns every created transaction (a singleton for the plain path).
    /// The fan-out is atomic: either all installments land with their
    /// invoices, or none do.
    pub async fn create_transaction(
        &self,
        cmd: CreateTransactionCmd,
    ) -> ResultEngine<Vec<Transaction>> {
        if cmd.is_recurring && cmd.installments.is_some() {
            return Err(EngineError::Validation(
                "a transaction cannot be recurring and split in installments".to_string(),
            ));
        }
        match (cmd.kind, &cmd.installments) {
            (TransactionKind::CardPurchase, None) => {
                return Err(EngineError::Validation(
                    "card purchases require an installment plan".to_string(),
                ));
            }
            (kind, Some(_)) if kind != TransactionKind::CardPurchase => {
                return Err(EngineError::Validation(
                    "installment plans are only valid for card purchases".to_string(),
                ));
            }
            _ => {}
        }

        with_tx!(self, |db_tx| {
            match cmd.installments {
                Some(plan) => self.create_installment_purchase(&db_tx, &cmd, plan).await,
                None => {
                    let mut tx = Transaction::new(
                        cmd.description.clone(),
                        cmd.amount_minor,
                        cmd.kind,
                        cmd.person.clone(),
                        cmd.due_date,
                    )?;
                    tx.category = normalize_optional_text(cmd.category.as_deref());
                    tx.notes = normalize_optional_text(cmd.notes.as_deref());
                    tx.is_recurring = cmd.is_recurring;

                    transactions::ActiveModel::from(&tx).insert(&db_tx).await?;
                    tracing::debug!(id = %tx.id, kind = tx.kind.as_str(), "created transaction");
                    Ok(vec![tx])
                }
            }
        })
    }

    /// Updates an existing transaction. Unset command fields are left as-is.
    pub async fn update_transaction(
        &self,
        cmd: UpdateTransactionCmd,
    ) -> ResultEngine<Transaction> {
        with_tx!(self, |db_tx| {
            let model = self.require_transaction(&db_tx, cmd.transaction_id).await?;
            let mut tx = Transaction::try_from(model)?;
            self.require_unfrozen_invoice(&db_tx, &tx).await?;

            if let Some(description) = &cmd.description {
                let description = description.trim();
                if description.is_empty() {
                    return Err(EngineError::Validation(
                        "description must not be empty".to_string(),
                    ));
                }
                tx.description = description.to_string();
            }
            if let Some(amount_minor) = cmd.amount_minor {
                if amount_minor <= 0 {
                    return Err(EngineError::Validation(
                        "amount_minor must be > 0".to_string(),
                    ));
                }
                tx.amount_minor = amount_minor;
            }
            if let Some(kind) = cmd.kind {
                if tx.installment.is_some() && kind != TransactionKind::CardPurchase {
                    return Err(EngineError::Validation(
                        "an installment stays a card purchase".to_string(),
                    ));
                }
                tx.kind = kind;
            }
            if let Some(person) = cmd.person {
                tx.person = person;
            }
            if let Some(category) = &cmd.category {
                tx.category = normalize_optional_text(Some(category));
            }
            if let Some(due_date) = cmd.due_date {
                tx.due_date = due_date;
            }
            if let Some(notes) = &cmd.notes {
                tx.notes = normalize_optional_text(Some(notes));
            }
            if let Some(is_recurring) = cmd.is_recurring {
                if is_recurring && tx.installment.is_some() {
                    return Err(EngineError::Validation(
                        "a transaction cannot be recurring and split in installments".to_string(),
                    ));
                }
                tx.is_recurring = is_recurring;
            }

            tx.updated_at = Utc::now();
            transactions::ActiveModel::from(&tx).update(&db_tx).await?;
            Ok(tx)
        })
    }

    /// Deletes a transaction.
    ///
    /// Deleting one installment removes only that entry; its siblings keep
    /// their group and counters.
    pub async fn delete_transaction(&self, transaction_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let model = self.require_transaction(&db_tx, transaction_id).await?;
            let tx = Transaction::try_from(model.clone())?;
            self.require_unfrozen_invoice(&db_tx, &tx).await?;

            model.delete(&db_tx).await?;
            tracing::debug!(id = %transaction_id, "deleted transaction");
            Ok(())
        })
    }

    /// Flips a pending transaction to paid. The transition is one-way.
    pub async fn mark_transaction_paid(&self, transaction_id: Uuid) -> ResultEngine<Transaction> {
        with_tx!(self, |db_tx| {
            let model = self.require_transaction(&db_tx, transaction_id).await?;
            let mut tx = Transaction::try_from(model)?;
            if tx.status == TransactionStatus::Paid {
                return Err(EngineError::InvalidState(
                    "transaction already paid".to_string(),
                ));
            }

            tx.status = TransactionStatus::Paid;
            tx.updated_at = Utc::now();
            transactions::ActiveModel::from(&tx).update(&db_tx).await?;
            Ok(tx)
        })
    }

    /// A transaction linked to a closed or paid invoice is frozen together
    /// with the invoice: its amount set must stay exactly what was summed at
    /// closing time.
    async fn require_unfrozen_invoice(
        &self,
        db_tx: &sea_orm::DatabaseTransaction,
        tx: &Transaction,
    ) -> ResultEngine<()> {
        let Some(installment) = &tx.installment else {
            return Ok(());
        };
        let invoice_model = self.require_invoice(db_tx, installment.invoice_id).await?;
        let invoice = invoices::Invoice::try_from(invoice_model)?;
        if invoice.status != invoices::InvoiceStatus::Open {
            return Err(EngineError::InvalidState(
                "invoice is no longer open".to_string(),
            ));
        }
        Ok(())
    }
}
