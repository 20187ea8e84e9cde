use chrono::Datelike;
use sea_orm::{DatabaseTransaction, prelude::*};
use uuid::Uuid;

use crate::{
    Card, CreateTransactionCmd, Installment, InstallmentPlan, MoneyCents, Period, ResultEngine,
    Transaction, TransactionKind, transactions,
};

use super::super::{Engine, normalize_optional_text};

impl Engine {
    /// Fans a card purchase out into one transaction per installment.
    ///
    /// Amounts are split penny-exactly (remainder cents on the first
    /// installment). Installment k lands in the invoice of the purchase
    /// period advanced by (k - 1) months; a purchase made on or after the
    /// card's closing day already belongs to the following cycle. Invoices
    /// are resolved or created lazily per period.
    pub(in crate::ops) async fn create_installment_purchase(
        &self,
        db_tx: &DatabaseTransaction,
        cmd: &CreateTransactionCmd,
        plan: InstallmentPlan,
    ) -> ResultEngine<Vec<Transaction>> {
        let card_model = self.require_card(db_tx, plan.card_id).await?;
        let card = Card::try_from(card_model)?;

        let shares = MoneyCents::new(cmd.amount_minor).split_even(plan.count)?;
        let group_id = Uuid::new_v4();

        let mut first_period = Period::from_date(cmd.due_date);
        if cmd.due_date.day() >= card.closing_day {
            first_period = first_period.next();
        }

        let mut out = Vec::with_capacity(shares.len());
        for (index, share) in shares.iter().enumerate() {
            let target = first_period.plus_months(index as u32);
            let invoice = self.resolve_or_create_invoice(db_tx, &card, target).await?;

            let mut tx = Transaction::new(
                cmd.description.clone(),
                share.cents(),
                TransactionKind::CardPurchase,
                cmd.person.clone(),
                invoice.due_date,
            )?;
            tx.category = normalize_optional_text(cmd.category.as_deref());
            tx.notes = normalize_optional_text(cmd.notes.as_deref());
            tx.installment = Some(Installment {
                group_id,
                number: index as u32 + 1,
                count: plan.count,
                card_id: card.id,
                invoice_id: invoice.id,
            });

            transactions::ActiveModel::from(&tx).insert(db_tx).await?;
            out.push(tx);
        }

        tracing::info!(
            group = %group_id,
            card = %card.id,
            count = plan.count,
            total_minor = cmd.amount_minor,
            "created installment purchase"
        );
        Ok(out)
    }
}
