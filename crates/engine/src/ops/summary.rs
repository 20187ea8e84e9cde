use sea_orm::{QueryFilter, TransactionTrait, prelude::*};
use serde::{Deserialize, Serialize};

use crate::{Period, Person, ResultEngine, TransactionKind, TransactionStatus, transactions};

use super::{Engine, with_tx};

/// Totals of one (view, month, year) window, in integer cents.
///
/// The balance is deliberately absent: callers derive it as
/// `total_income_minor - total_expense_minor`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryTotals {
    /// Sum of income amounts.
    pub total_income_minor: i64,
    /// Sum of expenses, card purchases and savings withdrawals. Deposits are
    /// not spending and stay out.
    pub total_expense_minor: i64,
    /// Sum of pending amounts, any kind.
    pub total_pending_minor: i64,
    /// Sum of card purchase amounts.
    pub total_card_minor: i64,
    /// Savings deposits minus savings withdrawals; negative when more was
    /// taken out than put in.
    pub total_savings_minor: i64,
}

impl Engine {
    /// Computes the summary totals of one view for one month.
    ///
    /// Pure read: filters transactions by person and due-date window, then
    /// folds the amounts in integer arithmetic.
    pub async fn get_summary(
        &self,
        view: &Person,
        month: u32,
        year: i32,
    ) -> ResultEngine<SummaryTotals> {
        let period = Period::new(year, month)?;
        with_tx!(self, |db_tx| {
            let rows = transactions::Entity::find()
                .filter(transactions::Column::Person.eq(view.as_str()))
                .filter(transactions::Column::DueDate.gte(period.first_day()))
                .filter(transactions::Column::DueDate.lt(period.next().first_day()))
                .all(&db_tx)
                .await?;

            let mut totals = SummaryTotals::default();
            for row in rows {
                let kind = TransactionKind::try_from(row.kind.as_str())?;
                let status = TransactionStatus::try_from(row.status.as_str())?;
                let amount = row.amount_minor;

                match kind {
                    TransactionKind::Income => totals.total_income_minor += amount,
                    TransactionKind::Expense => {}
                    TransactionKind::CardPurchase => totals.total_card_minor += amount,
                    TransactionKind::SavingsDeposit => totals.total_savings_minor += amount,
                    TransactionKind::SavingsWithdrawal => totals.total_savings_minor -= amount,
                }
                if kind.is_outflow() {
                    totals.total_expense_minor += amount;
                }
                if status == TransactionStatus::Pending {
                    totals.total_pending_minor += amount;
                }
            }
            Ok(totals)
        })
    }
}
