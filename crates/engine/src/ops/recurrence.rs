use chrono::NaiveDate;
use sea_orm::{DatabaseTransaction, QueryFilter, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    Period, ResultEngine, Transaction, period::next_month_clamped, transactions,
};

use super::{Engine, with_tx};

impl Engine {
    /// Materializes every recurring transaction occurrence due on or before
    /// `reference_date`.
    ///
    /// Each recurring transaction spawns its next occurrence one calendar
    /// month after its own due date (day-of-month preserved, clamped to the
    /// target month's last day). The copy is itself recurring, so the chain
    /// continues; the loop runs until a pass produces nothing, which
    /// back-fills several elapsed months in one call. An occurrence is only
    /// created when the source has none for that period yet, so re-running
    /// the expansion never duplicates.
    ///
    /// Returns the created occurrences, oldest first.
    pub async fn expand_recurrences(
        &self,
        reference_date: NaiveDate,
    ) -> ResultEngine<Vec<Transaction>> {
        with_tx!(self, |db_tx| {
            let mut created: Vec<Transaction> = Vec::new();

            loop {
                let templates = transactions::Entity::find()
                    .filter(transactions::Column::IsRecurring.eq(true))
                    .all(&db_tx)
                    .await?;

                let mut created_this_pass = false;
                for model in templates {
                    let template = Transaction::try_from(model)?;
                    let next_due = next_month_clamped(template.due_date);
                    if next_due > reference_date {
                        continue;
                    }
                    let period = Period::from_date(next_due);
                    if self
                        .occurrence_exists(&db_tx, template.id, period)
                        .await?
                    {
                        continue;
                    }

                    let mut occurrence = Transaction::new(
                        template.description.clone(),
                        template.amount_minor,
                        template.kind,
                        template.person.clone(),
                        next_due,
                    )?;
                    occurrence.category = template.category.clone();
                    occurrence.notes = template.notes.clone();
                    occurrence.is_recurring = true;
                    occurrence.recurring_source_id = Some(template.id);

                    transactions::ActiveModel::from(&occurrence)
                        .insert(&db_tx)
                        .await?;
                    tracing::debug!(
                        source = %template.id,
                        id = %occurrence.id,
                        due = %next_due,
                        "materialized recurring occurrence"
                    );
                    created.push(occurrence);
                    created_this_pass = true;
                }

                if !created_this_pass {
                    break;
                }
            }

            if !created.is_empty() {
                tracing::info!(count = created.len(), "expanded recurring transactions");
            }
            created.sort_by_key(|tx| tx.due_date);
            Ok(created)
        })
    }

    /// Whether `source` already has a materialized occurrence inside
    /// `period`.
    async fn occurrence_exists(
        &self,
        db_tx: &DatabaseTransaction,
        source_id: Uuid,
        period: Period,
    ) -> ResultEngine<bool> {
        transactions::Entity::find()
            .filter(transactions::Column::RecurringSourceId.eq(source_id.to_string()))
            .filter(transactions::Column::DueDate.gte(period.first_day()))
            .filter(transactions::Column::DueDate.lt(period.next().first_day()))
            .one(db_tx)
            .await
            .map(|model| model.is_some())
            .map_err(Into::into)
    }
}
