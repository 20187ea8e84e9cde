use sea_orm::{QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, Period, Person, ResultEngine, Transaction, TransactionKind, TransactionStatus,
    transactions,
};

use super::super::{Engine, with_tx};

/// Filters for listing transactions inside a (view, period) window.
#[derive(Clone, Debug, Default)]
pub struct TransactionListFilter {
    /// If present, only transactions with this status.
    pub status: Option<TransactionStatus>,
    /// If present, acts as an allow-list of kinds to return.
    pub kinds: Option<Vec<TransactionKind>>,
}

fn validate_list_filter(filter: &TransactionListFilter) -> ResultEngine<()> {
    if filter.kinds.as_ref().is_some_and(|k| k.is_empty()) {
        return Err(EngineError::Validation(
            "kinds must not be empty".to_string(),
        ));
    }
    Ok(())
}

impl Engine {
    /// Lists the transactions of one view (a person or the shared pool) with
    /// a due date inside the given month.
    ///
    /// Ordered newest → older by `(due_date DESC, id DESC)`.
    pub async fn list_transactions(
        &self,
        view: &Person,
        month: u32,
        year: i32,
        filter: &TransactionListFilter,
    ) -> ResultEngine<Vec<Transaction>> {
        let period = Period::new(year, month)?;
        with_tx!(self, |db_tx| {
            validate_list_filter(filter)?;

            let mut query = transactions::Entity::find()
                .filter(transactions::Column::Person.eq(view.as_str()))
                .filter(transactions::Column::DueDate.gte(period.first_day()))
                .filter(transactions::Column::DueDate.lt(period.next().first_day()))
                .order_by_desc(transactions::Column::DueDate)
                .order_by_desc(transactions::Column::Id);

            if let Some(status) = filter.status {
                query = query.filter(transactions::Column::Status.eq(status.as_str()));
            }
            if let Some(kinds) = &filter.kinds {
                let kinds: Vec<String> = kinds.iter().map(|k| k.as_str().to_string()).collect();
                query = query.filter(transactions::Column::Kind.is_in(kinds));
            }

            let rows = query.all(&db_tx).await?;
            let mut out = Vec::with_capacity(rows.len());
            for model in rows {
                out.push(Transaction::try_from(model)?);
            }
            Ok(out)
        })
    }

    /// Returns a single transaction by id.
    pub async fn find_transaction(&self, transaction_id: Uuid) -> ResultEngine<Transaction> {
        with_tx!(self, |db_tx| {
            let model = self.require_transaction(&db_tx, transaction_id).await?;
            Transaction::try_from(model)
        })
    }

    /// Lists every member of an installment group, ordered by installment
    /// number.
    pub async fn list_installment_group(&self, group_id: Uuid) -> ResultEngine<Vec<Transaction>> {
        with_tx!(self, |db_tx| {
            let rows = transactions::Entity::find()
                .filter(transactions::Column::GroupId.eq(group_id.to_string()))
                .order_by_asc(transactions::Column::InstallmentNo)
                .all(&db_tx)
                .await?;
            let mut out = Vec::with_capacity(rows.len());
            for model in rows {
                out.push(Transaction::try_from(model)?);
            }
            Ok(out)
        })
    }
}
