//! Invoice primitives.
//!
//! An `Invoice` aggregates the card purchases of one card over one billing
//! period. Its lifecycle is a one-way state machine:
//!
//! ```text
//! Open ──close──▶ Closed ──settle──▶ Paid
//! ```
//!
//! Closing freezes the total and the set of linked transactions; nothing is
//! recomputed afterwards.

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Card, EngineError, Period};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    Open,
    Closed,
    Paid,
}

impl InvoiceStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
            Self::Paid => "paid",
        }
    }
}

impl TryFrom<&str> for InvoiceStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "open" => Ok(Self::Open),
            "closed" => Ok(Self::Closed),
            "paid" => Ok(Self::Paid),
            other => Err(EngineError::Validation(format!(
                "invalid invoice status: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: Uuid,
    pub card_id: Uuid,
    pub period: Period,
    pub closing_date: NaiveDate,
    pub due_date: NaiveDate,
    /// Zero while open; the frozen sum of linked amounts once closed.
    pub total_amount_minor: i64,
    pub status: InvoiceStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Invoice {
    /// Builds the open invoice of `card` for `period`, deriving its dates
    /// from the card's cycle days.
    ///
    /// The closing date is the card's closing day inside the period (clamped
    /// to the month's last day). The due date is the card's due day, rolled
    /// into the following month when it does not come after the closing day.
    /// Both dates are frozen here; later card edits do not touch existing
    /// invoices.
    #[must_use]
    pub fn open(card: &Card, period: Period) -> Self {
        let closing_date = period.day_clamped(card.closing_day);
        let due_date = if card.due_day > card.closing_day {
            period.day_clamped(card.due_day)
        } else {
            period.next().day_clamped(card.due_day)
        };

        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            card_id: card.id,
            period,
            closing_date,
            due_date,
            total_amount_minor: 0,
            status: InvoiceStatus::Open,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "invoices")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub card_id: String,
    pub month: i32,
    pub year: i32,
    pub closing_date: Date,
    pub due_date: Date,
    pub total_amount_minor: i64,
    pub status: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::cards::Entity",
        from = "Column::CardId",
        to = "super::cards::Column::Id"
    )]
    Cards,
    #[sea_orm(has_many = "super::transactions::Entity")]
    Transactions,
}

impl Related<super::cards::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Cards.def()
    }
}

impl Related<super::transactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Invoice> for ActiveModel {
    fn from(invoice: &Invoice) -> Self {
        Self {
            id: ActiveValue::Set(invoice.id.to_string()),
            card_id: ActiveValue::Set(invoice.card_id.to_string()),
            month: ActiveValue::Set(invoice.period.month as i32),
            year: ActiveValue::Set(invoice.period.year),
            closing_date: ActiveValue::Set(invoice.closing_date),
            due_date: ActiveValue::Set(invoice.due_date),
            total_amount_minor: ActiveValue::Set(invoice.total_amount_minor),
            status: ActiveValue::Set(invoice.status.as_str().to_string()),
            created_at: ActiveValue::Set(invoice.created_at),
            updated_at: ActiveValue::Set(invoice.updated_at),
        }
    }
}

impl TryFrom<Model> for Invoice {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| EngineError::Validation("invalid invoice id".to_string()))?,
            card_id: Uuid::parse_str(&model.card_id)
                .map_err(|_| EngineError::Validation("invalid card id".to_string()))?,
            period: Period::new(model.year, model.month as u32)?,
            closing_date: model.closing_date,
            due_date: model.due_date,
            total_amount_minor: model.total_amount_minor,
            status: InvoiceStatus::try_from(model.status.as_str())?,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}
