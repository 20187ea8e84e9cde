//! Credit card primitives.
//!
//! A `Card` defines a recurring billing cycle (closing day and due day), not
//! a balance. Invoices reference it when deriving their dates.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub id: Uuid,
    pub name: String,
    /// Day of month the billing cycle closes, 1..=31.
    pub closing_day: u32,
    /// Day of month the invoice is due, 1..=31. May precede `closing_day`;
    /// the due date then falls in the following month.
    pub due_day: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub(crate) fn validate_cycle_day(day: u32, label: &str) -> ResultEngine<()> {
    if !(1..=31).contains(&day) {
        return Err(EngineError::Validation(format!(
            "invalid {label}: {day} (must be 1..=31)"
        )));
    }
    Ok(())
}

impl Card {
    pub fn new(name: String, closing_day: u32, due_day: u32) -> ResultEngine<Self> {
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(EngineError::Validation(
                "card name must not be empty".to_string(),
            ));
        }
        validate_cycle_day(closing_day, "closing_day")?;
        validate_cycle_day(due_day, "due_day")?;

        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            name,
            closing_day,
            due_day,
            created_at: now,
            updated_at: now,
        })
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "cards")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub closing_day: i32,
    pub due_day: i32,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::invoices::Entity")]
    Invoices,
    #[sea_orm(has_many = "super::transactions::Entity")]
    Transactions,
}

impl Related<super::invoices::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Invoices.def()
    }
}

impl Related<super::transactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Card> for ActiveModel {
    fn from(card: &Card) -> Self {
        Self {
            id: ActiveValue::Set(card.id.to_string()),
            name: ActiveValue::Set(card.name.clone()),
            closing_day: ActiveValue::Set(card.closing_day as i32),
            due_day: ActiveValue::Set(card.due_day as i32),
            created_at: ActiveValue::Set(card.created_at),
            updated_at: ActiveValue::Set(card.updated_at),
        }
    }
}

impl TryFrom<Model> for Card {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| EngineError::Validation("invalid card id".to_string()))?,
            name: model.name,
            closing_day: model.closing_day as u32,
            due_day: model.due_day as u32,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}
