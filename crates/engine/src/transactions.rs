//! Transaction primitives.
//!
//! A `Transaction` is one ledger entry: an income, an expense, a card
//! purchase (possibly one installment of a group), a savings deposit or a
//! savings withdrawal, owned by one [`Person`].

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

/// Who a transaction (or a listing/summary view) belongs to: a single user
/// or the household's shared pool.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Person {
    User(String),
    Shared,
}

/// Sentinel stored in place of a username for the shared pool.
const SHARED_SENTINEL: &str = "shared";

impl Person {
    pub fn as_str(&self) -> &str {
        match self {
            Self::User(name) => name.as_str(),
            Self::Shared => SHARED_SENTINEL,
        }
    }
}

impl TryFrom<&str> for Person {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(EngineError::Validation(
                "person must not be empty".to_string(),
            ));
        }
        if trimmed == SHARED_SENTINEL {
            Ok(Self::Shared)
        } else {
            Ok(Self::User(trimmed.to_string()))
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Income,
    Expense,
    CardPurchase,
    SavingsDeposit,
    SavingsWithdrawal,
}

impl TransactionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
            Self::CardPurchase => "card_purchase",
            Self::SavingsDeposit => "savings_deposit",
            Self::SavingsWithdrawal => "savings_withdrawal",
        }
    }

    /// Kinds that count toward the expense bucket of a summary. Deposits are
    /// money moved aside, not spent.
    pub fn is_outflow(self) -> bool {
        matches!(
            self,
            Self::Expense | Self::CardPurchase | Self::SavingsWithdrawal
        )
    }
}

impl TryFrom<&str> for TransactionKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            "card_purchase" => Ok(Self::CardPurchase),
            "savings_deposit" => Ok(Self::SavingsDeposit),
            "savings_withdrawal" => Ok(Self::SavingsWithdrawal),
            other => Err(EngineError::Validation(format!(
                "invalid transaction kind: {other}"
            ))),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    Pending,
    Paid,
}

impl TransactionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
        }
    }
}

impl TryFrom<&str> for TransactionStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "pending" => Ok(Self::Pending),
            "paid" => Ok(Self::Paid),
            other => Err(EngineError::Validation(format!(
                "invalid transaction status: {other}"
            ))),
        }
    }
}

/// Installment metadata carried by each member of an installment group.
///
/// All fields are set together by the installment splitter; a transaction
/// either has the whole block or none of it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Installment {
    /// Shared by every installment of one purchase.
    pub group_id: Uuid,
    /// 1-based position inside the group.
    pub number: u32,
    /// Total installments in the group.
    pub count: u32,
    /// The card the purchase was made on.
    pub card_id: Uuid,
    /// The invoice this installment was allocated to.
    pub invoice_id: Uuid,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    pub description: String,
    pub amount_minor: i64,
    pub kind: TransactionKind,
    pub person: Person,
    pub category: Option<String>,
    pub due_date: NaiveDate,
    pub status: TransactionStatus,
    pub notes: Option<String>,
    pub is_recurring: bool,
    /// For expanded occurrences, the transaction this one was generated from.
    pub recurring_source_id: Option<Uuid>,
    pub installment: Option<Installment>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Transaction {
    pub fn new(
        description: String,
        amount_minor: i64,
        kind: TransactionKind,
        person: Person,
        due_date: NaiveDate,
    ) -> ResultEngine<Self> {
        if amount_minor <= 0 {
            return Err(EngineError::Validation(
                "amount_minor must be > 0".to_string(),
            ));
        }
        let description = description.trim().to_string();
        if description.is_empty() {
            return Err(EngineError::Validation(
                "description must not be empty".to_string(),
            ));
        }
        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            description,
            amount_minor,
            kind,
            person,
            category: None,
            due_date,
            status: TransactionStatus::Pending,
            notes: None,
            is_recurring: false,
            recurring_source_id: None,
            installment: None,
            created_at: now,
            updated_at: now,
        })
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub description: String,
    pub amount_minor: i64,
    pub kind: String,
    pub person: String,
    pub category: Option<String>,
    pub due_date: Date,
    pub status: String,
    pub notes: Option<String>,
    pub is_recurring: bool,
    pub recurring_source_id: Option<String>,
    pub group_id: Option<String>,
    pub installment_no: Option<i32>,
    pub installment_count: Option<i32>,
    pub card_id: Option<String>,
    pub invoice_id: Option<String>,
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
    #[sea_orm(
        belongs_to = "super::invoices::Entity",
        from = "Column::InvoiceId",
        to = "super::invoices::Column::Id"
    )]
    Invoices,
}

impl Related<super::cards::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Cards.def()
    }
}

impl Related<super::invoices::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Invoices.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Transaction> for ActiveModel {
    fn from(tx: &Transaction) -> Self {
        Self {
            id: ActiveValue::Set(tx.id.to_string()),
            description: ActiveValue::Set(tx.description.clone()),
            amount_minor: ActiveValue::Set(tx.amount_minor),
            kind: ActiveValue::Set(tx.kind.as_str().to_string()),
            person: ActiveValue::Set(tx.person.as_str().to_string()),
            category: ActiveValue::Set(tx.category.clone()),
            due_date: ActiveValue::Set(tx.due_date),
            status: ActiveValue::Set(tx.status.as_str().to_string()),
            notes: ActiveValue::Set(tx.notes.clone()),
            is_recurring: ActiveValue::Set(tx.is_recurring),
            recurring_source_id: ActiveValue::Set(
                tx.recurring_source_id.map(|id| id.to_string()),
            ),
            group_id: ActiveValue::Set(
                tx.installment.as_ref().map(|i| i.group_id.to_string()),
            ),
            installment_no: ActiveValue::Set(tx.installment.as_ref().map(|i| i.number as i32)),
            installment_count: ActiveValue::Set(tx.installment.as_ref().map(|i| i.count as i32)),
            card_id: ActiveValue::Set(tx.installment.as_ref().map(|i| i.card_id.to_string())),
            invoice_id: ActiveValue::Set(
                tx.installment.as_ref().map(|i| i.invoice_id.to_string()),
            ),
            created_at: ActiveValue::Set(tx.created_at),
            updated_at: ActiveValue::Set(tx.updated_at),
        }
    }
}

fn parse_uuid(value: &str, label: &str) -> ResultEngine<Uuid> {
    Uuid::parse_str(value).map_err(|_| EngineError::Validation(format!("invalid {label} id")))
}

impl TryFrom<Model> for Transaction {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let installment = match (
            model.group_id,
            model.installment_no,
            model.installment_count,
            model.card_id,
            model.invoice_id,
        ) {
            (Some(group_id), Some(number), Some(count), Some(card_id), Some(invoice_id)) => {
                Some(Installment {
                    group_id: parse_uuid(&group_id, "group")?,
                    number: number as u32,
                    count: count as u32,
                    card_id: parse_uuid(&card_id, "card")?,
                    invoice_id: parse_uuid(&invoice_id, "invoice")?,
                })
            }
            (None, None, None, None, None) => None,
            _ => {
                return Err(EngineError::Validation(
                    "incomplete installment metadata".to_string(),
                ));
            }
        };

        Ok(Self {
            id: parse_uuid(&model.id, "transaction")?,
            description: model.description,
            amount_minor: model.amount_minor,
            kind: TransactionKind::try_from(model.kind.as_str())?,
            person: Person::try_from(model.person.as_str())?,
            category: model.category,
            due_date: model.due_date,
            status: TransactionStatus::try_from(model.status.as_str())?,
            notes: model.notes,
            is_recurring: model.is_recurring,
            recurring_source_id: model
                .recurring_source_id
                .as_deref()
                .map(|s| parse_uuid(s, "transaction"))
                .transpose()?,
            installment,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}
