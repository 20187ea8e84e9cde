//! Command structs for engine operations.
//!
//! These types group parameters for write operations, keeping call sites
//! readable and avoiding long argument lists.

use chrono::NaiveDate;
use uuid::Uuid;

use crate::{Person, TransactionKind};

/// Installment plan attached to a card-purchase creation: the owning card
/// and how many installments to split into.
#[derive(Clone, Copy, Debug)]
pub struct InstallmentPlan {
    pub card_id: Uuid,
    pub count: u32,
}

/// Create a transaction.
///
/// A plain command creates one ledger entry. With [`installments`] set the
/// engine fans the purchase out into one entry per installment; with
/// [`recurring`] set the entry becomes a monthly template. The two are
/// mutually exclusive.
///
/// [`installments`]: Self::installments
/// [`recurring`]: Self::recurring
#[derive(Clone, Debug)]
pub struct CreateTransactionCmd {
    pub description: String,
    pub amount_minor: i64,
    pub kind: TransactionKind,
    pub person: Person,
    pub due_date: NaiveDate,
    pub category: Option<String>,
    pub notes: Option<String>,
    pub is_recurring: bool,
    pub installments: Option<InstallmentPlan>,
}

impl CreateTransactionCmd {
    #[must_use]
    pub fn new(
        description: impl Into<String>,
        amount_minor: i64,
        kind: TransactionKind,
        person: Person,
        due_date: NaiveDate,
    ) -> Self {
        Self {
            description: description.into(),
            amount_minor,
            kind,
            person,
            due_date,
            category: None,
            notes: None,
            is_recurring: false,
            installments: None,
        }
    }

    #[must_use]
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    #[must_use]
    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    #[must_use]
    pub fn recurring(mut self) -> Self {
        self.is_recurring = true;
        self
    }

    #[must_use]
    pub fn installments(mut self, card_id: Uuid, count: u32) -> Self {
        self.installments = Some(InstallmentPlan { card_id, count });
        self
    }
}

/// Update an existing transaction. Unset fields keep their current value.
#[derive(Clone, Debug)]
pub struct UpdateTransactionCmd {
    pub transaction_id: Uuid,

    pub description: Option<String>,
    pub amount_minor: Option<i64>,
    pub kind: Option<TransactionKind>,
    pub person: Option<Person>,
    pub category: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub is_recurring: Option<bool>,
}

impl UpdateTransactionCmd {
    #[must_use]
    pub fn new(transaction_id: Uuid) -> Self {
        Self {
            transaction_id,
            description: None,
            amount_minor: None,
            kind: None,
            person: None,
            category: None,
            due_date: None,
            notes: None,
            is_recurring: None,
        }
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn amount_minor(mut self, amount_minor: i64) -> Self {
        self.amount_minor = Some(amount_minor);
        self
    }

    #[must_use]
    pub fn kind(mut self, kind: TransactionKind) -> Self {
        self.kind = Some(kind);
        self
    }

    #[must_use]
    pub fn person(mut self, person: Person) -> Self {
        self.person = Some(person);
        self
    }

    #[must_use]
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    #[must_use]
    pub fn due_date(mut self, due_date: NaiveDate) -> Self {
        self.due_date = Some(due_date);
        self
    }

    #[must_use]
    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    #[must_use]
    pub fn is_recurring(mut self, is_recurring: bool) -> Self {
        self.is_recurring = Some(is_recurring);
        self
    }
}

/// Create a card.
#[derive(Clone, Debug)]
pub struct CreateCardCmd {
    pub name: String,
    pub closing_day: u32,
    pub due_day: u32,
}

impl CreateCardCmd {
    #[must_use]
    pub fn new(name: impl Into<String>, closing_day: u32, due_day: u32) -> Self {
        Self {
            name: name.into(),
            closing_day,
            due_day,
        }
    }
}

/// Update an existing card. Unset fields keep their current value.
///
/// Cycle-day changes only affect invoices created afterwards; existing
/// invoices keep the dates derived at their creation.
#[derive(Clone, Debug)]
pub struct UpdateCardCmd {
    pub card_id: Uuid,
    pub name: Option<String>,
    pub closing_day: Option<u32>,
    pub due_day: Option<u32>,
}

impl UpdateCardCmd {
    #[must_use]
    pub fn new(card_id: Uuid) -> Self {
        Self {
            card_id,
            name: None,
            closing_day: None,
            due_day: None,
        }
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn closing_day(mut self, closing_day: u32) -> Self {
        self.closing_day = Some(closing_day);
        self
    }

    #[must_use]
    pub fn due_day(mut self, due_day: u32) -> Self {
        self.due_day = Some(due_day);
        self
    }
}
