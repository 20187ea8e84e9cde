//! Household ledger engine.
//!
//! The engine owns the domain rules of a personal/shared finance ledger:
//! transactions, credit cards and card invoices, monthly views and summary
//! totals. It is deliberately stateless — every operation is a method on
//! [`Engine`] that runs against the database connection it was built with,
//! inside its own transaction. Rendering, sessions and transport belong to
//! the callers.

pub use cards::Card;
pub use commands::{
    CreateCardCmd, CreateTransactionCmd, InstallmentPlan, UpdateCardCmd, UpdateTransactionCmd,
};
pub use error::EngineError;
pub use invoices::{Invoice, InvoiceStatus};
pub use money::MoneyCents;
pub use ops::{Engine, EngineBuilder, InvoiceListFilter, SummaryTotals, TransactionListFilter};
pub use period::Period;
pub use transactions::{
    Installment, Person, Transaction, TransactionKind, TransactionStatus,
};

mod cards;
mod commands;
mod error;
mod invoices;
mod money;
mod ops;
mod period;
mod transactions;

type ResultEngine<T> = Result<T, EngineError>;
