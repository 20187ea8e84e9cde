//! Initial schema migration - creates all tables from scratch.
//!
//! Consolidated schema for Caderneta:
//!
//! - `cards`: credit card billing cycle definitions
//! - `invoices`: one billing period of one card
//! - `transactions`: ledger entries, optionally linked to an invoice
//!   (installments) or to the transaction they were expanded from
//!   (recurrence)

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// ─────────────────────────────────────────────────────────────────────────────
// Table identifiers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Iden)]
enum Cards {
    Table,
    Id,
    Name,
    ClosingDay,
    DueDay,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Invoices {
    Table,
    Id,
    CardId,
    Month,
    Year,
    ClosingDate,
    DueDate,
    TotalAmountMinor,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Transactions {
    Table,
    Id,
    Description,
    AmountMinor,
    Kind,
    Person,
    Category,
    DueDate,
    Status,
    Notes,
    IsRecurring,
    RecurringSourceId,
    GroupId,
    InstallmentNo,
    InstallmentCount,
    CardId,
    InvoiceId,
    CreatedAt,
    UpdatedAt,
}

// ─────────────────────────────────────────────────────────────────────────────
// Migration implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ───────────────────────────────────────────────────────────────────
        // 1. Cards
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Cards::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Cards::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Cards::Name).string().not_null())
                    .col(ColumnDef::new(Cards::ClosingDay).integer().not_null())
                    .col(ColumnDef::new(Cards::DueDay).integer().not_null())
                    .col(ColumnDef::new(Cards::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Cards::UpdatedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 2. Invoices
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Invoices::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Invoices::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Invoices::CardId).string().not_null())
                    .col(ColumnDef::new(Invoices::Month).integer().not_null())
                    .col(ColumnDef::new(Invoices::Year).integer().not_null())
                    .col(ColumnDef::new(Invoices::ClosingDate).date().not_null())
                    .col(ColumnDef::new(Invoices::DueDate).date().not_null())
                    .col(
                        ColumnDef::new(Invoices::TotalAmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Invoices::Status).string().not_null())
                    .col(ColumnDef::new(Invoices::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Invoices::UpdatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-invoices-card_id")
                            .from(Invoices::Table, Invoices::CardId)
                            .to(Cards::Table, Cards::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-invoices-card_id-year-month-unique")
                    .table(Invoices::Table)
                    .col(Invoices::CardId)
                    .col(Invoices::Year)
                    .col(Invoices::Month)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 3. Transactions
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Transactions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Transactions::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Transactions::Description).string().not_null())
                    .col(
                        ColumnDef::new(Transactions::AmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Transactions::Kind).string().not_null())
                    .col(ColumnDef::new(Transactions::Person).string().not_null())
                    .col(ColumnDef::new(Transactions::Category).string())
                    .col(ColumnDef::new(Transactions::DueDate).date().not_null())
                    .col(ColumnDef::new(Transactions::Status).string().not_null())
                    .col(ColumnDef::new(Transactions::Notes).string())
                    .col(
                        ColumnDef::new(Transactions::IsRecurring)
                            .boolean()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Transactions::RecurringSourceId).string())
                    .col(ColumnDef::new(Transactions::GroupId).string())
                    .col(ColumnDef::new(Transactions::InstallmentNo).integer())
                    .col(ColumnDef::new(Transactions::InstallmentCount).integer())
                    .col(ColumnDef::new(Transactions::CardId).string())
                    .col(ColumnDef::new(Transactions::InvoiceId).string())
                    .col(
                        ColumnDef::new(Transactions::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Transactions::UpdatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-transactions-card_id")
                            .from(Transactions::Table, Transactions::CardId)
                            .to(Cards::Table, Cards::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-transactions-invoice_id")
                            .from(Transactions::Table, Transactions::InvoiceId)
                            .to(Invoices::Table, Invoices::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-transactions-person-due_date")
                    .table(Transactions::Table)
                    .col(Transactions::Person)
                    .col(Transactions::DueDate)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-transactions-invoice_id")
                    .table(Transactions::Table)
                    .col(Transactions::InvoiceId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-transactions-group_id")
                    .table(Transactions::Table)
                    .col(Transactions::GroupId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-transactions-recurring_source_id")
                    .table(Transactions::Table)
                    .col(Transactions::RecurringSourceId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop in reverse order of creation (respecting FK dependencies)
        manager
            .drop_table(Table::drop().table(Transactions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Invoices::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Cards::Table).to_owned())
            .await?;
        Ok(())
    }
}
