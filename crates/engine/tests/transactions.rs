use chrono::NaiveDate;
use sea_orm::Database;

use engine::{
    CreateTransactionCmd, Engine, EngineError, Person, TransactionKind, TransactionListFilter,
    TransactionStatus, UpdateTransactionCmd,
};
use migration::MigratorTrait;

async fn engine_with_db() -> Engine {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    Engine::builder().database(db).build().await.unwrap()
}

fn ana() -> Person {
    Person::User("ana".to_string())
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[tokio::test]
async fn create_and_list_plain_transaction() {
    let engine = engine_with_db().await;

    let created = engine
        .create_transaction(
            CreateTransactionCmd::new(
                "Salary",
                500_000,
                TransactionKind::Income,
                ana(),
                date(2026, 3, 5),
            )
            .category("salary"),
        )
        .await
        .unwrap();
    assert_eq!(created.len(), 1);
    assert_eq!(created[0].status, TransactionStatus::Pending);

    let listed = engine
        .list_transactions(&ana(), 3, 2026, &TransactionListFilter::default())
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].description, "Salary");
    assert_eq!(listed[0].amount_minor, 500_000);
    assert_eq!(listed[0].category.as_deref(), Some("salary"));
}

#[tokio::test]
async fn create_rejects_bad_input() {
    let engine = engine_with_db().await;

    let err = engine
        .create_transaction(CreateTransactionCmd::new(
            "Nothing",
            0,
            TransactionKind::Expense,
            ana(),
            date(2026, 3, 5),
        ))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::Validation("amount_minor must be > 0".to_string())
    );

    let err = engine
        .create_transaction(CreateTransactionCmd::new(
            "   ",
            100,
            TransactionKind::Expense,
            ana(),
            date(2026, 3, 5),
        ))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::Validation("description must not be empty".to_string())
    );
}

#[tokio::test]
async fn recurring_and_installments_are_mutually_exclusive() {
    let engine = engine_with_db().await;

    let cmd = CreateTransactionCmd::new(
        "Gym",
        10_000,
        TransactionKind::CardPurchase,
        ana(),
        date(2026, 3, 5),
    )
    .installments(uuid::Uuid::new_v4(), 3)
    .recurring();

    let err = engine.create_transaction(cmd).await.unwrap_err();
    assert_eq!(
        err,
        EngineError::Validation(
            "a transaction cannot be recurring and split in installments".to_string()
        )
    );
}

#[tokio::test]
async fn card_purchase_requires_a_plan_and_plan_requires_card_purchase() {
    let engine = engine_with_db().await;

    let err = engine
        .create_transaction(CreateTransactionCmd::new(
            "Fridge",
            90_000,
            TransactionKind::CardPurchase,
            ana(),
            date(2026, 3, 5),
        ))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::Validation("card purchases require an installment plan".to_string())
    );

    let err = engine
        .create_transaction(
            CreateTransactionCmd::new(
                "Rent",
                90_000,
                TransactionKind::Expense,
                ana(),
                date(2026, 3, 5),
            )
            .installments(uuid::Uuid::new_v4(), 2),
        )
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::Validation("installment plans are only valid for card purchases".to_string())
    );
}

#[tokio::test]
async fn update_changes_only_given_fields() {
    let engine = engine_with_db().await;

    let created = engine
        .create_transaction(CreateTransactionCmd::new(
            "Groceries",
            12_000,
            TransactionKind::Expense,
            ana(),
            date(2026, 3, 10),
        ))
        .await
        .unwrap();
    let id = created[0].id;

    let updated = engine
        .update_transaction(
            UpdateTransactionCmd::new(id)
                .amount_minor(15_000)
                .category("food")
                .notes("street market"),
        )
        .await
        .unwrap();
    assert_eq!(updated.amount_minor, 15_000);
    assert_eq!(updated.category.as_deref(), Some("food"));
    assert_eq!(updated.notes.as_deref(), Some("street market"));
    assert_eq!(updated.description, "Groceries");
    assert_eq!(updated.due_date, date(2026, 3, 10));

    let reloaded = engine.find_transaction(id).await.unwrap();
    assert_eq!(reloaded.amount_minor, 15_000);
    assert_eq!(reloaded.category.as_deref(), Some("food"));
    assert_eq!(reloaded.notes.as_deref(), Some("street market"));
}

#[tokio::test]
async fn update_rejects_zero_amount() {
    let engine = engine_with_db().await;

    let created = engine
        .create_transaction(CreateTransactionCmd::new(
            "Groceries",
            12_000,
            TransactionKind::Expense,
            ana(),
            date(2026, 3, 10),
        ))
        .await
        .unwrap();

    let err = engine
        .update_transaction(UpdateTransactionCmd::new(created[0].id).amount_minor(0))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::Validation("amount_minor must be > 0".to_string())
    );
}

#[tokio::test]
async fn mark_paid_is_one_way() {
    let engine = engine_with_db().await;

    let created = engine
        .create_transaction(CreateTransactionCmd::new(
            "Water bill",
            8_000,
            TransactionKind::Expense,
            ana(),
            date(2026, 3, 20),
        ))
        .await
        .unwrap();
    let id = created[0].id;

    let paid = engine.mark_transaction_paid(id).await.unwrap();
    assert_eq!(paid.status, TransactionStatus::Paid);

    let err = engine.mark_transaction_paid(id).await.unwrap_err();
    assert_eq!(
        err,
        EngineError::InvalidState("transaction already paid".to_string())
    );
}

#[tokio::test]
async fn delete_removes_the_transaction() {
    let engine = engine_with_db().await;

    let created = engine
        .create_transaction(CreateTransactionCmd::new(
            "Mistake",
            1_000,
            TransactionKind::Expense,
            ana(),
            date(2026, 3, 20),
        ))
        .await
        .unwrap();
    let id = created[0].id;

    engine.delete_transaction(id).await.unwrap();

    let err = engine.find_transaction(id).await.unwrap_err();
    assert_eq!(err, EngineError::NotFound("transaction not exists".to_string()));

    let err = engine.delete_transaction(id).await.unwrap_err();
    assert_eq!(err, EngineError::NotFound("transaction not exists".to_string()));
}

#[tokio::test]
async fn listing_isolates_view_and_period() {
    let engine = engine_with_db().await;

    for (description, person, due) in [
        ("Ana march", ana(), date(2026, 3, 5)),
        ("Ana april", ana(), date(2026, 4, 5)),
        ("Bruno march", Person::User("bruno".to_string()), date(2026, 3, 7)),
        ("Household march", Person::Shared, date(2026, 3, 9)),
    ] {
        engine
            .create_transaction(CreateTransactionCmd::new(
                description,
                5_000,
                TransactionKind::Expense,
                person,
                due,
            ))
            .await
            .unwrap();
    }

    let ana_march = engine
        .list_transactions(&ana(), 3, 2026, &TransactionListFilter::default())
        .await
        .unwrap();
    assert_eq!(ana_march.len(), 1);
    assert_eq!(ana_march[0].description, "Ana march");

    let shared_march = engine
        .list_transactions(&Person::Shared, 3, 2026, &TransactionListFilter::default())
        .await
        .unwrap();
    assert_eq!(shared_march.len(), 1);
    assert_eq!(shared_march[0].description, "Household march");

    let status_filter = TransactionListFilter {
        status: Some(TransactionStatus::Paid),
        ..Default::default()
    };
    let paid_only = engine
        .list_transactions(&ana(), 3, 2026, &status_filter)
        .await
        .unwrap();
    assert!(paid_only.is_empty());
}

#[tokio::test]
async fn list_rejects_empty_kind_filter_and_bad_month() {
    let engine = engine_with_db().await;

    let filter = TransactionListFilter {
        kinds: Some(vec![]),
        ..Default::default()
    };
    let err = engine
        .list_transactions(&ana(), 3, 2026, &filter)
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::Validation("kinds must not be empty".to_string()));

    let err = engine
        .list_transactions(&ana(), 13, 2026, &TransactionListFilter::default())
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::Validation("invalid month: 13".to_string()));
}

#[tokio::test]
async fn summary_buckets_follow_kinds() {
    let engine = engine_with_db().await;

    let entries = [
        ("Salary", 500_000, TransactionKind::Income),
        ("Rent", 180_000, TransactionKind::Expense),
        ("Emergency fund", 50_000, TransactionKind::SavingsDeposit),
        ("Vacation top-up", 20_000, TransactionKind::SavingsWithdrawal),
    ];
    for (description, amount, kind) in entries {
        engine
            .create_transaction(CreateTransactionCmd::new(
                description,
                amount,
                kind,
                Person::Shared,
                date(2026, 3, 12),
            ))
            .await
            .unwrap();
    }

    // A paid expense: pending total must not count it.
    let paid = engine
        .create_transaction(CreateTransactionCmd::new(
            "Electricity",
            30_000,
            TransactionKind::Expense,
            Person::Shared,
            date(2026, 3, 15),
        ))
        .await
        .unwrap();
    engine.mark_transaction_paid(paid[0].id).await.unwrap();

    // Different view and different month: both must stay invisible.
    engine
        .create_transaction(CreateTransactionCmd::new(
            "Ana only",
            99_000,
            TransactionKind::Expense,
            ana(),
            date(2026, 3, 2),
        ))
        .await
        .unwrap();
    engine
        .create_transaction(CreateTransactionCmd::new(
            "April",
            70_000,
            TransactionKind::Expense,
            Person::Shared,
            date(2026, 4, 2),
        ))
        .await
        .unwrap();

    let totals = engine.get_summary(&Person::Shared, 3, 2026).await.unwrap();
    assert_eq!(totals.total_income_minor, 500_000);
    // expense + withdrawal + paid electricity; the deposit stays out
    assert_eq!(totals.total_expense_minor, 180_000 + 20_000 + 30_000);
    assert_eq!(totals.total_card_minor, 0);
    assert_eq!(totals.total_savings_minor, 50_000 - 20_000);
    // everything from march except the paid electricity
    assert_eq!(
        totals.total_pending_minor,
        500_000 + 180_000 + 50_000 + 20_000
    );
}

#[tokio::test]
async fn expansion_materializes_one_occurrence_per_period() {
    let engine = engine_with_db().await;

    let created = engine
        .create_transaction(
            CreateTransactionCmd::new(
                "Internet",
                11_000,
                TransactionKind::Expense,
                Person::Shared,
                date(2026, 1, 15),
            )
            .recurring(),
        )
        .await
        .unwrap();
    let template_id = created[0].id;

    let expanded = engine
        .expand_recurrences(date(2026, 2, 20))
        .await
        .unwrap();
    assert_eq!(expanded.len(), 1);
    assert_eq!(expanded[0].due_date, date(2026, 2, 15));
    assert!(expanded[0].is_recurring);
    assert_eq!(expanded[0].recurring_source_id, Some(template_id));
    assert_eq!(expanded[0].status, TransactionStatus::Pending);
    assert_eq!(expanded[0].amount_minor, 11_000);

    // Second run for the same reference date: nothing new.
    let expanded = engine
        .expand_recurrences(date(2026, 2, 20))
        .await
        .unwrap();
    assert!(expanded.is_empty());
}

#[tokio::test]
async fn expansion_backfills_elapsed_months() {
    let engine = engine_with_db().await;

    engine
        .create_transaction(
            CreateTransactionCmd::new(
                "Streaming",
                4_000,
                TransactionKind::Expense,
                ana(),
                date(2026, 1, 10),
            )
            .recurring(),
        )
        .await
        .unwrap();

    let expanded = engine
        .expand_recurrences(date(2026, 4, 10))
        .await
        .unwrap();
    let due_dates: Vec<_> = expanded.iter().map(|tx| tx.due_date).collect();
    assert_eq!(
        due_dates,
        vec![date(2026, 2, 10), date(2026, 3, 10), date(2026, 4, 10)]
    );

    // Every occurrence continues the chain.
    assert!(expanded.iter().all(|tx| tx.is_recurring));
}

#[tokio::test]
async fn expansion_clamps_to_short_months() {
    let engine = engine_with_db().await;

    engine
        .create_transaction(
            CreateTransactionCmd::new(
                "Insurance",
                25_000,
                TransactionKind::Expense,
                ana(),
                date(2026, 1, 31),
            )
            .recurring(),
        )
        .await
        .unwrap();

    let expanded = engine
        .expand_recurrences(date(2026, 3, 31))
        .await
        .unwrap();
    let due_dates: Vec<_> = expanded.iter().map(|tx| tx.due_date).collect();
    // Jan 31 clamps to Feb 28; the chain then advances from Feb 28.
    assert_eq!(due_dates, vec![date(2026, 2, 28), date(2026, 3, 28)]);
}

#[tokio::test]
async fn transactions_serialize_for_the_client_layer() {
    let engine = engine_with_db().await;

    let created = engine
        .create_transaction(
            CreateTransactionCmd::new(
                "Salary",
                500_000,
                TransactionKind::Income,
                ana(),
                date(2026, 3, 5),
            )
            .category("salary"),
        )
        .await
        .unwrap();

    let json = serde_json::to_string(&created[0]).unwrap();
    let back: engine::Transaction = serde_json::from_str(&json).unwrap();
    assert_eq!(back, created[0]);
}
