use sea_orm::DatabaseTransaction;
use sea_orm::prelude::*;
use uuid::Uuid;

use crate::{EngineError, ResultEngine, cards, invoices, transactions};

use super::Engine;

/// Generates a `require_*` lookup for an entity keyed by a Uuid id stored as
/// a string.
macro_rules! impl_require_by_id {
    ($fn_name:ident, $entity:path, $model:ty, $err_msg:literal) => {
        pub(super) async fn $fn_name(
            &self,
            db: &DatabaseTransaction,
            id: Uuid,
        ) -> ResultEngine<$model> {
            <$entity>::find_by_id(id.to_string())
                .one(db)
                .await?
                .ok_or_else(|| EngineError::NotFound($err_msg.to_string()))
        }
    };
}

impl Engine {
    impl_require_by_id!(
        require_transaction,
        transactions::Entity,
        transactions::Model,
        "transaction not exists"
    );

    impl_require_by_id!(require_card, cards::Entity, cards::Model, "card not exists");

    impl_require_by_id!(
        require_invoice,
        invoices::Entity,
        invoices::Model,
        "invoice not exists"
    );
}
