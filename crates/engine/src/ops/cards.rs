use chrono::Utc;
use sea_orm::{
    ModelTrait, PaginatorTrait, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
};
use uuid::Uuid;

use crate::{
    Card, CreateCardCmd, EngineError, ResultEngine, UpdateCardCmd, cards, cards::validate_cycle_day,
    invoices,
};

use super::{Engine, with_tx};

impl Engine {
    /// Lists every card, ordered by name.
    pub async fn list_cards(&self) -> ResultEngine<Vec<Card>> {
        with_tx!(self, |db_tx| {
            let rows = cards::Entity::find()
                .order_by_asc(cards::Column::Name)
                .all(&db_tx)
                .await?;
            let mut out = Vec::with_capacity(rows.len());
            for model in rows {
                out.push(Card::try_from(model)?);
            }
            Ok(out)
        })
    }

    /// Returns a single card by id.
    pub async fn find_card(&self, card_id: Uuid) -> ResultEngine<Card> {
        with_tx!(self, |db_tx| {
            let model = self.require_card(&db_tx, card_id).await?;
            Card::try_from(model)
        })
    }

    /// Creates a card.
    pub async fn create_card(&self, cmd: CreateCardCmd) -> ResultEngine<Card> {
        let card = Card::new(cmd.name, cmd.closing_day, cmd.due_day)?;
        with_tx!(self, |db_tx| {
            cards::ActiveModel::from(&card).insert(&db_tx).await?;
            Ok(card)
        })
    }

    /// Updates a card. Cycle-day changes only affect invoices created
    /// afterwards.
    pub async fn update_card(&self, cmd: UpdateCardCmd) -> ResultEngine<Card> {
        with_tx!(self, |db_tx| {
            let model = self.require_card(&db_tx, cmd.card_id).await?;
            let mut card = Card::try_from(model)?;

            if let Some(name) = &cmd.name {
                let name = name.trim();
                if name.is_empty() {
                    return Err(EngineError::Validation(
                        "card name must not be empty".to_string(),
                    ));
                }
                card.name = name.to_string();
            }
            if let Some(closing_day) = cmd.closing_day {
                validate_cycle_day(closing_day, "closing_day")?;
                card.closing_day = closing_day;
            }
            if let Some(due_day) = cmd.due_day {
                validate_cycle_day(due_day, "due_day")?;
                card.due_day = due_day;
            }

            card.updated_at = Utc::now();
            cards::ActiveModel::from(&card).update(&db_tx).await?;
            Ok(card)
        })
    }

    /// Deletes a card. Rejected while any invoice still references it.
    pub async fn delete_card(&self, card_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let model = self.require_card(&db_tx, card_id).await?;

            let owned = invoices::Entity::find()
                .filter(invoices::Column::CardId.eq(card_id.to_string()))
                .count(&db_tx)
                .await?;
            if owned > 0 {
                return Err(EngineError::Conflict("card has invoices".to_string()));
            }

            model.delete(&db_tx).await?;
            Ok(())
        })
    }
}
