//! Board, List, Card repositories — the ownership-chain-verified half of
//! the DAL (spec §4.5).

use super::plan_limiter::PlanLimiter;
use super::KanbanRepo;
use crate::entities::board::{board, card, list};
use crate::entities::tenant::org;
use crate::error::log_and_convert;
use kanban_domain::{Card, DomainError, List, Priority};
use kanban_lexorank::{midpoint, next_after};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, TransactionTrait,
};
use std::collections::BTreeSet;
use time::OffsetDateTime;
use uuid::Uuid;

impl KanbanRepo {
    /// Walks `Board -> Organization`, failing with `NotFound` (never
    /// `Forbidden`) when the board belongs to a different tenant.
    pub async fn find_board_scoped(
        &self,
        org_id: Uuid,
        board_id: Uuid,
    ) -> Result<board::Model, DomainError> {
        board::Entity::find_by_id(board_id)
            .filter(board::Column::OrgId.eq(org_id))
            .one(self.conn())
            .await
            .map_err(|e| log_and_convert("find_board_scoped", e))?
            .ok_or(DomainError::NotFound)
    }

    /// Walks `List -> Board -> Organization`.
    pub async fn find_list_scoped(
        &self,
        org_id: Uuid,
        list_id: Uuid,
    ) -> Result<(list::Model, board::Model), DomainError> {
        let list_row = list::Entity::find_by_id(list_id)
            .one(self.conn())
            .await
            .map_err(|e| log_and_convert("find_list_scoped", e))?
            .ok_or(DomainError::NotFound)?;
        let board_row = self.find_board_scoped(org_id, list_row.board_id).await?;
        Ok((list_row, board_row))
    }

    /// Walks `Card -> List -> Board -> Organization` — the chain spec §3
    /// calls out explicitly as the ownership invariant every mutation must
    /// verify.
    pub async fn find_card_scoped(
        &self,
        org_id: Uuid,
        card_id: Uuid,
    ) -> Result<(card::Model, list::Model, board::Model), DomainError> {
        let card_row = card::Entity::find_by_id(card_id)
            .one(self.conn())
            .await
            .map_err(|e| log_and_convert("find_card_scoped", e))?
            .ok_or(DomainError::NotFound)?;
        let (list_row, board_row) = self.find_list_scoped(org_id, card_row.list_id).await?;
        Ok((card_row, list_row, board_row))
    }

    // ---- boards -------------------------------------------------------

    pub async fn boards_list(&self, org_id: Uuid) -> Result<Vec<kanban_domain::Board>, DomainError> {
        let rows = board::Entity::find()
            .filter(board::Column::OrgId.eq(org_id))
            .order_by_asc(board::Column::CreatedAt)
            .all(self.conn())
            .await
            .map_err(|e| log_and_convert("boards_list", e))?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    pub async fn boards_create(
        &self,
        org_id: Uuid,
        title: String,
        image_url: Option<String>,
        limiter: &dyn PlanLimiter,
    ) -> Result<kanban_domain::Board, DomainError> {
        let org_row = org::Entity::find_by_id(org_id)
            .one(self.conn())
            .await
            .map_err(|e| log_and_convert("boards_create.find_org", e))?
            .ok_or(DomainError::NotFound)?;

        let existing = board::Entity::find()
            .filter(board::Column::OrgId.eq(org_id))
            .count(self.conn())
            .await
            .map_err(|e| log_and_convert("boards_create.count", e))?;

        let plan: kanban_domain::Organization = org_row.into();
        limiter.check_board_limit(plan.plan, existing)?;

        let model = board::ActiveModel {
            id: Set(Uuid::now_v7()),
            org_id: Set(org_id),
            title: Set(title),
            image_url: Set(image_url),
            created_at: Set(OffsetDateTime::now_utc().into()),
        };
        let inserted = model
            .insert(self.conn())
            .await
            .map_err(|e| log_and_convert("boards_create.insert", e))?;
        Ok(inserted.into())
    }

    pub async fn boards_update(
        &self,
        org_id: Uuid,
        board_id: Uuid,
        title: Option<String>,
        image_url: Option<Option<String>>,
    ) -> Result<kanban_domain::Board, DomainError> {
        let existing = self.find_board_scoped(org_id, board_id).await?;
        let mut active: board::ActiveModel = existing.into();
        if let Some(title) = title {
            active.title = Set(title);
        }
        if let Some(image_url) = image_url {
            active.image_url = Set(image_url);
        }
        let updated = active
            .update(self.conn())
            .await
            .map_err(|e| log_and_convert("boards_update", e))?;
        Ok(updated.into())
    }

    pub async fn boards_delete(&self, org_id: Uuid, board_id: Uuid) -> Result<(), DomainError> {
        self.find_board_scoped(org_id, board_id).await?;
        board::Entity::delete_by_id(board_id)
            .exec(self.conn())
            .await
            .map_err(|e| log_and_convert("boards_delete", e))?;
        Ok(())
    }

    // ---- lists ----------------------------------------------------------

    pub async fn lists_create(
        &self,
        org_id: Uuid,
        board_id: Uuid,
        title: String,
    ) -> Result<List, DomainError> {
        self.find_board_scoped(org_id, board_id).await?;

        let last = list::Entity::find()
            .filter(list::Column::BoardId.eq(board_id))
            .order_by_desc(list::Column::Order)
            .one(self.conn())
            .await
            .map_err(|e| log_and_convert("lists_create.last", e))?;

        let order = next_after(last.as_ref().map(|l| l.order.as_str()));
        let model = list::ActiveModel {
            id: Set(Uuid::now_v7()),
            board_id: Set(board_id),
            title: Set(title),
            order: Set(order),
        };
        let inserted = model
            .insert(self.conn())
            .await
            .map_err(|e| log_and_convert("lists_create.insert", e))?;
        Ok(inserted.into())
    }

    pub async fn lists_update(
        &self,
        org_id: Uuid,
        list_id: Uuid,
        title: Option<String>,
    ) -> Result<List, DomainError> {
        let (existing, _board) = self.find_list_scoped(org_id, list_id).await?;
        let mut active: list::ActiveModel = existing.into();
        if let Some(title) = title {
            active.title = Set(title);
        }
        let updated = active
            .update(self.conn())
            .await
            .map_err(|e| log_and_convert("lists_update", e))?;
        Ok(updated.into())
    }

    pub async fn lists_delete(&self, org_id: Uuid, list_id: Uuid) -> Result<(), DomainError> {
        self.find_list_scoped(org_id, list_id).await?;
        list::Entity::delete_by_id(list_id)
            .exec(self.conn())
            .await
            .map_err(|e| log_and_convert("lists_delete", e))?;
        Ok(())
    }

    /// Bulk reorder (spec §4.5): `ordered_ids` must be exactly the set of
    /// list ids already on the board — a partial set (some ids missing, or
    /// ids belonging to a different board) is rejected with no partial
    /// write. Runs in a serializable transaction so a concurrent reorder
    /// of the same board can't interleave (spec §5 TOCTOU note).
    pub async fn lists_reorder(
        &self,
        org_id: Uuid,
        board_id: Uuid,
        ordered_ids: Vec<Uuid>,
    ) -> Result<Vec<List>, DomainError> {
        self.find_board_scoped(org_id, board_id).await?;

        let txn = self
            .conn()
            .begin_with_config(
                Some(sea_orm::IsolationLevel::Serializable),
                Some(sea_orm::AccessMode::ReadWrite),
            )
            .await
            .map_err(|e| log_and_convert("lists_reorder.begin", e))?;

        let current = list::Entity::find()
            .filter(list::Column::BoardId.eq(board_id))
            .all(&txn)
            .await
            .map_err(|e| log_and_convert("lists_reorder.current", e))?;

        let current_ids: BTreeSet<Uuid> = current.iter().map(|l| l.id).collect();
        let requested_ids: BTreeSet<Uuid> = ordered_ids.iter().copied().collect();
        if current_ids != requested_ids {
            return Err(DomainError::validation(
                "listIds",
                "reorder must include exactly the board's current lists",
            ));
        }

        let ranks = kanban_lexorank::rebalance(ordered_ids.len());
        for (list_id, rank) in ordered_ids.iter().zip(ranks.iter()) {
            list::ActiveModel {
                id: Set(*list_id),
                order: Set(rank.clone()),
                ..Default::default()
            }
            .update(&txn)
            .await
            .map_err(|e| log_and_convert("lists_reorder.update", e))?;
        }

        txn.commit()
            .await
            .map_err(|e| log_and_convert("lists_reorder.commit", e))?;

        self.lists_for_board(board_id).await
    }

    async fn lists_for_board(&self, board_id: Uuid) -> Result<Vec<List>, DomainError> {
        let rows = list::Entity::find()
            .filter(list::Column::BoardId.eq(board_id))
            .order_by_asc(list::Column::Order)
            .all(self.conn())
            .await
            .map_err(|e| log_and_convert("lists_for_board", e))?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    // ---- cards ------------------------------------------------------------

    pub async fn cards_find_unique(&self, org_id: Uuid, card_id: Uuid) -> Result<Card, DomainError> {
        let (card_row, _list, _board) = self.find_card_scoped(org_id, card_id).await?;
        Ok(card_row.into())
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn cards_create(
        &self,
        org_id: Uuid,
        list_id: Uuid,
        title: String,
        description: String,
        priority: Priority,
        limiter: &dyn PlanLimiter,
    ) -> Result<Card, DomainError> {
        let (_list, board_row) = self.find_list_scoped(org_id, list_id).await?;
        let org_row = org::Entity::find_by_id(board_row.org_id)
            .one(self.conn())
            .await
            .map_err(|e| log_and_convert("cards_create.find_org", e))?
            .ok_or(DomainError::NotFound)?;

        let existing = card::Entity::find()
            .filter(card::Column::ListId.eq(list_id))
            .count(self.conn())
            .await
            .map_err(|e| log_and_convert("cards_create.count", e))?;

        let org: kanban_domain::Organization = org_row.into();
        limiter.check_card_limit(org.plan, existing)?;

        let last = card::Entity::find()
            .filter(card::Column::ListId.eq(list_id))
            .order_by_desc(card::Column::Order)
            .one(self.conn())
            .await
            .map_err(|e| log_and_convert("cards_create.last", e))?;
        let order = next_after(last.as_ref().map(|c| c.order.as_str()));

        let model = card::ActiveModel {
            id: Set(Uuid::now_v7()),
            list_id: Set(list_id),
            title: Set(title),
            description: Set(description),
            priority: Set(card::priority_to_str(priority).to_owned()),
            due_date: Set(None),
            assignee_user_id: Set(None),
            order: Set(order),
            created_at: Set(OffsetDateTime::now_utc().into()),
        };
        let inserted = model
            .insert(self.conn())
            .await
            .map_err(|e| log_and_convert("cards_create.insert", e))?;
        Ok(inserted.into())
    }

    /// Returns `(updated_card, previous_list_id)` so the caller can decide
    /// whether to publish `CARD_MOVED` (spec §4.7 trigger).
    #[allow(clippy::too_many_arguments)]
    pub async fn cards_update(
        &self,
        org_id: Uuid,
        card_id: Uuid,
        title: Option<String>,
        description: Option<String>,
        priority: Option<Priority>,
        due_date: Option<Option<OffsetDateTime>>,
        assignee_user_id: Option<Option<Uuid>>,
        list_id: Option<Uuid>,
    ) -> Result<(Card, Uuid), DomainError> {
        let (existing, list_row, _board) = self.find_card_scoped(org_id, card_id).await?;
        let previous_list_id = existing.list_id;

        if let Some(target_list_id) = list_id {
            // Moving to another list must stay within the same board's org.
            self.find_list_scoped(org_id, target_list_id).await?;
        }

        let mut active: card::ActiveModel = existing.into();
        if let Some(title) = title {
            active.title = Set(title);
        }
        if let Some(description) = description {
            active.description = Set(description);
        }
        if let Some(priority) = priority {
            active.priority = Set(card::priority_to_str(priority).to_owned());
        }
        if let Some(due_date) = due_date {
            active.due_date = Set(due_date.map(Into::into));
        }
        if let Some(assignee) = assignee_user_id {
            active.assignee_user_id = Set(assignee);
        }
        if let Some(target_list_id) = list_id {
            active.list_id = Set(target_list_id);
            let target_last = card::Entity::find()
                .filter(card::Column::ListId.eq(target_list_id))
                .order_by_desc(card::Column::Order)
                .one(self.conn())
                .await
                .map_err(|e| log_and_convert("cards_update.target_last", e))?;
            active.order = Set(next_after(target_last.as_ref().map(|c| c.order.as_str())));
        }

        let updated = active
            .update(self.conn())
            .await
            .map_err(|e| log_and_convert("cards_update", e))?;
        let _ = list_row;
        Ok((updated.into(), previous_list_id))
    }

    pub async fn cards_delete(&self, org_id: Uuid, card_id: Uuid) -> Result<(), DomainError> {
        self.find_card_scoped(org_id, card_id).await?;
        card::Entity::delete_by_id(card_id)
            .exec(self.conn())
            .await
            .map_err(|e| log_and_convert("cards_delete", e))?;
        Ok(())
    }

    /// Bulk card reorder, optionally across lists within the same board.
    /// Same set-equality + serializable-transaction discipline as
    /// [`Self::lists_reorder`].
    pub async fn cards_reorder(
        &self,
        org_id: Uuid,
        list_id: Uuid,
        ordered_ids: Vec<Uuid>,
    ) -> Result<Vec<Card>, DomainError> {
        self.find_list_scoped(org_id, list_id).await?;

        let txn = self
            .conn()
            .begin_with_config(
                Some(sea_orm::IsolationLevel::Serializable),
                Some(sea_orm::AccessMode::ReadWrite),
            )
            .await
            .map_err(|e| log_and_convert("cards_reorder.begin", e))?;

        let current = card::Entity::find()
            .filter(card::Column::ListId.eq(list_id))
            .all(&txn)
            .await
            .map_err(|e| log_and_convert("cards_reorder.current", e))?;

        let current_ids: BTreeSet<Uuid> = current.iter().map(|c| c.id).collect();
        let requested_ids: BTreeSet<Uuid> = ordered_ids.iter().copied().collect();
        if current_ids != requested_ids {
            return Err(DomainError::validation(
                "cardIds",
                "reorder must include exactly the list's current cards",
            ));
        }

        let ranks = kanban_lexorank::rebalance(ordered_ids.len());
        for (card_id, rank) in ordered_ids.iter().zip(ranks.iter()) {
            card::ActiveModel {
                id: Set(*card_id),
                order: Set(rank.clone()),
                ..Default::default()
            }
            .update(&txn)
            .await
            .map_err(|e| log_and_convert("cards_reorder.update", e))?;
        }

        txn.commit()
            .await
            .map_err(|e| log_and_convert("cards_reorder.commit", e))?;

        let rows = card::Entity::find()
            .filter(card::Column::ListId.eq(list_id))
            .order_by_asc(card::Column::Order)
            .all(self.conn())
            .await
            .map_err(|e| log_and_convert("cards_reorder.reload", e))?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// `midpoint`-based single-item insert, used when a drag-and-drop only
    /// moves one card between two neighbors instead of reordering the
    /// whole list (spec §4.2 usage note).
    pub async fn cards_move_between(
        &self,
        org_id: Uuid,
        card_id: Uuid,
        target_list_id: Uuid,
        before: Option<&str>,
        after: Option<&str>,
    ) -> Result<Card, DomainError> {
        self.find_card_scoped(org_id, card_id).await?;
        self.find_list_scoped(org_id, target_list_id).await?;

        let order = match (before, after) {
            (Some(b), Some(a)) => midpoint(b, a),
            (Some(b), None) => next_after(Some(b)),
            (None, _) => next_after(None),
        };

        let active = card::ActiveModel {
            id: Set(card_id),
            list_id: Set(target_list_id),
            order: Set(order),
            ..Default::default()
        };
        let updated = active
            .update(self.conn())
            .await
            .map_err(|e| log_and_convert("cards_move_between", e))?;
        Ok(updated.into())
    }
}
