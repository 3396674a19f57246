//! Label, Comment, Reaction, Checklist repositories (spec §4.5, SPEC_FULL
//! §3.1). Labels are org-scoped directly; comments/reactions/checklists
//! reach the organization by walking the card's ownership chain.

use super::KanbanRepo;
use crate::entities::collab::{card_label, checklist, checklist_item, comment, label, reaction};
use crate::error::log_and_convert;
use kanban_domain::{Checklist, ChecklistItem, Comment, DomainError, Label, Reaction};
use kanban_lexorank::next_after;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, EntityTrait, QueryFilter, QueryOrder,
};
use time::OffsetDateTime;
use uuid::Uuid;

impl KanbanRepo {
    // ---- labels -----------------------------------------------------------

    pub async fn labels_list(&self, org_id: Uuid) -> Result<Vec<Label>, DomainError> {
        let rows = label::Entity::find()
            .filter(label::Column::OrgId.eq(org_id))
            .all(self.conn())
            .await
            .map_err(|e| log_and_convert("labels_list", e))?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    pub async fn labels_create(
        &self,
        org_id: Uuid,
        name: String,
        color: String,
    ) -> Result<Label, DomainError> {
        let model = label::ActiveModel {
            id: Set(Uuid::now_v7()),
            org_id: Set(org_id),
            name: Set(name),
            color: Set(color),
        };
        let inserted = model
            .insert(self.conn())
            .await
            .map_err(|e| log_and_convert("labels_create", e))?;
        Ok(inserted.into())
    }

    pub async fn labels_assign(
        &self,
        org_id: Uuid,
        card_id: Uuid,
        label_id: Uuid,
    ) -> Result<(), DomainError> {
        self.find_card_scoped(org_id, card_id).await?;
        let label_row = label::Entity::find_by_id(label_id)
            .filter(label::Column::OrgId.eq(org_id))
            .one(self.conn())
            .await
            .map_err(|e| log_and_convert("labels_assign.find_label", e))?;
        if label_row.is_none() {
            return Err(DomainError::NotFound);
        }

        let already = card_label::Entity::find_by_id((card_id, label_id))
            .one(self.conn())
            .await
            .map_err(|e| log_and_convert("labels_assign.check", e))?;
        if already.is_some() {
            return Ok(());
        }

        card_label::ActiveModel {
            card_id: Set(card_id),
            label_id: Set(label_id),
        }
        .insert(self.conn())
        .await
        .map_err(|e| log_and_convert("labels_assign.insert", e))?;
        Ok(())
    }

    pub async fn labels_unassign(
        &self,
        org_id: Uuid,
        card_id: Uuid,
        label_id: Uuid,
    ) -> Result<(), DomainError> {
        self.find_card_scoped(org_id, card_id).await?;
        card_label::Entity::delete_by_id((card_id, label_id))
            .exec(self.conn())
            .await
            .map_err(|e| log_and_convert("labels_unassign", e))?;
        Ok(())
    }

    // ---- comments ---------------------------------------------------------

    pub async fn comments_create(
        &self,
        org_id: Uuid,
        card_id: Uuid,
        author_user_id: Uuid,
        text: String,
        parent_id: Option<Uuid>,
    ) -> Result<Comment, DomainError> {
        self.find_card_scoped(org_id, card_id).await?;

        if let Some(parent) = parent_id {
            let parent_row = comment::Entity::find_by_id(parent)
                .filter(comment::Column::CardId.eq(card_id))
                .one(self.conn())
                .await
                .map_err(|e| log_and_convert("comments_create.find_parent", e))?;
            if parent_row.is_none() {
                return Err(DomainError::validation(
                    "parentId",
                    "parent comment must belong to the same card",
                ));
            }
        }

        let model = comment::ActiveModel {
            id: Set(Uuid::now_v7()),
            card_id: Set(card_id),
            author_user_id: Set(author_user_id),
            text: Set(text),
            parent_id: Set(parent_id),
            is_draft: Set(false),
            created_at: Set(OffsetDateTime::now_utc().into()),
        };
        let inserted = model
            .insert(self.conn())
            .await
            .map_err(|e| log_and_convert("comments_create.insert", e))?;
        Ok(inserted.into())
    }

    pub async fn comments_update(
        &self,
        org_id: Uuid,
        card_id: Uuid,
        comment_id: Uuid,
        text: String,
    ) -> Result<Comment, DomainError> {
        self.find_card_scoped(org_id, card_id).await?;
        let existing = comment::Entity::find_by_id(comment_id)
            .filter(comment::Column::CardId.eq(card_id))
            .one(self.conn())
            .await
            .map_err(|e| log_and_convert("comments_update.find", e))?
            .ok_or(DomainError::NotFound)?;

        let mut active: comment::ActiveModel = existing.into();
        active.text = Set(text);
        let updated = active
            .update(self.conn())
            .await
            .map_err(|e| log_and_convert("comments_update", e))?;
        Ok(updated.into())
    }

    pub async fn comments_delete(
        &self,
        org_id: Uuid,
        card_id: Uuid,
        comment_id: Uuid,
    ) -> Result<(), DomainError> {
        self.find_card_scoped(org_id, card_id).await?;
        let existing = comment::Entity::find_by_id(comment_id)
            .filter(comment::Column::CardId.eq(card_id))
            .one(self.conn())
            .await
            .map_err(|e| log_and_convert("comments_delete.find", e))?;
        if existing.is_none() {
            return Err(DomainError::NotFound);
        }
        comment::Entity::delete_by_id(comment_id)
            .exec(self.conn())
            .await
            .map_err(|e| log_and_convert("comments_delete", e))?;
        Ok(())
    }

    // ---- reactions --------------------------------------------------------

    pub async fn reactions_add(
        &self,
        org_id: Uuid,
        card_id: Uuid,
        comment_id: Uuid,
        user_id: Uuid,
        emoji: String,
    ) -> Result<Reaction, DomainError> {
        self.find_card_scoped(org_id, card_id).await?;
        let comment_row = comment::Entity::find_by_id(comment_id)
            .filter(comment::Column::CardId.eq(card_id))
            .one(self.conn())
            .await
            .map_err(|e| log_and_convert("reactions_add.find_comment", e))?;
        if comment_row.is_none() {
            return Err(DomainError::NotFound);
        }

        let existing = reaction::Entity::find()
            .filter(reaction::Column::CommentId.eq(comment_id))
            .filter(reaction::Column::UserId.eq(user_id))
            .filter(reaction::Column::Emoji.eq(emoji.clone()))
            .one(self.conn())
            .await
            .map_err(|e| log_and_convert("reactions_add.find_existing", e))?;
        if existing.is_some() {
            return Err(DomainError::conflict("Already reacted"));
        }

        let model = reaction::ActiveModel {
            id: Set(Uuid::now_v7()),
            comment_id: Set(comment_id),
            user_id: Set(user_id),
            emoji: Set(emoji),
        };
        let inserted = model
            .insert(self.conn())
            .await
            .map_err(|e| log_and_convert("reactions_add.insert", e))?;
        Ok(inserted.into())
    }

    pub async fn reactions_remove(
        &self,
        org_id: Uuid,
        card_id: Uuid,
        reaction_id: Uuid,
        user_id: Uuid,
    ) -> Result<(), DomainError> {
        self.find_card_scoped(org_id, card_id).await?;
        let existing = reaction::Entity::find_by_id(reaction_id)
            .one(self.conn())
            .await
            .map_err(|e| log_and_convert("reactions_remove.find", e))?
            .ok_or(DomainError::NotFound)?;
        if existing.user_id != user_id {
            // Only the reacting user may remove their own reaction; a
            // mismatch is indistinguishable from a missing row.
            return Err(DomainError::NotFound);
        }
        reaction::Entity::delete_by_id(reaction_id)
            .exec(self.conn())
            .await
            .map_err(|e| log_and_convert("reactions_remove", e))?;
        Ok(())
    }

    // ---- checklists (SPEC_FULL §3.1) ---------------------------------------

    pub async fn checklists_create(
        &self,
        org_id: Uuid,
        card_id: Uuid,
        title: String,
    ) -> Result<Checklist, DomainError> {
        self.find_card_scoped(org_id, card_id).await?;
        let last = checklist::Entity::find()
            .filter(checklist::Column::CardId.eq(card_id))
            .order_by_desc(checklist::Column::Order)
            .one(self.conn())
            .await
            .map_err(|e| log_and_convert("checklists_create.last", e))?;
        let order = next_after(last.as_ref().map(|c| c.order.as_str()));

        let model = checklist::ActiveModel {
            id: Set(Uuid::now_v7()),
            card_id: Set(card_id),
            title: Set(title),
            order: Set(order),
        };
        let inserted = model
            .insert(self.conn())
            .await
            .map_err(|e| log_and_convert("checklists_create.insert", e))?;
        Ok(inserted.into())
    }

    pub async fn checklist_items_add(
        &self,
        org_id: Uuid,
        card_id: Uuid,
        checklist_id: Uuid,
        text: String,
    ) -> Result<ChecklistItem, DomainError> {
        self.find_card_scoped(org_id, card_id).await?;
        let checklist_row = checklist::Entity::find_by_id(checklist_id)
            .filter(checklist::Column::CardId.eq(card_id))
            .one(self.conn())
            .await
            .map_err(|e| log_and_convert("checklist_items_add.find_checklist", e))?;
        if checklist_row.is_none() {
            return Err(DomainError::NotFound);
        }

        let last = checklist_item::Entity::find()
            .filter(checklist_item::Column::ChecklistId.eq(checklist_id))
            .order_by_desc(checklist_item::Column::Order)
            .one(self.conn())
            .await
            .map_err(|e| log_and_convert("checklist_items_add.last", e))?;
        let order = next_after(last.as_ref().map(|i| i.order.as_str()));

        let model = checklist_item::ActiveModel {
            id: Set(Uuid::now_v7()),
            checklist_id: Set(checklist_id),
            text: Set(text),
            is_complete: Set(false),
            order: Set(order),
        };
        let inserted = model
            .insert(self.conn())
            .await
            .map_err(|e| log_and_convert("checklist_items_add.insert", e))?;
        Ok(inserted.into())
    }

    /// `COMPLETE_CHECKLIST` automation action target (SPEC_FULL §3.1). When
    /// `item_id` is `None`, every item on the checklist is marked complete;
    /// otherwise only the named item is. Returns whether the whole
    /// checklist is complete afterward, for `CHECKLIST_COMPLETED` (spec
    /// §4.7 trigger).
    pub async fn checklists_complete(
        &self,
        org_id: Uuid,
        card_id: Uuid,
        checklist_id: Uuid,
        item_id: Option<Uuid>,
    ) -> Result<bool, DomainError> {
        self.find_card_scoped(org_id, card_id).await?;
        let checklist_row = checklist::Entity::find_by_id(checklist_id)
            .filter(checklist::Column::CardId.eq(card_id))
            .one(self.conn())
            .await
            .map_err(|e| log_and_convert("checklists_complete.find_checklist", e))?;
        if checklist_row.is_none() {
            return Err(DomainError::NotFound);
        }

        let mut items = checklist_item::Entity::find()
            .filter(checklist_item::Column::ChecklistId.eq(checklist_id))
            .all(self.conn())
            .await
            .map_err(|e| log_and_convert("checklists_complete.items", e))?;

        match item_id {
            Some(target) => {
                if !items.iter().any(|i| i.id == target) {
                    return Err(DomainError::NotFound);
                }
                checklist_item::ActiveModel {
                    id: Set(target),
                    is_complete: Set(true),
                    ..Default::default()
                }
                .update(self.conn())
                .await
                .map_err(|e| log_and_convert("checklists_complete.update_one", e))?;
                if let Some(i) = items.iter_mut().find(|i| i.id == target) {
                    i.is_complete = true;
                }
            }
            None => {
                for item in &items {
                    checklist_item::ActiveModel {
                        id: Set(item.id),
                        is_complete: Set(true),
                        ..Default::default()
                    }
                    .update(self.conn())
                    .await
                    .map_err(|e| log_and_convert("checklists_complete.update_all", e))?;
                }
                items.iter_mut().for_each(|i| i.is_complete = true);
            }
        }

        Ok(items.iter().all(|i| i.is_complete))
    }

    pub(crate) async fn card_label_ids(
        &self,
        card_id: Uuid,
    ) -> Result<Vec<Uuid>, DomainError> {
        let rows = card_label::Entity::find()
            .filter(card_label::Column::CardId.eq(card_id))
            .all(self.conn())
            .await
            .map_err(|e| log_and_convert("card_label_ids", e))?;
        Ok(rows.into_iter().map(|r| r.label_id).collect())
    }
}
