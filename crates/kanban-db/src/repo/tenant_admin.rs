//! User/Membership self-healing provisioning (spec §4.3), plus the
//! Automation, Webhook, and `AuditLog` repositories that back the event
//! bus, the automation engine, and the webhook dispatcher.

use super::KanbanRepo;
use crate::entities::audit::audit_log;
use crate::entities::automation::{automation, automation_log};
use crate::entities::tenant::{membership, org, user};
use crate::entities::webhook::{webhook, webhook_delivery};
use crate::error::log_and_convert;
use kanban_domain::{
    Automation, AutomationAction, AutomationCondition, AutomationLog, AutomationTrigger,
    AuditAction, AuditLog, DomainError, Membership, Role, User, Webhook, WebhookDelivery,
};
use sea_orm::{ActiveModelTrait, ActiveValue::Set, ColumnTrait, DbErr, EntityTrait, QueryFilter};
use time::OffsetDateTime;
use uuid::Uuid;

impl KanbanRepo {
    // ---- users / memberships (spec §4.3 self-healing provisioning) --------

    pub async fn users_find_by_external_id(
        &self,
        external_identity_id: &str,
    ) -> Result<Option<User>, DomainError> {
        let row = user::Entity::find()
            .filter(user::Column::ExternalIdentityId.eq(external_identity_id))
            .one(self.conn())
            .await
            .map_err(|e| log_and_convert("users_find_by_external_id", e))?;
        Ok(row.map(Into::into))
    }

    /// Inserts a new local user row for an identity the provider vouched
    /// for. Races against a concurrent insert of the same
    /// `external_identity_id` by re-reading on a unique-constraint
    /// violation instead of failing the request — two requests for a
    /// brand-new identity arriving at once both succeed with the same row
    /// (spec §4.3 "self-healing").
    pub async fn users_find_or_create(
        &self,
        external_identity_id: &str,
        email: &str,
        display_name: &str,
    ) -> Result<User, DomainError> {
        if let Some(existing) = self.users_find_by_external_id(external_identity_id).await? {
            return Ok(existing);
        }

        let model = user::ActiveModel {
            id: Set(Uuid::now_v7()),
            external_identity_id: Set(external_identity_id.to_owned()),
            email: Set(email.to_owned()),
            display_name: Set(display_name.to_owned()),
            avatar_url: Set(None),
        };

        match model.insert(self.conn()).await {
            Ok(inserted) => Ok(inserted.into()),
            Err(DbErr::Query(_) | DbErr::Exec(_)) => self
                .users_find_by_external_id(external_identity_id)
                .await?
                .ok_or_else(|| {
                    DomainError::internal("user provisioning race did not resolve to a row")
                }),
            Err(other) => Err(log_and_convert("users_find_or_create.insert", other)),
        }
    }

    pub async fn memberships_find(
        &self,
        user_id: Uuid,
        org_id: Uuid,
    ) -> Result<Option<Membership>, DomainError> {
        let row = membership::Entity::find_by_id((user_id, org_id))
            .one(self.conn())
            .await
            .map_err(|e| log_and_convert("memberships_find", e))?;
        Ok(row.map(Into::into))
    }

    /// Same unique-constraint-then-re-read race handling as
    /// [`Self::users_find_or_create`] (spec §4.3).
    pub async fn memberships_find_or_create(
        &self,
        user_id: Uuid,
        org_id: Uuid,
        default_role: Role,
    ) -> Result<Membership, DomainError> {
        if let Some(existing) = self.memberships_find(user_id, org_id).await? {
            return Ok(existing);
        }

        let model = membership::ActiveModel {
            user_id: Set(user_id),
            org_id: Set(org_id),
            role: Set(default_role.to_string()),
            is_active: Set(true),
            joined_at: Set(OffsetDateTime::now_utc().into()),
        };

        match model.insert(self.conn()).await {
            Ok(inserted) => Ok(inserted.into()),
            Err(DbErr::Query(_) | DbErr::Exec(_)) => self
                .memberships_find(user_id, org_id)
                .await?
                .ok_or_else(|| {
                    DomainError::internal("membership provisioning race did not resolve to a row")
                }),
            Err(other) => Err(log_and_convert("memberships_find_or_create.insert", other)),
        }
    }

    pub async fn org_exists(&self, org_id: Uuid) -> Result<bool, DomainError> {
        let row = org::Entity::find_by_id(org_id)
            .one(self.conn())
            .await
            .map_err(|e| log_and_convert("org_exists", e))?;
        Ok(row.is_some())
    }

    // ---- automations (spec §4.7) -------------------------------------------

    pub async fn automations_for_org(&self, org_id: Uuid) -> Result<Vec<Automation>, DomainError> {
        let rows = automation::Entity::find()
            .filter(automation::Column::OrgId.eq(org_id))
            .filter(automation::Column::IsEnabled.eq(true))
            .all(self.conn())
            .await
            .map_err(|e| log_and_convert("automations_for_org", e))?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn automations_create(
        &self,
        org_id: Uuid,
        board_id: Option<Uuid>,
        name: String,
        trigger: AutomationTrigger,
        conditions: Vec<AutomationCondition>,
        actions: Vec<AutomationAction>,
    ) -> Result<Automation, DomainError> {
        let model = automation::ActiveModel {
            id: Set(Uuid::now_v7()),
            org_id: Set(org_id),
            board_id: Set(board_id),
            name: Set(name),
            is_enabled: Set(true),
            trigger: Set(trigger),
            conditions: Set(conditions),
            actions: Set(actions),
            run_count: Set(0),
            last_run_at: Set(None),
        };
        let inserted = model
            .insert(self.conn())
            .await
            .map_err(|e| log_and_convert("automations_create", e))?;
        Ok(inserted.into())
    }

    /// Bumps `run_count`/`last_run_at` — only called after every action in
    /// the automation ran without error (spec §4.7 "success-only
    /// accounting").
    pub async fn automations_record_success(&self, automation_id: Uuid) -> Result<(), DomainError> {
        let existing = automation::Entity::find_by_id(automation_id)
            .one(self.conn())
            .await
            .map_err(|e| log_and_convert("automations_record_success.find", e))?
            .ok_or(DomainError::NotFound)?;
        automation::ActiveModel {
            id: Set(automation_id),
            run_count: Set(existing.run_count + 1),
            last_run_at: Set(Some(OffsetDateTime::now_utc().into())),
            ..Default::default()
        }
        .update(self.conn())
        .await
        .map_err(|e| log_and_convert("automations_record_success.update", e))?;
        Ok(())
    }

    pub async fn automation_logs_create(
        &self,
        automation_id: Uuid,
        card_id: Option<Uuid>,
        success: bool,
        error: Option<String>,
    ) -> Result<AutomationLog, DomainError> {
        let model = automation_log::ActiveModel {
            id: Set(Uuid::now_v7()),
            automation_id: Set(automation_id),
            card_id: Set(card_id),
            success: Set(success),
            error: Set(error),
            created_at: Set(OffsetDateTime::now_utc().into()),
        };
        let inserted = model
            .insert(self.conn())
            .await
            .map_err(|e| log_and_convert("automation_logs_create", e))?;
        Ok(inserted.into())
    }

    // ---- webhooks (spec §4.8) -----------------------------------------------

    pub async fn webhooks_for_event(
        &self,
        org_id: Uuid,
        event_type: &str,
    ) -> Result<Vec<Webhook>, DomainError> {
        let rows = webhook::Entity::find()
            .filter(webhook::Column::OrgId.eq(org_id))
            .filter(webhook::Column::IsEnabled.eq(true))
            .all(self.conn())
            .await
            .map_err(|e| log_and_convert("webhooks_for_event", e))?;
        Ok(rows
            .into_iter()
            .map(Into::<Webhook>::into)
            .filter(|w| w.events.iter().any(|e| e == event_type))
            .collect())
    }

    pub async fn webhooks_create(
        &self,
        org_id: Uuid,
        url: String,
        secret: String,
        events: Vec<String>,
    ) -> Result<Webhook, DomainError> {
        let model = webhook::ActiveModel {
            id: Set(Uuid::now_v7()),
            org_id: Set(org_id),
            url: Set(url),
            secret: Set(secret),
            events: Set(events),
            is_enabled: Set(true),
        };
        let inserted = model
            .insert(self.conn())
            .await
            .map_err(|e| log_and_convert("webhooks_create", e))?;
        Ok(inserted.into())
    }

    pub async fn webhook_deliveries_create(
        &self,
        webhook_id: Uuid,
        event: String,
        payload: serde_json::Value,
        status_code: Option<u16>,
        success: bool,
        duration_ms: u64,
    ) -> Result<WebhookDelivery, DomainError> {
        let model = webhook_delivery::ActiveModel {
            id: Set(Uuid::now_v7()),
            webhook_id: Set(webhook_id),
            event: Set(event),
            payload: Set(payload),
            status_code: Set(status_code.map(i32::from)),
            success: Set(success),
            duration_ms: Set(duration_ms.min(i64::MAX as u64) as i64),
            created_at: Set(OffsetDateTime::now_utc().into()),
        };
        let inserted = model
            .insert(self.conn())
            .await
            .map_err(|e| log_and_convert("webhook_deliveries_create", e))?;
        Ok(inserted.into())
    }

    // ---- audit log (spec §4.9) ---------------------------------------------

    #[allow(clippy::too_many_arguments)]
    pub async fn audit_logs_create(
        &self,
        org_id: Uuid,
        user_id: Uuid,
        entity_type: String,
        entity_id: Uuid,
        entity_title: String,
        action: AuditAction,
        ip_address: Option<String>,
        user_agent: Option<String>,
    ) -> Result<AuditLog, DomainError> {
        let model = audit_log::ActiveModel {
            id: Set(Uuid::now_v7()),
            org_id: Set(org_id),
            user_id: Set(user_id),
            entity_type: Set(entity_type),
            entity_id: Set(entity_id),
            entity_title: Set(entity_title),
            action: Set(audit_log::action_to_str(action).to_owned()),
            ip_address: Set(ip_address),
            user_agent: Set(user_agent),
            created_at: Set(OffsetDateTime::now_utc().into()),
        };
        let inserted = model
            .insert(self.conn())
            .await
            .map_err(|e| log_and_convert("audit_logs_create", e))?;
        Ok(inserted.into())
    }
}
