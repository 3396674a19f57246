//! Automation engine (spec §4.7 component H).
//!
//! `run_automations` is grounded on the same
//! validate→resolve→authorize→execute→log shape the teacher uses end to end
//! in `users_info::UsersService` methods, specialized here to: match
//! trigger, evaluate conditions, execute actions, log outcome, account on
//! success. `#[tracing::instrument]` on the entry point and a per-action
//! catch mirror `log_and_convert`'s "log once, never twice" discipline
//! (spec §4.10).

use async_trait::async_trait;
use kanban_db::KanbanRepo;
use kanban_domain::events::{EventContext, EventEnvelope, EventType};
use kanban_domain::{Automation, AutomationAction, AutomationCondition, AutomationTrigger, Card,
    ConditionOp, DomainError, Priority};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use time::{Duration as TimeDuration, OffsetDateTime};
use uuid::Uuid;

use crate::bus::EventSubscriber;

/// Publish endpoint for `SEND_NOTIFICATION` (spec §1 non-goal: realtime
/// presence/broadcast is "consumed as a publish endpoint", not implemented
/// here).
pub trait NotificationSink: Send + Sync {
    fn notify(&self, user_id: Uuid, message: &str);
}

/// Default sink for deployments with no realtime layer wired up yet: logs
/// instead of silently dropping.
pub struct LoggingNotificationSink;

impl NotificationSink for LoggingNotificationSink {
    fn notify(&self, user_id: Uuid, message: &str) {
        tracing::info!(%user_id, message, "notification (no realtime sink configured)");
    }
}

pub struct AutomationEngine {
    repo: Arc<KanbanRepo>,
    notifications: Arc<dyn NotificationSink>,
    system_user_id: Option<Uuid>,
    max_depth: u8,
}

impl AutomationEngine {
    #[must_use]
    pub fn new(
        repo: Arc<KanbanRepo>,
        notifications: Arc<dyn NotificationSink>,
        system_user_id: Option<Uuid>,
        max_depth: u8,
    ) -> Self {
        Self {
            repo,
            notifications,
            system_user_id,
            max_depth,
        }
    }

    /// `runAutomations(event)` (spec §4.7). Never returns an error or
    /// panics outward — "the engine never throws outward" (step 5).
    #[tracing::instrument(skip(self, event), fields(org_id = %event.org_id, card_id = %event.card_id, depth = event.depth))]
    pub async fn run(&self, event: EventEnvelope) {
        if event.depth > self.max_depth {
            tracing::warn!("automation recursion depth exceeded, dropping event with no I/O");
            return;
        }

        let automations = match self.repo.automations_for_org(event.org_id).await {
            Ok(rows) => rows,
            Err(e) => {
                tracing::error!(error = ?e, "failed to load automations for org");
                return;
            }
        };
        if automations.is_empty() {
            return;
        }

        let card = match self.repo.cards_find_unique(event.org_id, event.card_id).await {
            Ok(card) => card,
            Err(_) => return,
        };

        for automation in &automations {
            if automation.board_id.is_some() && automation.board_id != Some(event.board_id) {
                continue;
            }
            if !trigger_matches(&automation.trigger, &event) {
                continue;
            }
            if !conditions_pass(&automation.conditions, &card) {
                continue;
            }

            self.run_actions(automation, &event, &card).await;
        }
    }

    async fn run_actions(&self, automation: &Automation, event: &EventEnvelope, card: &Card) {
        let mut first_error: Option<String> = None;
        let mut cascades: Vec<EventEnvelope> = Vec::new();

        for action in &automation.actions {
            match self.execute_action(action, event, card).await {
                Ok(cascade) => cascades.extend(cascade),
                Err(e) => {
                    tracing::warn!(automation_id = %automation.id, error = ?e, "automation action failed");
                    if first_error.is_none() {
                        first_error = Some(e.to_string());
                    }
                }
            }
        }

        let success = first_error.is_none();
        if let Err(e) = self
            .repo
            .automation_logs_create(automation.id, Some(card.id), success, first_error)
            .await
        {
            tracing::error!(automation_id = %automation.id, error = ?e, "failed to append automation log");
        }

        if success {
            if let Err(e) = self.repo.automations_record_success(automation.id).await {
                tracing::error!(automation_id = %automation.id, error = ?e, "failed to record automation success");
            }
        }

        for cascade in cascades {
            self.run_boxed(cascade).await;
        }
    }

    fn run_boxed(&self, event: EventEnvelope) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        Box::pin(self.run(event))
    }

    async fn execute_action(
        &self,
        action: &AutomationAction,
        event: &EventEnvelope,
        card: &Card,
    ) -> Result<Option<EventEnvelope>, DomainError> {
        match action {
            AutomationAction::SetPriority { priority } => {
                if card.priority == *priority {
                    return Ok(None);
                }
                let old_priority = card.priority;
                self.repo
                    .cards_update(
                        event.org_id,
                        card.id,
                        None,
                        None,
                        Some(*priority),
                        None,
                        None,
                        None,
                    )
                    .await?;
                Ok(Some(event.child(
                    EventType::PriorityChanged,
                    EventContext::PriorityChanged {
                        old_priority,
                        new_priority: *priority,
                    },
                )))
            }
            AutomationAction::AssignMember { assignee_id } => {
                self.repo
                    .cards_update(
                        event.org_id,
                        card.id,
                        None,
                        None,
                        None,
                        None,
                        Some(Some(*assignee_id)),
                        None,
                    )
                    .await?;
                Ok(Some(event.child(
                    EventType::MemberAssigned,
                    EventContext::MemberAssigned {
                        assignee_id: Some(*assignee_id),
                    },
                )))
            }
            AutomationAction::AddLabel { label_id } => {
                self.repo
                    .labels_assign(event.org_id, card.id, *label_id)
                    .await?;
                Ok(Some(event.child(
                    EventType::LabelAdded,
                    EventContext::LabelAdded { label_id: *label_id },
                )))
            }
            AutomationAction::RemoveLabel { label_id } => {
                self.repo
                    .labels_unassign(event.org_id, card.id, *label_id)
                    .await?;
                Ok(None)
            }
            AutomationAction::SetDueDateOffset { days_offset } => {
                let Some(old_due) = card.due_date else {
                    return Ok(None);
                };
                let new_due = old_due + TimeDuration::seconds(days_offset * 86_400);
                self.repo
                    .cards_update(
                        event.org_id,
                        card.id,
                        None,
                        None,
                        None,
                        Some(Some(new_due)),
                        None,
                        None,
                    )
                    .await?;
                Ok(None)
            }
            AutomationAction::MoveCard { list_id } => {
                let from_list_id = card.list_id;
                self.repo
                    .cards_update(
                        event.org_id,
                        card.id,
                        None,
                        None,
                        None,
                        None,
                        None,
                        Some(*list_id),
                    )
                    .await?;
                Ok(Some(event.child(
                    EventType::CardMoved,
                    EventContext::CardMoved {
                        from_list_id,
                        to_list_id: *list_id,
                    },
                )))
            }
            AutomationAction::CompleteChecklist { checklist_id, item_id } => {
                let fully_complete = self
                    .repo
                    .checklists_complete(event.org_id, card.id, *checklist_id, *item_id)
                    .await?;
                Ok(fully_complete.then(|| event.child(EventType::ChecklistCompleted, EventContext::None)))
            }
            AutomationAction::PostComment { comment } => {
                let Some(system_user_id) = self.system_user_id else {
                    return Err(DomainError::internal(
                        "POST_COMMENT requires SYSTEM_USER_ID to be configured",
                    ));
                };
                if comment.trim().is_empty() {
                    return Err(DomainError::internal("POST_COMMENT requires a non-empty comment"));
                }
                self.repo
                    .comments_create(event.org_id, card.id, system_user_id, comment.clone(), None)
                    .await?;
                Ok(None)
            }
            AutomationAction::SendNotification { notification_message } => {
                if self.system_user_id.is_none() {
                    return Err(DomainError::internal(
                        "SEND_NOTIFICATION requires SYSTEM_USER_ID to be configured",
                    ));
                }
                let Some(assignee_id) = card.assignee_user_id else {
                    return Err(DomainError::internal("SEND_NOTIFICATION requires an assigned card"));
                };
                if notification_message.trim().is_empty() {
                    return Err(DomainError::internal(
                        "SEND_NOTIFICATION requires a non-empty message",
                    ));
                }
                self.notifications.notify(assignee_id, notification_message);
                Ok(None)
            }
        }
    }
}

#[async_trait]
impl EventSubscriber for AutomationEngine {
    async fn handle(&self, event: EventEnvelope) {
        self.run(event).await;
    }
}

/// Trigger-match rules (spec §4.7 step 4). `CARD_DELETED` and any unknown
/// trigger deliberately never match.
fn trigger_matches(trigger: &AutomationTrigger, event: &EventEnvelope) -> bool {
    match (trigger, event.event_type) {
        (AutomationTrigger::CardCreated, EventType::CardCreated) => true,
        (AutomationTrigger::CardMoved { list_id }, EventType::CardMoved) => {
            let EventContext::CardMoved { from_list_id, .. } = &event.context else {
                return false;
            };
            list_id.is_none_or(|wanted| wanted == *from_list_id)
        }
        (AutomationTrigger::CardDeleted, _) => false,
        (AutomationTrigger::CardDueSoon { days_before_due }, EventType::CardDueSoon) => {
            let EventContext::CardDueSoon { due_date } = &event.context else {
                return false;
            };
            let threshold = OffsetDateTime::now_utc() + TimeDuration::days(*days_before_due);
            *due_date <= threshold
        }
        (AutomationTrigger::CardOverdue, EventType::CardOverdue) => true,
        (AutomationTrigger::LabelAdded { label_id }, EventType::LabelAdded) => {
            let EventContext::LabelAdded { label_id: added } = &event.context else {
                return false;
            };
            label_id.is_none_or(|wanted| wanted == *added)
        }
        (AutomationTrigger::ChecklistCompleted, EventType::ChecklistCompleted) => true,
        (AutomationTrigger::MemberAssigned, EventType::MemberAssigned) => true,
        (AutomationTrigger::PriorityChanged, EventType::PriorityChanged) => true,
        (AutomationTrigger::CardTitleContains { keyword }, EventType::CardTitleContains) => {
            let EventContext::CardTitleContains { card_title } = &event.context else {
                return false;
            };
            card_title.to_lowercase().contains(&keyword.to_lowercase())
        }
        _ => false,
    }
}

/// Condition evaluation (spec §4.7 step 4): empty condition list always
/// passes, unknown operators fail closed.
fn conditions_pass(conditions: &[AutomationCondition], card: &Card) -> bool {
    conditions.iter().all(|c| condition_passes(c, card))
}

fn condition_passes(condition: &AutomationCondition, card: &Card) -> bool {
    let actual = card_field_value(card, &condition.field);
    match &condition.op {
        ConditionOp::IsNull => actual.is_none(),
        ConditionOp::IsNotNull => actual.is_some(),
        ConditionOp::Eq => actual == condition.value,
        ConditionOp::Neq => actual != condition.value,
        ConditionOp::Unknown => false,
    }
}

fn card_field_value(card: &Card, field: &str) -> Option<serde_json::Value> {
    match field {
        "title" => Some(serde_json::Value::String(card.title.clone())),
        "description" => Some(serde_json::Value::String(card.description.clone())),
        "priority" => serde_json::to_value(card.priority).ok(),
        "assigneeUserId" => card
            .assignee_user_id
            .map(|id| serde_json::Value::String(id.to_string())),
        "dueDate" => card
            .due_date
            .and_then(|d| d.format(&time::format_description::well_known::Rfc3339).ok())
            .map(serde_json::Value::String),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kanban_db::Migrator;
    use kanban_domain::AutomationCondition;
    use sea_orm::{ActiveModelTrait, ActiveValue::Set, Database};
    use sea_orm_migration::MigratorTrait;

    struct NoopSink;
    impl NotificationSink for NoopSink {
        fn notify(&self, _user_id: Uuid, _message: &str) {}
    }

    async fn seeded_repo() -> (Arc<KanbanRepo>, Uuid, Uuid, Uuid, Uuid) {
        let conn = Database::connect("sqlite::memory:").await.unwrap();
        Migrator::up(&conn, None).await.unwrap();
        let repo = Arc::new(KanbanRepo::new(Arc::new(conn)));

        let org_id = Uuid::now_v7();
        kanban_db::entities::tenant::org::ActiveModel {
            id: Set(org_id),
            name: Set("Acme".to_owned()),
            slug: Set("acme".to_owned()),
            plan: Set("FREE".to_owned()),
            deleted_at: Set(None),
        }
        .insert(repo.conn())
        .await
        .unwrap();

        let board = repo
            .boards_create(org_id, "Board".to_owned(), None, &kanban_db::StaticPlanLimiter::default())
            .await
            .unwrap();
        let list = repo.lists_create(org_id, board.id, "Todo".to_owned()).await.unwrap();
        let card = repo
            .cards_create(
                org_id,
                list.id,
                "Ship it".to_owned(),
                String::new(),
                Priority::Low,
                &kanban_db::StaticPlanLimiter::default(),
            )
            .await
            .unwrap();

        (repo, org_id, board.id, list.id, card.id)
    }

    #[tokio::test]
    async fn depth_over_ceiling_does_no_io() {
        let (repo, org_id, board_id, _list_id, card_id) = seeded_repo().await;
        let engine = AutomationEngine::new(repo, Arc::new(NoopSink), None, 3);
        let event = EventEnvelope::new(EventType::CardCreated, org_id, board_id, card_id).with_depth(4);
        // No automations exist yet; this mainly proves no panic on an
        // over-depth event with a populated org.
        engine.run(event).await;
    }

    #[tokio::test]
    async fn matching_trigger_executes_action_and_logs_success() {
        let (repo, org_id, board_id, _list_id, card_id) = seeded_repo().await;
        repo.automations_create(
            org_id,
            Some(board_id),
            "Escalate".to_owned(),
            AutomationTrigger::CardCreated,
            Vec::new(),
            vec![AutomationAction::SetPriority {
                priority: Priority::Urgent,
            }],
        )
        .await
        .unwrap();

        let engine = AutomationEngine::new(repo.clone(), Arc::new(NoopSink), None, 3);
        let event = EventEnvelope::new(EventType::CardCreated, org_id, board_id, card_id);
        engine.run(event).await;

        let card = repo.cards_find_unique(org_id, card_id).await.unwrap();
        assert_eq!(card.priority, Priority::Urgent);
    }

    #[tokio::test]
    async fn card_deleted_trigger_never_matches() {
        let (repo, org_id, board_id, _list_id, card_id) = seeded_repo().await;
        repo.automations_create(
            org_id,
            Some(board_id),
            "Never".to_owned(),
            AutomationTrigger::CardDeleted,
            Vec::new(),
            vec![AutomationAction::SetPriority {
                priority: Priority::Urgent,
            }],
        )
        .await
        .unwrap();

        let engine = AutomationEngine::new(repo.clone(), Arc::new(NoopSink), None, 3);
        let event = EventEnvelope::new(EventType::CardDeleted, org_id, board_id, card_id);
        engine.run(event).await;

        let card = repo.cards_find_unique(org_id, card_id).await.unwrap();
        assert_eq!(card.priority, Priority::Low);
    }

    #[tokio::test]
    async fn unknown_condition_op_fails_closed() {
        let (repo, org_id, board_id, _list_id, card_id) = seeded_repo().await;
        repo.automations_create(
            org_id,
            Some(board_id),
            "Gate".to_owned(),
            AutomationTrigger::CardCreated,
            vec![AutomationCondition {
                field: "title".to_owned(),
                op: ConditionOp::Unknown,
                value: None,
            }],
            vec![AutomationAction::SetPriority {
                priority: Priority::Urgent,
            }],
        )
        .await
        .unwrap();

        let engine = AutomationEngine::new(repo.clone(), Arc::new(NoopSink), None, 3);
        let event = EventEnvelope::new(EventType::CardCreated, org_id, board_id, card_id);
        engine.run(event).await;

        let card = repo.cards_find_unique(org_id, card_id).await.unwrap();
        assert_eq!(card.priority, Priority::Low);
    }
}
