use super::bearer_token;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::Json;
use kanban_actions::{run_safe_action, FieldError, SafeActionRequest, SafeActionResult, Validate};
use kanban_db::KanbanRepo;
use kanban_domain::events::{EventContext, EventEnvelope, EventType};
use kanban_domain::{AuditAction, Card, Priority, Role, TenantContext};
use kanban_events::EventPublisher;
use serde::Deserialize;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct CreateCardPayload {
    pub org_id: Uuid,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_priority")]
    pub priority: Priority,
}

fn default_priority() -> Priority {
    Priority::Medium
}

impl Validate for CreateCardPayload {
    fn validate(&self) -> Vec<FieldError> {
        if self.title.trim().is_empty() {
            vec![FieldError {
                field: "title".to_owned(),
                message: "title must not be empty".to_owned(),
            }]
        } else {
            Vec::new()
        }
    }
}

pub async fn create(
    State(state): State<AppState>,
    Path(list_id): Path<Uuid>,
    headers: HeaderMap,
    Json(payload): Json<CreateCardPayload>,
) -> Json<SafeActionResult<Card>> {
    let bearer_token = match bearer_token(&headers) {
        Ok(token) => token,
        Err(response) => return response,
    };
    let org_id = payload.org_id;

    let result = run_safe_action(
        SafeActionRequest {
            bearer_token,
            org_id,
            action_name: "create-card",
            min_role: Role::Member,
            resolver: &state.resolver,
            rate_limiter: &state.rate_limiter,
            demo_org_id: &state.limits.demo_org_id,
        },
        payload,
        {
            let state = state.clone();
            move |ctx: TenantContext, payload| async move {
                let card = state
                    .repo
                    .cards_create(
                        org_id,
                        list_id,
                        payload.title.clone(),
                        payload.description,
                        payload.priority,
                        state.plan_limiter.as_ref(),
                    )
                    .await?;

                let board_id = board_id_for_list(&state.repo, org_id, list_id).await?;
                state.events.publish(EventEnvelope::new(
                    EventType::CardCreated,
                    org_id,
                    board_id,
                    card.id,
                ));
                state.audit.record(kanban_audit::AuditEntry {
                    org_id,
                    user_id: ctx.user_id,
                    entity_type: "card".to_owned(),
                    entity_id: card.id,
                    entity_title: payload.title,
                    action: AuditAction::Create,
                    ip_address: None,
                    user_agent: None,
                });

                Ok(card)
            }
        },
    )
    .await;

    Json(result)
}

async fn board_id_for_list(
    repo: &KanbanRepo,
    org_id: Uuid,
    list_id: Uuid,
) -> Result<Uuid, kanban_domain::DomainError> {
    let (_list, board) = repo.find_list_scoped(org_id, list_id).await?;
    Ok(board.id)
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct UpdateCardPayload {
    pub org_id: Uuid,
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<Priority>,
    pub due_date: Option<Option<OffsetDateTime>>,
    pub assignee_user_id: Option<Option<Uuid>>,
    pub list_id: Option<Uuid>,
}

impl Default for UpdateCardPayload {
    fn default() -> Self {
        Self {
            org_id: Uuid::nil(),
            title: None,
            description: None,
            priority: None,
            due_date: None,
            assignee_user_id: None,
            list_id: None,
        }
    }
}

impl Validate for UpdateCardPayload {
    fn validate(&self) -> Vec<FieldError> {
        Vec::new()
    }
}

pub async fn update(
    State(state): State<AppState>,
    Path(card_id): Path<Uuid>,
    headers: HeaderMap,
    Json(payload): Json<UpdateCardPayload>,
) -> Json<SafeActionResult<Card>> {
    let bearer_token = match bearer_token(&headers) {
        Ok(token) => token,
        Err(response) => return response,
    };
    let org_id = payload.org_id;

    let result = run_safe_action(
        SafeActionRequest {
            bearer_token,
            org_id,
            action_name: "update-card",
            min_role: Role::Member,
            resolver: &state.resolver,
            rate_limiter: &state.rate_limiter,
            demo_org_id: &state.limits.demo_org_id,
        },
        payload,
        {
            let state = state.clone();
            move |ctx: TenantContext, payload| async move {
                let assignee_changed = payload.assignee_user_id.is_some();
                let new_assignee = payload.assignee_user_id.flatten();
                let target_list = payload.list_id;

                let (card, previous_list_id) = state
                    .repo
                    .cards_update(
                        org_id,
                        card_id,
                        payload.title,
                        payload.description,
                        payload.priority,
                        payload.due_date,
                        payload.assignee_user_id,
                        payload.list_id,
                    )
                    .await?;

                let board_id = board_id_for_list(&state.repo, org_id, card.list_id).await?;

                if let Some(to_list_id) = target_list {
                    if to_list_id != previous_list_id {
                        state.events.publish(EventEnvelope::new(
                            EventType::CardMoved,
                            org_id,
                            board_id,
                            card.id,
                        ).with_context(EventContext::CardMoved {
                            from_list_id: previous_list_id,
                            to_list_id,
                        }));
                    }
                }

                if assignee_changed {
                    state.events.publish(EventEnvelope::new(
                        EventType::MemberAssigned,
                        org_id,
                        board_id,
                        card.id,
                    ).with_context(EventContext::MemberAssigned {
                        assignee_id: new_assignee,
                    }));
                }

                state.audit.record(kanban_audit::AuditEntry {
                    org_id,
                    user_id: ctx.user_id,
                    entity_type: "card".to_owned(),
                    entity_id: card.id,
                    entity_title: card.title.clone(),
                    action: AuditAction::Update,
                    ip_address: None,
                    user_agent: None,
                });

                Ok(card)
            }
        },
    )
    .await;

    Json(result)
}

#[derive(Debug, Deserialize)]
pub struct ReorderCardsPayload {
    pub org_id: Uuid,
    pub card_ids: Vec<Uuid>,
}

impl Validate for ReorderCardsPayload {
    fn validate(&self) -> Vec<FieldError> {
        if self.card_ids.is_empty() {
            vec![FieldError {
                field: "cardIds".to_owned(),
                message: "cardIds must not be empty".to_owned(),
            }]
        } else {
            Vec::new()
        }
    }
}

pub async fn reorder(
    State(state): State<AppState>,
    Path(list_id): Path<Uuid>,
    headers: HeaderMap,
    Json(payload): Json<ReorderCardsPayload>,
) -> Json<SafeActionResult<Vec<Card>>> {
    let bearer_token = match bearer_token(&headers) {
        Ok(token) => token,
        Err(response) => return response,
    };
    let org_id = payload.org_id;

    let result = run_safe_action(
        SafeActionRequest {
            bearer_token,
            org_id,
            action_name: "update-card-order",
            min_role: Role::Member,
            resolver: &state.resolver,
            rate_limiter: &state.rate_limiter,
            demo_org_id: &state.limits.demo_org_id,
        },
        payload,
        {
            let state = state.clone();
            move |_ctx, payload| async move {
                state.repo.cards_reorder(org_id, list_id, payload.card_ids).await
            }
        },
    )
    .await;

    Json(result)
}
