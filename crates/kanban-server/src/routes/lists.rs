use super::bearer_token;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::Json;
use kanban_actions::{run_safe_action, FieldError, SafeActionRequest, SafeActionResult, Validate};
use kanban_domain::{List, Role};
use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct CreateListPayload {
    pub org_id: Uuid,
    pub title: String,
}

impl Validate for CreateListPayload {
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
    Path(board_id): Path<Uuid>,
    headers: HeaderMap,
    Json(payload): Json<CreateListPayload>,
) -> Json<SafeActionResult<List>> {
    let bearer_token = match bearer_token(&headers) {
        Ok(token) => token,
        Err(response) => return response,
    };
    let org_id = payload.org_id;

    let result = run_safe_action(
        SafeActionRequest {
            bearer_token,
            org_id,
            action_name: "create-list",
            min_role: Role::Member,
            resolver: &state.resolver,
            rate_limiter: &state.rate_limiter,
            demo_org_id: &state.limits.demo_org_id,
        },
        payload,
        {
            let state = state.clone();
            move |_ctx, payload| async move {
                state.repo.lists_create(org_id, board_id, payload.title).await
            }
        },
    )
    .await;

    Json(result)
}

#[derive(Debug, Deserialize)]
pub struct ReorderListsPayload {
    pub org_id: Uuid,
    pub list_ids: Vec<Uuid>,
}

impl Validate for ReorderListsPayload {
    fn validate(&self) -> Vec<FieldError> {
        if self.list_ids.is_empty() {
            vec![FieldError {
                field: "listIds".to_owned(),
                message: "listIds must not be empty".to_owned(),
            }]
        } else {
            Vec::new()
        }
    }
}

pub async fn reorder(
    State(state): State<AppState>,
    Path(board_id): Path<Uuid>,
    headers: HeaderMap,
    Json(payload): Json<ReorderListsPayload>,
) -> Json<SafeActionResult<Vec<List>>> {
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
                state.repo.lists_reorder(org_id, board_id, payload.list_ids).await
            }
        },
    )
    .await;

    Json(result)
}
