use super::bearer_token;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::Json;
use kanban_actions::{run_safe_action, FieldError, SafeActionRequest, SafeActionResult, Validate};
use kanban_domain::{Board, Role};
use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct CreateBoardPayload {
    pub title: String,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl Validate for CreateBoardPayload {
    fn validate(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();
        if self.title.trim().is_empty() {
            errors.push(FieldError {
                field: "title".to_owned(),
                message: "title must not be empty".to_owned(),
            });
        }
        errors
    }
}

pub async fn create(
    State(state): State<AppState>,
    Path(org_id): Path<Uuid>,
    headers: HeaderMap,
    Json(payload): Json<CreateBoardPayload>,
) -> Json<SafeActionResult<Board>> {
    let bearer_token = match bearer_token(&headers) {
        Ok(token) => token,
        Err(response) => return response,
    };

    let result = run_safe_action(
        SafeActionRequest {
            bearer_token,
            org_id,
            action_name: "create-board",
            min_role: Role::Member,
            resolver: &state.resolver,
            rate_limiter: &state.rate_limiter,
            demo_org_id: &state.limits.demo_org_id,
        },
        payload,
        {
            let state = state.clone();
            move |_ctx, payload| async move {
                state
                    .repo
                    .boards_create(org_id, payload.title, payload.image_url, state.plan_limiter.as_ref())
                    .await
            }
        },
    )
    .await;

    Json(result)
}

#[derive(Debug, Deserialize)]
pub struct UpdateBoardPayload {
    pub org_id: Uuid,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub image_url: Option<Option<String>>,
}

impl Validate for UpdateBoardPayload {
    fn validate(&self) -> Vec<FieldError> {
        Vec::new()
    }
}

pub async fn update(
    State(state): State<AppState>,
    Path(board_id): Path<Uuid>,
    headers: HeaderMap,
    Json(payload): Json<UpdateBoardPayload>,
) -> Json<SafeActionResult<Board>> {
    let bearer_token = match bearer_token(&headers) {
        Ok(token) => token,
        Err(response) => return response,
    };
    let org_id = payload.org_id;

    let result = run_safe_action(
        SafeActionRequest {
            bearer_token,
            org_id,
            action_name: "update-board",
            min_role: Role::Member,
            resolver: &state.resolver,
            rate_limiter: &state.rate_limiter,
            demo_org_id: &state.limits.demo_org_id,
        },
        payload,
        {
            let state = state.clone();
            move |_ctx, payload| async move {
                state
                    .repo
                    .boards_update(org_id, board_id, payload.title, payload.image_url)
                    .await
            }
        },
    )
    .await;

    Json(result)
}
