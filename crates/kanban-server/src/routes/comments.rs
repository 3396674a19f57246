use super::bearer_token;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::Json;
use kanban_actions::{run_safe_action, FieldError, SafeActionRequest, SafeActionResult, Validate};
use kanban_domain::{Comment, Role};
use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct CreateCommentPayload {
    pub org_id: Uuid,
    pub text: String,
    #[serde(default)]
    pub parent_id: Option<Uuid>,
}

impl Validate for CreateCommentPayload {
    fn validate(&self) -> Vec<FieldError> {
        if self.text.trim().is_empty() {
            vec![FieldError {
                field: "text".to_owned(),
                message: "text must not be empty".to_owned(),
            }]
        } else {
            Vec::new()
        }
    }
}

pub async fn create(
    State(state): State<AppState>,
    Path(card_id): Path<Uuid>,
    headers: HeaderMap,
    Json(payload): Json<CreateCommentPayload>,
) -> Json<SafeActionResult<Comment>> {
    let bearer_token = match bearer_token(&headers) {
        Ok(token) => token,
        Err(response) => return response,
    };
    let org_id = payload.org_id;

    let result = run_safe_action(
        SafeActionRequest {
            bearer_token,
            org_id,
            action_name: "create-comment",
            min_role: Role::Member,
            resolver: &state.resolver,
            rate_limiter: &state.rate_limiter,
            demo_org_id: &state.limits.demo_org_id,
        },
        payload,
        {
            let state = state.clone();
            move |ctx, payload| async move {
                state
                    .repo
                    .comments_create(org_id, card_id, ctx.user_id, payload.text, payload.parent_id)
                    .await
            }
        },
    )
    .await;

    Json(result)
}
