use super::bearer_token;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::Json;
use kanban_actions::{run_safe_action, FieldError, SafeActionRequest, SafeActionResult, Validate};
use kanban_domain::{Reaction, Role};
use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct AddReactionPayload {
    pub org_id: Uuid,
    pub card_id: Uuid,
    pub emoji: String,
}

impl Validate for AddReactionPayload {
    fn validate(&self) -> Vec<FieldError> {
        if self.emoji.trim().is_empty() {
            vec![FieldError {
                field: "emoji".to_owned(),
                message: "emoji must not be empty".to_owned(),
            }]
        } else if emojis::get(self.emoji.trim()).is_none() {
            vec![FieldError {
                field: "emoji".to_owned(),
                message: "emoji must be an actual emoji character, not a shortcode".to_owned(),
            }]
        } else {
            Vec::new()
        }
    }
}

pub async fn add(
    State(state): State<AppState>,
    Path(comment_id): Path<Uuid>,
    headers: HeaderMap,
    Json(payload): Json<AddReactionPayload>,
) -> Json<SafeActionResult<Reaction>> {
    let bearer_token = match bearer_token(&headers) {
        Ok(token) => token,
        Err(response) => return response,
    };
    let org_id = payload.org_id;

    let result = run_safe_action(
        SafeActionRequest {
            bearer_token,
            org_id,
            action_name: "add-reaction",
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
                    .reactions_add(org_id, payload.card_id, comment_id, ctx.user_id, payload.emoji)
                    .await
            }
        },
    )
    .await;

    Json(result)
}
