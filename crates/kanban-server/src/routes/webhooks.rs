use super::bearer_token;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::Json;
use kanban_actions::{run_safe_action, FieldError, SafeActionRequest, SafeActionResult, Validate};
use kanban_domain::{Role, Webhook};
use rand::Rng;
use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct CreateWebhookPayload {
    pub url: String,
    pub events: Vec<String>,
}

impl Validate for CreateWebhookPayload {
    fn validate(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();
        if self.url.trim().is_empty() {
            errors.push(FieldError {
                field: "url".to_owned(),
                message: "url must not be empty".to_owned(),
            });
        }
        if self.events.is_empty() {
            errors.push(FieldError {
                field: "events".to_owned(),
                message: "events must not be empty".to_owned(),
            });
        }
        errors
    }
}

/// 32 random bytes, hex-encoded, used as the shared HMAC key (spec §4.3
/// Webhook model: "Secret is opaque shared HMAC key"). The caller never
/// supplies it — a client that could choose its own secret could forge a
/// signature for someone else's webhook.
fn generate_secret() -> String {
    let mut bytes = [0u8; 32];
    rand::rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

pub async fn create(
    State(state): State<AppState>,
    Path(org_id): Path<Uuid>,
    headers: HeaderMap,
    Json(payload): Json<CreateWebhookPayload>,
) -> Json<SafeActionResult<Webhook>> {
    let bearer_token = match bearer_token(&headers) {
        Ok(token) => token,
        Err(response) => return response,
    };

    let result = run_safe_action(
        SafeActionRequest {
            bearer_token,
            org_id,
            action_name: "create-webhook",
            min_role: Role::Admin,
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
                    .webhooks_create(org_id, payload.url, generate_secret(), payload.events)
                    .await
            }
        },
    )
    .await;

    Json(result)
}
