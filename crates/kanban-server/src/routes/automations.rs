use super::bearer_token;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::Json;
use kanban_actions::{run_safe_action, FieldError, SafeActionRequest, SafeActionResult, Validate};
use kanban_domain::{Automation, AutomationAction, AutomationCondition, AutomationTrigger, Role};
use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct CreateAutomationPayload {
    #[serde(default)]
    pub board_id: Option<Uuid>,
    pub name: String,
    pub trigger: AutomationTrigger,
    #[serde(default)]
    pub conditions: Vec<AutomationCondition>,
    pub actions: Vec<AutomationAction>,
}

impl Validate for CreateAutomationPayload {
    fn validate(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();
        if self.name.trim().is_empty() {
            errors.push(FieldError {
                field: "name".to_owned(),
                message: "name must not be empty".to_owned(),
            });
        }
        if self.actions.is_empty() {
            errors.push(FieldError {
                field: "actions".to_owned(),
                message: "an automation needs at least one action".to_owned(),
            });
        }
        errors
    }
}

pub async fn create(
    State(state): State<AppState>,
    Path(org_id): Path<Uuid>,
    headers: HeaderMap,
    Json(payload): Json<CreateAutomationPayload>,
) -> Json<SafeActionResult<Automation>> {
    let bearer_token = match bearer_token(&headers) {
        Ok(token) => token,
        Err(response) => return response,
    };

    let result = run_safe_action(
        SafeActionRequest {
            bearer_token,
            org_id,
            action_name: "create-automation",
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
                    .automations_create(
                        org_id,
                        payload.board_id,
                        payload.name,
                        payload.trigger,
                        payload.conditions,
                        payload.actions,
                    )
                    .await
            }
        },
    )
    .await;

    Json(result)
}
