//! HTTP surface (SPEC_FULL §6.1): a thin `axum` router translating requests
//! into safe-action invocations. Grounded in the route-grouping style of
//! `acteon_server::api::router` (public vs. protected merge, one module per
//! resource) — everything here requires a bearer token, since the core
//! spec has no genuinely public mutating route.

mod automations;
mod boards;
mod cards;
mod comments;
mod lists;
mod reactions;
mod webhooks;

use crate::state::AppState;
use axum::http::HeaderMap;
use axum::routing::{get, patch, post};
use axum::Json;
use axum::Router;
use kanban_actions::{translate_error, SafeActionResult};
use kanban_domain::DomainError;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/orgs/{org_id}/boards", post(boards::create))
        .route("/boards/{board_id}", patch(boards::update))
        .route("/boards/{board_id}/lists", post(lists::create))
        .route("/boards/{board_id}/lists/reorder", patch(lists::reorder))
        .route("/lists/{list_id}/cards", post(cards::create))
        .route("/cards/{card_id}", patch(cards::update))
        .route("/lists/{list_id}/cards/reorder", post(cards::reorder))
        .route("/cards/{card_id}/comments", post(comments::create))
        .route(
            "/comments/{comment_id}/reactions",
            post(reactions::add),
        )
        .route("/orgs/{org_id}/webhooks", post(webhooks::create))
        .route("/orgs/{org_id}/automations", post(automations::create))
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}

/// Pulls the bearer token a handler needs to build a [`kanban_actions::SafeActionRequest`].
/// Missing/malformed headers surface as the same `UNAUTHENTICATED` message
/// the tenant resolver would produce for a token it cannot verify, so a
/// client can't distinguish "no header" from "bad token" (spec §7 hygiene).
pub(crate) fn bearer_token<T>(headers: &HeaderMap) -> Result<&str, Json<SafeActionResult<T>>> {
    headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or_else(|| {
            Json(SafeActionResult::Err {
                error: translate_error(&DomainError::Unauthenticated),
            })
        })
}
