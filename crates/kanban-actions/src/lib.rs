//! Safe-Action Wrapper (spec §4.6).
//!
//! Every mutating endpoint in `kanban-server` goes through [`run_safe_action`]
//! instead of calling a service directly: validate, resolve tenant context,
//! enforce the role gate, enforce the rate limit, block demo-mode writes,
//! run the handler, then translate whatever `DomainError` comes back into a
//! string a client is allowed to see. Modeled on the layered
//! validate-then-authorize-then-execute shape of
//! `users_info::UsersService::create_user`, generalized into a reusable
//! pipeline because every safe-action repeats the same five steps before
//! diverging in its handler.

use kanban_domain::{DomainError, Role, TenantContext};
use kanban_ratelimit::RateLimiter;
use kanban_tenant::{require_role, IdentityProvider, TenantContextResolver};
use serde::Serialize;
use std::future::Future;
use uuid::Uuid;

/// A single field-level validation failure (spec §4.6 `{fieldErrors}`).
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Implemented by every safe-action's input payload. Kept separate from
/// `serde::Deserialize` because a payload can deserialize cleanly and still
/// fail semantic validation (e.g. an empty title).
pub trait Validate {
    /// Returns every violation found, not just the first — lets a client
    /// fix a form in one round trip instead of one error at a time.
    fn validate(&self) -> Vec<FieldError>;
}

/// The `{data} | {error} | {fieldErrors}` result shape from spec §4.6.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum SafeActionResult<T> {
    Ok { data: T },
    Err { error: String },
    Invalid { field_errors: Vec<FieldError> },
}

impl<T> SafeActionResult<T> {
    #[must_use]
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok { .. })
    }
}

/// Translates a [`DomainError`] into the string a client is allowed to see
/// (spec §7 error taxonomy + hygiene invariant: never a user id, org id,
/// internal type name, or storage-engine keyword).
#[must_use]
pub fn translate_error(err: &DomainError) -> String {
    match err {
        DomainError::Unauthenticated => "You must be signed in to do that.".to_owned(),
        DomainError::Forbidden => "You don't have permission to do that.".to_owned(),
        DomainError::NotFound => "That item could not be found.".to_owned(),
        DomainError::Validation { .. } => "The request was invalid.".to_owned(),
        DomainError::RateLimited { retry_after_secs } => {
            format!("Too many requests. Try again in {retry_after_secs} seconds.")
        }
        DomainError::Demo => "This action is disabled in the demo workspace.".to_owned(),
        DomainError::Conflict { message } => message.clone(),
        DomainError::Internal { .. } => "Something went wrong. Please try again.".to_owned(),
    }
}

fn to_result<T>(err: DomainError) -> SafeActionResult<T> {
    if let DomainError::Validation { fields } = &err {
        return SafeActionResult::Invalid {
            field_errors: fields
                .iter()
                .map(|(field, message)| FieldError {
                    field: field.clone(),
                    message: message.clone(),
                })
                .collect(),
        };
    }
    SafeActionResult::Err {
        error: translate_error(&err),
    }
}

/// What every safe-action needs to run (spec §4.6 steps 1-4).
pub struct SafeActionRequest<'a, P: IdentityProvider> {
    pub bearer_token: &'a str,
    pub org_id: Uuid,
    pub action_name: &'a str,
    pub min_role: Role,
    pub resolver: &'a TenantContextResolver<P>,
    pub rate_limiter: &'a RateLimiter,
    pub demo_org_id: &'a str,
}

/// Runs the full pipeline and returns the client-facing result shape.
/// `handler` only runs once every gate (auth, role, rate limit, demo-mode)
/// has passed (spec §4.6).
pub async fn run_safe_action<P, V, F, Fut, T>(
    req: SafeActionRequest<'_, P>,
    payload: V,
    handler: F,
) -> SafeActionResult<T>
where
    P: IdentityProvider,
    V: Validate,
    F: FnOnce(TenantContext, V) -> Fut,
    Fut: Future<Output = Result<T, DomainError>>,
{
    let field_errors = payload.validate();
    if !field_errors.is_empty() {
        return SafeActionResult::Invalid { field_errors };
    }

    let ctx = match req.resolver.resolve(req.bearer_token, req.org_id).await {
        Ok(ctx) => ctx,
        Err(e) => return to_result(e),
    };

    if let Err(e) = require_role(&ctx, req.min_role) {
        return to_result(e);
    }

    if let Err(e) = req.rate_limiter.check_or_err(ctx.user_id, req.action_name) {
        return to_result(e);
    }

    if ctx.org_id.to_string() == req.demo_org_id {
        tracing::info!(action = req.action_name, "blocked mutating action in demo org");
        return to_result(DomainError::Demo);
    }

    match handler(ctx, payload).await {
        Ok(data) => SafeActionResult::Ok { data },
        Err(e) => {
            tracing::error!(action = req.action_name, error = ?e, "safe action handler failed");
            to_result(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use kanban_db::KanbanRepo;
    use kanban_domain::config::RateLimitTable;
    use kanban_tenant::IdentityClaims;
    use sea_orm::{ActiveModelTrait, ActiveValue::Set, Database};
    use sea_orm_migration::MigratorTrait;
    use std::sync::Arc;

    #[derive(Debug)]
    struct CreateBoardPayload {
        title: String,
    }

    impl Validate for CreateBoardPayload {
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

    struct FakeProvider {
        role: &'static str,
    }

    #[async_trait]
    impl IdentityProvider for FakeProvider {
        async fn authenticate(&self, _bearer_token: &str) -> Result<IdentityClaims, DomainError> {
            Ok(IdentityClaims {
                external_identity_id: "ext-1".to_owned(),
                email: "a@example.com".to_owned(),
                display_name: "Ada".to_owned(),
                raw_role_claim: Some(self.role.to_owned()),
            })
        }
    }

    async fn setup() -> (KanbanRepo, Uuid) {
        let conn = Database::connect("sqlite::memory:").await.unwrap();
        kanban_db::Migrator::up(&conn, None).await.unwrap();
        let repo = KanbanRepo::new(Arc::new(conn));
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
        (repo, org_id)
    }

    #[tokio::test]
    async fn invalid_payload_short_circuits_before_auth() {
        let (repo, org_id) = setup().await;
        let resolver = TenantContextResolver::new(repo, FakeProvider { role: "org:member" });
        let limiter = RateLimiter::new(RateLimitTable::default());

        let result = run_safe_action(
            SafeActionRequest {
                bearer_token: "t",
                org_id,
                action_name: "create-board",
                min_role: Role::Member,
                resolver: &resolver,
                rate_limiter: &limiter,
                demo_org_id: "demo-org-id",
            },
            CreateBoardPayload {
                title: String::new(),
            },
            |_ctx, _payload| async { Ok(()) },
        )
        .await;

        assert!(matches!(result, SafeActionResult::Invalid { .. }));
    }

    #[tokio::test]
    async fn insufficient_role_is_forbidden() {
        let (repo, org_id) = setup().await;
        let resolver = TenantContextResolver::new(repo, FakeProvider { role: "org:guest" });
        let limiter = RateLimiter::new(RateLimitTable::default());

        let result = run_safe_action(
            SafeActionRequest {
                bearer_token: "t",
                org_id,
                action_name: "create-board",
                min_role: Role::Admin,
                resolver: &resolver,
                rate_limiter: &limiter,
                demo_org_id: "demo-org-id",
            },
            CreateBoardPayload {
                title: "Roadmap".to_owned(),
            },
            |_ctx, _payload| async { Ok(()) },
        )
        .await;

        assert_eq!(
            result,
            SafeActionResult::Err {
                error: translate_error(&DomainError::Forbidden)
            }
        );
    }

    #[tokio::test]
    async fn successful_handler_returns_data() {
        let (repo, org_id) = setup().await;
        let resolver = TenantContextResolver::new(repo, FakeProvider { role: "org:admin" });
        let limiter = RateLimiter::new(RateLimitTable::default());

        let result = run_safe_action(
            SafeActionRequest {
                bearer_token: "t",
                org_id,
                action_name: "create-board",
                min_role: Role::Admin,
                resolver: &resolver,
                rate_limiter: &limiter,
                demo_org_id: "demo-org-id",
            },
            CreateBoardPayload {
                title: "Roadmap".to_owned(),
            },
            |_ctx, payload| async move { Ok(payload.title) },
        )
        .await;

        assert_eq!(
            result,
            SafeActionResult::Ok {
                data: "Roadmap".to_owned()
            }
        );
    }

    #[tokio::test]
    async fn demo_org_blocks_mutation() {
        let (repo, _org_id) = setup().await;
        let demo_org_id = Uuid::now_v7();
        kanban_db::entities::tenant::org::ActiveModel {
            id: Set(demo_org_id),
            name: Set("Demo".to_owned()),
            slug: Set("demo".to_owned()),
            plan: Set("FREE".to_owned()),
            deleted_at: Set(None),
        }
        .insert(repo.conn())
        .await
        .unwrap();

        let resolver = TenantContextResolver::new(repo, FakeProvider { role: "org:admin" });
        let limiter = RateLimiter::new(RateLimitTable::default());

        let result = run_safe_action(
            SafeActionRequest {
                bearer_token: "t",
                org_id: demo_org_id,
                action_name: "create-board",
                min_role: Role::Member,
                resolver: &resolver,
                rate_limiter: &limiter,
                demo_org_id: &demo_org_id.to_string(),
            },
            CreateBoardPayload {
                title: "Roadmap".to_owned(),
            },
            |_ctx, _payload| async { Ok(()) },
        )
        .await;

        assert_eq!(
            result,
            SafeActionResult::Err {
                error: translate_error(&DomainError::Demo)
            }
        );
    }
}
