//! Tenant context resolution and role enforcement (spec §4.3, §4.4).
//!
//! Grounded in the identity-provider local-client pattern used by
//! `authn_resolver-gw`/`authz_resolver-gw`: a thin port trait for the
//! external identity provider, a service that turns a bearer token into a
//! fully resolved [`TenantContext`], and a `log_and_convert`-style boundary
//! that logs before translating provider errors into the shared
//! [`DomainError`] taxonomy.

use async_trait::async_trait;
use kanban_db::KanbanRepo;
use kanban_domain::{DomainError, Role, TenantContext};
use uuid::Uuid;

/// Claims an identity provider vouches for after verifying a bearer token
/// (spec §6 identity provider contract).
#[derive(Debug, Clone)]
pub struct IdentityClaims {
    pub external_identity_id: String,
    pub email: String,
    pub display_name: String,
    /// Raw role claim from the token (e.g. `"org:admin"`), if the provider
    /// embeds one. `None` when the provider has no opinion on role and the
    /// platform's own membership row is authoritative.
    pub raw_role_claim: Option<String>,
}

/// Port to the external identity provider (spec §6). `kanban-server` wires
/// the real implementation; tests use an in-memory fake.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn authenticate(&self, bearer_token: &str) -> Result<IdentityClaims, DomainError>;
}

fn log_and_convert(op: &str, err: DomainError) -> DomainError {
    tracing::error!(operation = op, error = ?err, "tenant context resolution failed");
    err
}

pub struct TenantContextResolver<P: IdentityProvider> {
    repo: KanbanRepo,
    provider: P,
}

impl<P: IdentityProvider> TenantContextResolver<P> {
    #[must_use]
    pub fn new(repo: KanbanRepo, provider: P) -> Self {
        Self { repo, provider }
    }

    /// `getTenantContext()` (spec §4.3): authenticate the bearer token,
    /// self-heal the local `User`/`Membership` rows if this is the
    /// identity's first time touching this organization, and return the
    /// resolved role.
    #[tracing::instrument(skip(self, bearer_token), fields(org_id = %org_id))]
    pub async fn resolve(
        &self,
        bearer_token: &str,
        org_id: Uuid,
    ) -> Result<TenantContext, DomainError> {
        let claims = self
            .provider
            .authenticate(bearer_token)
            .await
            .map_err(|e| log_and_convert("authenticate", e))?;

        let user = self
            .repo
            .users_find_or_create(&claims.external_identity_id, &claims.email, &claims.display_name)
            .await?;

        if let Some(membership) = self.repo.memberships_find(user.id, org_id).await? {
            if !membership.is_active {
                return Err(DomainError::Forbidden);
            }
            return Ok(TenantContext {
                user_id: user.id,
                org_id,
                role: membership.role,
                membership: Some(membership),
            });
        }

        if !self.repo.org_exists(org_id).await? {
            // No membership and no such org: don't fail here. Downstream
            // tenant-scoped lookups reject the request as not-found once
            // they filter by this org_id (spec §4.3 step 3).
            return Ok(TenantContext {
                user_id: user.id,
                org_id,
                role: Role::Member,
                membership: None,
            });
        }

        let default_role = Role::normalize(claims.raw_role_claim.as_deref());
        let membership = self
            .repo
            .memberships_find_or_create(user.id, org_id, default_role)
            .await?;

        if !membership.is_active {
            return Err(DomainError::Forbidden);
        }

        Ok(TenantContext {
            user_id: user.id,
            org_id,
            role: membership.role,
            membership: Some(membership),
        })
    }
}

/// `requireRole(min, ctx)` (spec §4.4): the role hierarchy gate every
/// safe-action consults after resolving tenant context.
pub fn require_role(ctx: &TenantContext, min: Role) -> Result<(), DomainError> {
    if ctx.role >= min {
        Ok(())
    } else {
        Err(DomainError::Forbidden)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{ActiveModelTrait, ActiveValue::Set, Database};
    use sea_orm_migration::MigratorTrait;
    use std::sync::Arc;

    struct FakeProvider {
        claims: IdentityClaims,
    }

    #[async_trait]
    impl IdentityProvider for FakeProvider {
        async fn authenticate(&self, _bearer_token: &str) -> Result<IdentityClaims, DomainError> {
            Ok(self.claims.clone())
        }
    }

    async fn test_repo_with_org() -> (KanbanRepo, Uuid) {
        let conn = Database::connect("sqlite::memory:")
            .await
            .expect("in-memory sqlite connection");
        kanban_db::Migrator::up(&conn, None)
            .await
            .expect("run migrations");
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
        .expect("insert org");

        (repo, org_id)
    }

    #[tokio::test]
    async fn first_login_self_heals_user_and_membership() {
        let (repo, org_id) = test_repo_with_org().await;
        let provider = FakeProvider {
            claims: IdentityClaims {
                external_identity_id: "ext-1".to_owned(),
                email: "a@example.com".to_owned(),
                display_name: "Ada".to_owned(),
                raw_role_claim: Some("org:admin".to_owned()),
            },
        };
        let resolver = TenantContextResolver::new(repo, provider);

        let ctx = resolver.resolve("token", org_id).await.expect("resolve");
        assert_eq!(ctx.role, Role::Admin);
        assert_eq!(ctx.org_id, org_id);
    }

    #[tokio::test]
    async fn second_login_reuses_existing_membership_role() {
        let (repo, org_id) = test_repo_with_org().await;
        let provider = FakeProvider {
            claims: IdentityClaims {
                external_identity_id: "ext-2".to_owned(),
                email: "b@example.com".to_owned(),
                display_name: "Bob".to_owned(),
                raw_role_claim: Some("org:owner".to_owned()),
            },
        };
        let resolver = TenantContextResolver::new(repo, provider);

        let first = resolver.resolve("token", org_id).await.expect("first");
        let second = resolver.resolve("token", org_id).await.expect("second");
        assert_eq!(first.user_id, second.user_id);
        assert_eq!(second.role, Role::Owner);
    }

    #[tokio::test]
    async fn unknown_org_defaults_to_member_context_instead_of_failing() {
        let (repo, _org_id) = test_repo_with_org().await;
        let provider = FakeProvider {
            claims: IdentityClaims {
                external_identity_id: "ext-3".to_owned(),
                email: "c@example.com".to_owned(),
                display_name: "Cass".to_owned(),
                raw_role_claim: Some("org:owner".to_owned()),
            },
        };
        let resolver = TenantContextResolver::new(repo, provider);

        let ctx = resolver
            .resolve("token", Uuid::now_v7())
            .await
            .expect("resolve should not fail for an unknown org");
        assert_eq!(ctx.role, Role::Member);
        assert!(ctx.membership.is_none());
    }

    #[test]
    fn require_role_enforces_hierarchy() {
        let ctx = TenantContext {
            user_id: Uuid::now_v7(),
            org_id: Uuid::now_v7(),
            role: Role::Member,
            membership: None,
        };
        assert!(require_role(&ctx, Role::Member).is_ok());
        assert!(require_role(&ctx, Role::Admin).is_err());
    }
}
