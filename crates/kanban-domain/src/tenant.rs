//! Tenant context value types (spec §3 Membership, §4.3).
//!
//! `kanban-tenant` owns the *resolution* of a [`TenantContext`] from an
//! identity token; the shape lives here so every downstream crate (DAL,
//! safe-action wrapper, automation engine) can depend on it without pulling
//! in the resolver's identity-provider client.

use crate::role::Role;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Membership {
    pub user_id: Uuid,
    pub org_id: Uuid,
    pub role: Role,
    pub is_active: bool,
    pub joined_at: OffsetDateTime,
}

/// The `{userId, orgId, orgRole, membership}` result of spec §4.3.
///
/// Constructed once per request and threaded explicitly through call
/// chains (SPEC_FULL §9 re-architecture note: the source memoizes this per
/// request via dynamic scoping; here it is just a value).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TenantContext {
    pub user_id: Uuid,
    pub org_id: Uuid,
    pub role: Role,
    pub membership: Option<Membership>,
}

impl TenantContext {
    #[must_use]
    pub fn is_membership_active(&self) -> bool {
        self.membership.as_ref().is_none_or(|m| m.is_active)
    }
}
