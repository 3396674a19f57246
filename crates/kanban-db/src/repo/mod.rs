//! Tenant-scoped repository (spec §4.5).
//!
//! Every query here is either scoped directly by `org_id` or reaches the
//! organization by walking the ownership chain `Card -> List -> Board ->
//! Organization`. A row that exists but belongs to a different tenant is
//! indistinguishable from a row that does not exist at all — callers get
//! `DomainError::NotFound`, never `Forbidden`, so a client can't use this
//! API as an existence oracle for other tenants' data (spec §4.5 IDOR
//! note).

mod board_tree;
mod collab;
mod plan_limiter;
mod tenant_admin;

pub use board_tree::*;
pub use collab::*;
pub use plan_limiter::{PlanLimiter, StaticPlanLimiter};
pub use tenant_admin::*;

use sea_orm::DatabaseConnection;
use std::sync::Arc;

/// Holds the pooled connection every repository method borrows. Mirrors the
/// teacher's `DbProvider`/`conn()` split (`users_info::domain::service`):
/// services call `repo.conn()` once per request and pass the connection
/// down, rather than each query method opening its own.
#[derive(Clone)]
pub struct KanbanRepo {
    conn: Arc<DatabaseConnection>,
}

impl KanbanRepo {
    #[must_use]
    pub fn new(conn: Arc<DatabaseConnection>) -> Self {
        Self { conn }
    }

    #[must_use]
    pub fn conn(&self) -> &DatabaseConnection {
        &self.conn
    }
}
