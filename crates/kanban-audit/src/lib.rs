//! Audit Log (spec §4.9, component J).
//!
//! Every successful mutating safe-action calls [`AuditLogger::record`],
//! which spawns the append onto the shared runtime (SPEC_FULL §5.1) and
//! returns immediately — the write never sits on the request's critical
//! path, and a failure is logged, never surfaced to the caller, matching
//! the "best-effort, decoupled from the response path" contract.

use kanban_db::KanbanRepo;
use kanban_domain::AuditAction;
use std::sync::Arc;
use uuid::Uuid;

/// Everything `audit_logs.create` needs, gathered at the safe-action
/// boundary where `orgId`/`userId` are already resolved and the request's
/// `ipAddress`/`userAgent` are still available.
#[derive(Debug, Clone)]
pub struct AuditEntry {
    pub org_id: Uuid,
    pub user_id: Uuid,
    pub entity_type: String,
    pub entity_id: Uuid,
    pub entity_title: String,
    pub action: AuditAction,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

#[derive(Clone)]
pub struct AuditLogger {
    repo: Arc<KanbanRepo>,
}

impl AuditLogger {
    #[must_use]
    pub fn new(repo: Arc<KanbanRepo>) -> Self {
        Self { repo }
    }

    /// Schedules the append and returns without waiting for it to land.
    pub fn record(&self, entry: AuditEntry) {
        let repo = Arc::clone(&self.repo);
        tokio::spawn(async move {
            let result = repo
                .audit_logs_create(
                    entry.org_id,
                    entry.user_id,
                    entry.entity_type,
                    entry.entity_id,
                    entry.entity_title,
                    entry.action,
                    entry.ip_address,
                    entry.user_agent,
                )
                .await;
            if let Err(e) = result {
                tracing::error!(error = ?e, "audit log append failed");
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kanban_db::Migrator;
    use sea_orm::{ActiveModelTrait, ActiveValue::Set, ConnectionTrait, Database};
    use sea_orm_migration::MigratorTrait;

    async fn test_repo_with_org() -> (Arc<KanbanRepo>, Uuid) {
        let conn = Database::connect("sqlite::memory:").await.unwrap();
        Migrator::up(&conn, None).await.unwrap();
        let repo = Arc::new(KanbanRepo::new(Arc::new(conn)));

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
    async fn record_appends_without_blocking_the_caller() {
        let (repo, org_id) = test_repo_with_org().await;
        let logger = AuditLogger::new(repo.clone());
        let user_id = Uuid::now_v7();
        let card_id = Uuid::now_v7();

        logger.record(AuditEntry {
            org_id,
            user_id,
            entity_type: "card".to_owned(),
            entity_id: card_id,
            entity_title: "Ship it".to_owned(),
            action: AuditAction::Create,
            ip_address: Some("203.0.113.7".to_owned()),
            user_agent: Some("test-agent/1.0".to_owned()),
        });

        // record() must return immediately; give the spawned task a chance
        // to run before asserting the row landed.
        tokio::task::yield_now().await;
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;

        let count = repo
            .conn()
            .query_one(sea_orm::Statement::from_sql_and_values(
                sea_orm::DatabaseBackend::Sqlite,
                "SELECT COUNT(*) AS c FROM audit_logs WHERE org_id = ?",
                [org_id.to_string().into()],
            ))
            .await
            .unwrap()
            .and_then(|row| row.try_get::<i64>("", "c").ok());

        assert_eq!(count, Some(1));
    }
}
