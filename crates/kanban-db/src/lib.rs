//! Tenant-scoped data-access layer (spec §4.5).
//!
//! Wraps `sea_orm` entities and a `sea-orm-migration` schema behind a
//! repository API that only ever takes `(org_id, ...)` or walks an
//! ownership chain down to an `org_id` before touching a row. Nothing
//! above this crate should import `sea_orm` directly — `kanban-tenant`,
//! `kanban-actions`, `kanban-events`, and `kanban-webhooks` all depend on
//! `kanban-db` for persistence instead.

pub mod entities;
pub mod error;
pub mod migration;
pub mod repo;

pub use migration::Migrator;
pub use repo::{KanbanRepo, PlanLimiter, StaticPlanLimiter};

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::Database;
    use sea_orm_migration::MigratorTrait;
    use std::sync::Arc;
    use uuid::Uuid;

    async fn test_repo() -> KanbanRepo {
        let conn = Database::connect("sqlite::memory:")
            .await
            .expect("in-memory sqlite connection");
        Migrator::up(&conn, None).await.expect("run migrations");
        KanbanRepo::new(Arc::new(conn))
    }

    #[tokio::test]
    async fn user_and_membership_provisioning_is_idempotent() {
        let repo = test_repo().await;

        let u1 = repo
            .users_find_or_create("ext-1", "a@example.com", "Ada")
            .await
            .expect("create user");
        let u2 = repo
            .users_find_or_create("ext-1", "a@example.com", "Ada")
            .await
            .expect("find existing user");
        assert_eq!(u1.id, u2.id);
    }

    #[tokio::test]
    async fn board_not_in_org_is_not_found_not_forbidden() {
        let repo = test_repo().await;
        let missing = repo.find_board_scoped(Uuid::now_v7(), Uuid::now_v7()).await;
        assert!(matches!(
            missing,
            Err(kanban_domain::DomainError::NotFound)
        ));
    }

    #[tokio::test]
    async fn lists_reorder_rejects_foreign_ids() {
        use crate::repo::StaticPlanLimiter;

        let repo = test_repo().await;
        let org_model = crate::entities::tenant::org::ActiveModel {
            id: sea_orm::ActiveValue::Set(Uuid::now_v7()),
            name: sea_orm::ActiveValue::Set("Acme".to_owned()),
            slug: sea_orm::ActiveValue::Set("acme".to_owned()),
            plan: sea_orm::ActiveValue::Set("FREE".to_owned()),
            deleted_at: sea_orm::ActiveValue::Set(None),
        };
        use sea_orm::ActiveModelTrait;
        let org = org_model.insert(repo.conn()).await.expect("insert org");

        let limiter = StaticPlanLimiter::default();
        let board = repo
            .boards_create(org.id, "Roadmap".to_owned(), None, &limiter)
            .await
            .expect("create board");
        let list = repo
            .lists_create(org.id, board.id, "Todo".to_owned())
            .await
            .expect("create list");

        let foreign_id = Uuid::now_v7();
        let result = repo
            .lists_reorder(org.id, board.id, vec![list.id, foreign_id])
            .await;
        assert!(result.is_err());
    }
}
