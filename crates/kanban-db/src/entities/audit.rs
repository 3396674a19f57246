//! `AuditLog` (spec §3, §4.9). Append-only; no relations define an update
//! or delete path on purpose.

pub mod audit_log {
    use sea_orm::entity::prelude::*;
    use uuid::Uuid;

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
    #[sea_orm(table_name = "audit_logs")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,
        pub org_id: Uuid,
        pub user_id: Uuid,
        pub entity_type: String,
        pub entity_id: Uuid,
        pub entity_title: String,
        pub action: String,
        pub ip_address: Option<String>,
        pub user_agent: Option<String>,
        pub created_at: TimeDateTimeWithTimeZone,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "super::super::tenant::org::Entity",
            from = "Column::OrgId",
            to = "super::super::tenant::org::Column::Id"
        )]
        Org,
    }

    impl Related<super::super::tenant::org::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Org.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}

    fn action_from_str(raw: &str) -> kanban_domain::AuditAction {
        match raw {
            "UPDATE" => kanban_domain::AuditAction::Update,
            "DELETE" => kanban_domain::AuditAction::Delete,
            _ => kanban_domain::AuditAction::Create,
        }
    }

    pub fn action_to_str(action: kanban_domain::AuditAction) -> &'static str {
        match action {
            kanban_domain::AuditAction::Create => "CREATE",
            kanban_domain::AuditAction::Update => "UPDATE",
            kanban_domain::AuditAction::Delete => "DELETE",
        }
    }

    impl From<Model> for kanban_domain::AuditLog {
        fn from(m: Model) -> Self {
            Self {
                id: m.id,
                org_id: m.org_id,
                user_id: m.user_id,
                entity_type: m.entity_type,
                entity_id: m.entity_id,
                entity_title: m.entity_title,
                action: action_from_str(&m.action),
                ip_address: m.ip_address,
                user_agent: m.user_agent,
                created_at: m.created_at.into(),
            }
        }
    }
}
