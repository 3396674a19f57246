//! Automation, `AutomationLog` (spec §3, §4.7). Trigger, conditions, and
//! actions are stored as JSON columns — they're tagged enums with no
//! relational structure of their own, matching how the event context in
//! `kanban_domain::events` is shaped.

pub mod automation {
    use kanban_domain::{AutomationAction, AutomationCondition, AutomationTrigger};
    use sea_orm::entity::prelude::*;
    use uuid::Uuid;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
    #[sea_orm(table_name = "automations")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,
        pub org_id: Uuid,
        pub board_id: Option<Uuid>,
        pub name: String,
        pub is_enabled: bool,
        #[sea_orm(column_type = "Json")]
        pub trigger: AutomationTrigger,
        #[sea_orm(column_type = "Json")]
        pub conditions: Vec<AutomationCondition>,
        #[sea_orm(column_type = "Json")]
        pub actions: Vec<AutomationAction>,
        pub run_count: i64,
        pub last_run_at: Option<TimeDateTimeWithTimeZone>,
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

    impl From<Model> for kanban_domain::Automation {
        fn from(m: Model) -> Self {
            Self {
                id: m.id,
                org_id: m.org_id,
                board_id: m.board_id,
                name: m.name,
                is_enabled: m.is_enabled,
                trigger: m.trigger,
                conditions: m.conditions,
                actions: m.actions,
                run_count: m.run_count,
                last_run_at: m.last_run_at.map(Into::into),
            }
        }
    }
}

pub mod automation_log {
    use sea_orm::entity::prelude::*;
    use uuid::Uuid;

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
    #[sea_orm(table_name = "automation_logs")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,
        pub automation_id: Uuid,
        pub card_id: Option<Uuid>,
        pub success: bool,
        pub error: Option<String>,
        pub created_at: TimeDateTimeWithTimeZone,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "super::automation::Entity",
            from = "Column::AutomationId",
            to = "super::automation::Column::Id"
        )]
        Automation,
    }

    impl Related<super::automation::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Automation.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}

    impl From<Model> for kanban_domain::AutomationLog {
        fn from(m: Model) -> Self {
            Self {
                id: m.id,
                automation_id: m.automation_id,
                card_id: m.card_id,
                success: m.success,
                error: m.error,
                created_at: m.created_at.into(),
            }
        }
    }
}
