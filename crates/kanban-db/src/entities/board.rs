//! Board, List, Card — the ownership chain the DAL verifies on every
//! mutation (spec §3, §4.5).

pub mod board {
    use sea_orm::entity::prelude::*;
    use uuid::Uuid;

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
    #[sea_orm(table_name = "boards")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,
        pub org_id: Uuid,
        pub title: String,
        pub image_url: Option<String>,
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
        #[sea_orm(has_many = "super::list::Entity")]
        List,
    }

    impl Related<super::super::tenant::org::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Org.def()
        }
    }

    impl Related<super::list::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::List.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}

    impl From<Model> for kanban_domain::Board {
        fn from(m: Model) -> Self {
            Self {
                id: m.id,
                org_id: m.org_id,
                title: m.title,
                image_url: m.image_url,
                created_at: m.created_at.into(),
            }
        }
    }
}

pub mod list {
    use sea_orm::entity::prelude::*;
    use uuid::Uuid;

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
    #[sea_orm(table_name = "lists")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,
        pub board_id: Uuid,
        pub title: String,
        pub order: String,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "super::board::Entity",
            from = "Column::BoardId",
            to = "super::board::Column::Id"
        )]
        Board,
        #[sea_orm(has_many = "super::card::Entity")]
        Card,
    }

    impl Related<super::board::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Board.def()
        }
    }

    impl Related<super::card::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Card.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}

    impl From<Model> for kanban_domain::List {
        fn from(m: Model) -> Self {
            Self {
                id: m.id,
                board_id: m.board_id,
                title: m.title,
                order: m.order,
            }
        }
    }
}

pub mod card {
    use kanban_domain::Priority;
    use sea_orm::entity::prelude::*;
    use uuid::Uuid;

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
    #[sea_orm(table_name = "cards")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,
        pub list_id: Uuid,
        pub title: String,
        #[sea_orm(column_type = "Text")]
        pub description: String,
        pub priority: String,
        pub due_date: Option<TimeDateTimeWithTimeZone>,
        pub assignee_user_id: Option<Uuid>,
        pub order: String,
        pub created_at: TimeDateTimeWithTimeZone,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "super::list::Entity",
            from = "Column::ListId",
            to = "super::list::Column::Id"
        )]
        List,
    }

    impl Related<super::list::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::List.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}

    fn priority_from_str(raw: &str) -> Priority {
        match raw {
            "low" => Priority::Low,
            "high" => Priority::High,
            "urgent" => Priority::Urgent,
            _ => Priority::Medium,
        }
    }

    pub fn priority_to_str(priority: Priority) -> &'static str {
        match priority {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
            Priority::Urgent => "urgent",
        }
    }

    impl From<Model> for kanban_domain::Card {
        fn from(m: Model) -> Self {
            Self {
                id: m.id,
                list_id: m.list_id,
                title: m.title,
                description: m.description,
                priority: priority_from_str(&m.priority),
                due_date: m.due_date.map(Into::into),
                assignee_user_id: m.assignee_user_id,
                order: m.order,
                created_at: m.created_at.into(),
            }
        }
    }
}
