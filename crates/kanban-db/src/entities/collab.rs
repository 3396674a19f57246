//! Label, `CardLabel`, Comment, Reaction, Checklist, `ChecklistItem` — the
//! card-adjacent collaboration entities (spec §3, SPEC_FULL §3.1).

pub mod label {
    use sea_orm::entity::prelude::*;
    use uuid::Uuid;

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
    #[sea_orm(table_name = "labels")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,
        pub org_id: Uuid,
        pub name: String,
        pub color: String,
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

    impl From<Model> for kanban_domain::Label {
        fn from(m: Model) -> Self {
            Self {
                id: m.id,
                org_id: m.org_id,
                name: m.name,
                color: m.color,
            }
        }
    }
}

pub mod card_label {
    use sea_orm::entity::prelude::*;
    use uuid::Uuid;

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
    #[sea_orm(table_name = "card_labels")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub card_id: Uuid,
        #[sea_orm(primary_key, auto_increment = false)]
        pub label_id: Uuid,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "super::super::board::card::Entity",
            from = "Column::CardId",
            to = "super::super::board::card::Column::Id"
        )]
        Card,
        #[sea_orm(
            belongs_to = "super::label::Entity",
            from = "Column::LabelId",
            to = "super::label::Column::Id"
        )]
        Label,
    }

    impl Related<super::super::board::card::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Card.def()
        }
    }

    impl Related<super::label::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Label.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}

    impl From<Model> for kanban_domain::CardLabel {
        fn from(m: Model) -> Self {
            Self {
                card_id: m.card_id,
                label_id: m.label_id,
            }
        }
    }
}

pub mod comment {
    use sea_orm::entity::prelude::*;
    use uuid::Uuid;

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
    #[sea_orm(table_name = "comments")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,
        pub card_id: Uuid,
        pub author_user_id: Uuid,
        #[sea_orm(column_type = "Text")]
        pub text: String,
        pub parent_id: Option<Uuid>,
        pub is_draft: bool,
        pub created_at: TimeDateTimeWithTimeZone,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "super::super::board::card::Entity",
            from = "Column::CardId",
            to = "super::super::board::card::Column::Id"
        )]
        Card,
    }

    impl Related<super::super::board::card::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Card.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}

    impl From<Model> for kanban_domain::Comment {
        fn from(m: Model) -> Self {
            Self {
                id: m.id,
                card_id: m.card_id,
                author_user_id: m.author_user_id,
                text: m.text,
                parent_id: m.parent_id,
                is_draft: m.is_draft,
                created_at: m.created_at.into(),
            }
        }
    }
}

pub mod reaction {
    use sea_orm::entity::prelude::*;
    use uuid::Uuid;

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
    #[sea_orm(table_name = "reactions")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,
        pub comment_id: Uuid,
        pub user_id: Uuid,
        pub emoji: String,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "super::comment::Entity",
            from = "Column::CommentId",
            to = "super::comment::Column::Id"
        )]
        Comment,
    }

    impl Related<super::comment::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Comment.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}

    impl From<Model> for kanban_domain::Reaction {
        fn from(m: Model) -> Self {
            Self {
                id: m.id,
                comment_id: m.comment_id,
                user_id: m.user_id,
                emoji: m.emoji,
            }
        }
    }
}

pub mod checklist {
    use sea_orm::entity::prelude::*;
    use uuid::Uuid;

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
    #[sea_orm(table_name = "checklists")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,
        pub card_id: Uuid,
        pub title: String,
        pub order: String,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "super::super::board::card::Entity",
            from = "Column::CardId",
            to = "super::super::board::card::Column::Id"
        )]
        Card,
        #[sea_orm(has_many = "super::checklist_item::Entity")]
        Item,
    }

    impl Related<super::super::board::card::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Card.def()
        }
    }

    impl Related<super::checklist_item::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Item.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}

    impl From<Model> for kanban_domain::Checklist {
        fn from(m: Model) -> Self {
            Self {
                id: m.id,
                card_id: m.card_id,
                title: m.title,
                order: m.order,
            }
        }
    }
}

pub mod checklist_item {
    use sea_orm::entity::prelude::*;
    use uuid::Uuid;

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
    #[sea_orm(table_name = "checklist_items")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,
        pub checklist_id: Uuid,
        pub text: String,
        pub is_complete: bool,
        pub order: String,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "super::checklist::Entity",
            from = "Column::ChecklistId",
            to = "super::checklist::Column::Id"
        )]
        Checklist,
    }

    impl Related<super::checklist::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Checklist.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}

    impl From<Model> for kanban_domain::ChecklistItem {
        fn from(m: Model) -> Self {
            Self {
                id: m.id,
                checklist_id: m.checklist_id,
                text: m.text,
                is_complete: m.is_complete,
                order: m.order,
            }
        }
    }
}
