//! Organization, User, Membership — the tenant root and its members
//! (spec §3). Each entity lives in its own inner module because
//! `DeriveEntityModel` always names its companion types `Entity`/`Column`/
//! `ActiveModel`, so two entities cannot share a module.

pub mod org {
    use sea_orm::entity::prelude::*;
    use uuid::Uuid;

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
    #[sea_orm(table_name = "organizations")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,
        pub name: String,
        #[sea_orm(unique)]
        pub slug: String,
        pub plan: String,
        pub deleted_at: Option<TimeDateTimeWithTimeZone>,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(has_many = "super::membership::Entity")]
        Membership,
        #[sea_orm(has_many = "super::super::board::board::Entity")]
        Board,
    }

    impl Related<super::membership::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Membership.def()
        }
    }

    impl Related<super::super::board::board::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Board.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}

    impl From<Model> for kanban_domain::Organization {
        fn from(m: Model) -> Self {
            Self {
                id: m.id,
                name: m.name,
                slug: m.slug,
                plan: if m.plan == "PRO" {
                    kanban_domain::Plan::Pro
                } else {
                    kanban_domain::Plan::Free
                },
                deleted_at: m.deleted_at.map(Into::into),
            }
        }
    }
}

pub mod user {
    use sea_orm::entity::prelude::*;
    use uuid::Uuid;

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
    #[sea_orm(table_name = "users")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,
        #[sea_orm(unique)]
        pub external_identity_id: String,
        pub email: String,
        pub display_name: String,
        pub avatar_url: Option<String>,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(has_many = "super::membership::Entity")]
        Membership,
    }

    impl Related<super::membership::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Membership.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}

    impl From<Model> for kanban_domain::User {
        fn from(m: Model) -> Self {
            Self {
                id: m.id,
                external_identity_id: m.external_identity_id,
                email: m.email,
                display_name: m.display_name,
                avatar_url: m.avatar_url,
            }
        }
    }
}

pub mod membership {
    use sea_orm::entity::prelude::*;
    use uuid::Uuid;

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
    #[sea_orm(table_name = "memberships")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub user_id: Uuid,
        #[sea_orm(primary_key, auto_increment = false)]
        pub org_id: Uuid,
        pub role: String,
        pub is_active: bool,
        pub joined_at: TimeDateTimeWithTimeZone,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "super::user::Entity",
            from = "Column::UserId",
            to = "super::user::Column::Id"
        )]
        User,
        #[sea_orm(
            belongs_to = "super::org::Entity",
            from = "Column::OrgId",
            to = "super::org::Column::Id"
        )]
        Org,
    }

    impl Related<super::user::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::User.def()
        }
    }

    impl Related<super::org::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Org.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}

    impl From<Model> for kanban_domain::Membership {
        fn from(m: Model) -> Self {
            Self {
                user_id: m.user_id,
                org_id: m.org_id,
                role: kanban_domain::Role::normalize(Some(&m.role)),
                is_active: m.is_active,
                joined_at: m.joined_at.into(),
            }
        }
    }
}
