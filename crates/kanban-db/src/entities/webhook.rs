//! Webhook, `WebhookDelivery` (spec §3, §4.8).

pub mod webhook {
    use sea_orm::entity::prelude::*;
    use uuid::Uuid;

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
    #[sea_orm(table_name = "webhooks")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,
        pub org_id: Uuid,
        pub url: String,
        pub secret: String,
        #[sea_orm(column_type = "Json")]
        pub events: Vec<String>,
        pub is_enabled: bool,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "super::super::tenant::org::Entity",
            from = "Column::OrgId",
            to = "super::super::tenant::org::Column::Id"
        )]
        Org,
        #[sea_orm(has_many = "super::webhook_delivery::Entity")]
        Delivery,
    }

    impl Related<super::super::tenant::org::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Org.def()
        }
    }

    impl Related<super::webhook_delivery::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Delivery.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}

    impl From<Model> for kanban_domain::Webhook {
        fn from(m: Model) -> Self {
            Self {
                id: m.id,
                org_id: m.org_id,
                url: m.url,
                secret: m.secret,
                events: m.events,
                is_enabled: m.is_enabled,
            }
        }
    }
}

pub mod webhook_delivery {
    use sea_orm::entity::prelude::*;
    use uuid::Uuid;

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
    #[sea_orm(table_name = "webhook_deliveries")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,
        pub webhook_id: Uuid,
        pub event: String,
        #[sea_orm(column_type = "Json")]
        pub payload: serde_json::Value,
        pub status_code: Option<i32>,
        pub success: bool,
        pub duration_ms: i64,
        pub created_at: TimeDateTimeWithTimeZone,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "super::webhook::Entity",
            from = "Column::WebhookId",
            to = "super::webhook::Column::Id"
        )]
        Webhook,
    }

    impl Related<super::webhook::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Webhook.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}

    impl From<Model> for kanban_domain::WebhookDelivery {
        fn from(m: Model) -> Self {
            Self {
                id: m.id,
                webhook_id: m.webhook_id,
                event: m.event,
                payload: m.payload,
                status_code: m.status_code.map(|c| c as u16),
                success: m.success,
                duration_ms: m.duration_ms.max(0) as u64,
                created_at: m.created_at.into(),
            }
        }
    }
}
