//! Schema migrations, via `sea-orm-migration`'s `MigratorTrait` (SPEC_FULL
//! §1.1 Persistence). `kanban-server` runs `Migrator::up` against the
//! configured database on startup; tests run it against a scratch
//! database per test module.

use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(m20240101_000001_initial::Migration)]
    }
}

mod m20240101_000001_initial {
    use sea_orm_migration::prelude::*;

    #[derive(DeriveMigrationName)]
    pub struct Migration;

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Organizations::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Organizations::Id).uuid().primary_key())
                        .col(ColumnDef::new(Organizations::Name).string().not_null())
                        .col(
                            ColumnDef::new(Organizations::Slug)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Organizations::Plan).string().not_null())
                        .col(ColumnDef::new(Organizations::DeletedAt).timestamp_with_time_zone())
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Users::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Users::Id).uuid().primary_key())
                        .col(
                            ColumnDef::new(Users::ExternalIdentityId)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Users::Email).string().not_null())
                        .col(ColumnDef::new(Users::DisplayName).string().not_null())
                        .col(ColumnDef::new(Users::AvatarUrl).string())
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Memberships::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Memberships::UserId).uuid().not_null())
                        .col(ColumnDef::new(Memberships::OrgId).uuid().not_null())
                        .col(ColumnDef::new(Memberships::Role).string().not_null())
                        .col(ColumnDef::new(Memberships::IsActive).boolean().not_null())
                        .col(
                            ColumnDef::new(Memberships::JoinedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .primary_key(
                            Index::create()
                                .col(Memberships::UserId)
                                .col(Memberships::OrgId),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .from(Memberships::Table, Memberships::UserId)
                                .to(Users::Table, Users::Id),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .from(Memberships::Table, Memberships::OrgId)
                                .to(Organizations::Table, Organizations::Id),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Boards::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Boards::Id).uuid().primary_key())
                        .col(ColumnDef::new(Boards::OrgId).uuid().not_null())
                        .col(ColumnDef::new(Boards::Title).string().not_null())
                        .col(ColumnDef::new(Boards::ImageUrl).string())
                        .col(
                            ColumnDef::new(Boards::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .from(Boards::Table, Boards::OrgId)
                                .to(Organizations::Table, Organizations::Id),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Lists::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Lists::Id).uuid().primary_key())
                        .col(ColumnDef::new(Lists::BoardId).uuid().not_null())
                        .col(ColumnDef::new(Lists::Title).string().not_null())
                        .col(ColumnDef::new(Lists::Order).string().not_null())
                        .foreign_key(
                            ForeignKey::create()
                                .from(Lists::Table, Lists::BoardId)
                                .to(Boards::Table, Boards::Id),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Cards::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Cards::Id).uuid().primary_key())
                        .col(ColumnDef::new(Cards::ListId).uuid().not_null())
                        .col(ColumnDef::new(Cards::Title).string().not_null())
                        .col(ColumnDef::new(Cards::Description).text().not_null())
                        .col(ColumnDef::new(Cards::Priority).string().not_null())
                        .col(ColumnDef::new(Cards::DueDate).timestamp_with_time_zone())
                        .col(ColumnDef::new(Cards::AssigneeUserId).uuid())
                        .col(ColumnDef::new(Cards::Order).string().not_null())
                        .col(
                            ColumnDef::new(Cards::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .from(Cards::Table, Cards::ListId)
                                .to(Lists::Table, Lists::Id),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Labels::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Labels::Id).uuid().primary_key())
                        .col(ColumnDef::new(Labels::OrgId).uuid().not_null())
                        .col(ColumnDef::new(Labels::Name).string().not_null())
                        .col(ColumnDef::new(Labels::Color).string().not_null())
                        .foreign_key(
                            ForeignKey::create()
                                .from(Labels::Table, Labels::OrgId)
                                .to(Organizations::Table, Organizations::Id),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(CardLabels::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(CardLabels::CardId).uuid().not_null())
                        .col(ColumnDef::new(CardLabels::LabelId).uuid().not_null())
                        .primary_key(
                            Index::create()
                                .col(CardLabels::CardId)
                                .col(CardLabels::LabelId),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .from(CardLabels::Table, CardLabels::CardId)
                                .to(Cards::Table, Cards::Id),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .from(CardLabels::Table, CardLabels::LabelId)
                                .to(Labels::Table, Labels::Id),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Comments::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Comments::Id).uuid().primary_key())
                        .col(ColumnDef::new(Comments::CardId).uuid().not_null())
                        .col(ColumnDef::new(Comments::AuthorUserId).uuid().not_null())
                        .col(ColumnDef::new(Comments::Text).text().not_null())
                        .col(ColumnDef::new(Comments::ParentId).uuid())
                        .col(ColumnDef::new(Comments::IsDraft).boolean().not_null())
                        .col(
                            ColumnDef::new(Comments::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .from(Comments::Table, Comments::CardId)
                                .to(Cards::Table, Cards::Id),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Reactions::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Reactions::Id).uuid().primary_key())
                        .col(ColumnDef::new(Reactions::CommentId).uuid().not_null())
                        .col(ColumnDef::new(Reactions::UserId).uuid().not_null())
                        .col(ColumnDef::new(Reactions::Emoji).string().not_null())
                        .foreign_key(
                            ForeignKey::create()
                                .from(Reactions::Table, Reactions::CommentId)
                                .to(Comments::Table, Comments::Id),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Checklists::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Checklists::Id).uuid().primary_key())
                        .col(ColumnDef::new(Checklists::CardId).uuid().not_null())
                        .col(ColumnDef::new(Checklists::Title).string().not_null())
                        .col(ColumnDef::new(Checklists::Order).string().not_null())
                        .foreign_key(
                            ForeignKey::create()
                                .from(Checklists::Table, Checklists::CardId)
                                .to(Cards::Table, Cards::Id),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(ChecklistItems::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(ChecklistItems::Id).uuid().primary_key())
                        .col(ColumnDef::new(ChecklistItems::ChecklistId).uuid().not_null())
                        .col(ColumnDef::new(ChecklistItems::Text).string().not_null())
                        .col(
                            ColumnDef::new(ChecklistItems::IsComplete)
                                .boolean()
                                .not_null(),
                        )
                        .col(ColumnDef::new(ChecklistItems::Order).string().not_null())
                        .foreign_key(
                            ForeignKey::create()
                                .from(ChecklistItems::Table, ChecklistItems::ChecklistId)
                                .to(Checklists::Table, Checklists::Id),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Automations::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Automations::Id).uuid().primary_key())
                        .col(ColumnDef::new(Automations::OrgId).uuid().not_null())
                        .col(ColumnDef::new(Automations::BoardId).uuid())
                        .col(ColumnDef::new(Automations::Name).string().not_null())
                        .col(ColumnDef::new(Automations::IsEnabled).boolean().not_null())
                        .col(ColumnDef::new(Automations::Trigger).json().not_null())
                        .col(ColumnDef::new(Automations::Conditions).json().not_null())
                        .col(ColumnDef::new(Automations::Actions).json().not_null())
                        .col(
                            ColumnDef::new(Automations::RunCount)
                                .big_integer()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Automations::LastRunAt).timestamp_with_time_zone())
                        .foreign_key(
                            ForeignKey::create()
                                .from(Automations::Table, Automations::OrgId)
                                .to(Organizations::Table, Organizations::Id),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(AutomationLogs::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(AutomationLogs::Id).uuid().primary_key())
                        .col(
                            ColumnDef::new(AutomationLogs::AutomationId)
                                .uuid()
                                .not_null(),
                        )
                        .col(ColumnDef::new(AutomationLogs::CardId).uuid())
                        .col(ColumnDef::new(AutomationLogs::Success).boolean().not_null())
                        .col(ColumnDef::new(AutomationLogs::Error).text())
                        .col(
                            ColumnDef::new(AutomationLogs::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .from(AutomationLogs::Table, AutomationLogs::AutomationId)
                                .to(Automations::Table, Automations::Id),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Webhooks::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Webhooks::Id).uuid().primary_key())
                        .col(ColumnDef::new(Webhooks::OrgId).uuid().not_null())
                        .col(ColumnDef::new(Webhooks::Url).string().not_null())
                        .col(ColumnDef::new(Webhooks::Secret).string().not_null())
                        .col(ColumnDef::new(Webhooks::Events).json().not_null())
                        .col(ColumnDef::new(Webhooks::IsEnabled).boolean().not_null())
                        .foreign_key(
                            ForeignKey::create()
                                .from(Webhooks::Table, Webhooks::OrgId)
                                .to(Organizations::Table, Organizations::Id),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(WebhookDeliveries::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(WebhookDeliveries::Id).uuid().primary_key())
                        .col(
                            ColumnDef::new(WebhookDeliveries::WebhookId)
                                .uuid()
                                .not_null(),
                        )
                        .col(ColumnDef::new(WebhookDeliveries::Event).string().not_null())
                        .col(ColumnDef::new(WebhookDeliveries::Payload).json().not_null())
                        .col(ColumnDef::new(WebhookDeliveries::StatusCode).integer())
                        .col(
                            ColumnDef::new(WebhookDeliveries::Success)
                                .boolean()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(WebhookDeliveries::DurationMs)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(WebhookDeliveries::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .from(WebhookDeliveries::Table, WebhookDeliveries::WebhookId)
                                .to(Webhooks::Table, Webhooks::Id),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(AuditLogs::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(AuditLogs::Id).uuid().primary_key())
                        .col(ColumnDef::new(AuditLogs::OrgId).uuid().not_null())
                        .col(ColumnDef::new(AuditLogs::UserId).uuid().not_null())
                        .col(ColumnDef::new(AuditLogs::EntityType).string().not_null())
                        .col(ColumnDef::new(AuditLogs::EntityId).uuid().not_null())
                        .col(ColumnDef::new(AuditLogs::EntityTitle).string().not_null())
                        .col(ColumnDef::new(AuditLogs::Action).string().not_null())
                        .col(ColumnDef::new(AuditLogs::IpAddress).string())
                        .col(ColumnDef::new(AuditLogs::UserAgent).string())
                        .col(
                            ColumnDef::new(AuditLogs::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .from(AuditLogs::Table, AuditLogs::OrgId)
                                .to(Organizations::Table, Organizations::Id),
                        )
                        .to_owned(),
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            for table in [
                AuditLogs::Table.into_iden(),
                WebhookDeliveries::Table.into_iden(),
                Webhooks::Table.into_iden(),
                AutomationLogs::Table.into_iden(),
                Automations::Table.into_iden(),
                ChecklistItems::Table.into_iden(),
                Checklists::Table.into_iden(),
                Reactions::Table.into_iden(),
                Comments::Table.into_iden(),
                CardLabels::Table.into_iden(),
                Labels::Table.into_iden(),
                Cards::Table.into_iden(),
                Lists::Table.into_iden(),
                Boards::Table.into_iden(),
                Memberships::Table.into_iden(),
                Users::Table.into_iden(),
                Organizations::Table.into_iden(),
            ] {
                manager
                    .drop_table(Table::drop().table(table).if_exists().to_owned())
                    .await?;
            }
            Ok(())
        }
    }

    #[derive(DeriveIden)]
    enum Organizations {
        Table,
        Id,
        Name,
        Slug,
        Plan,
        DeletedAt,
    }

    #[derive(DeriveIden)]
    enum Users {
        Table,
        Id,
        ExternalIdentityId,
        Email,
        DisplayName,
        AvatarUrl,
    }

    #[derive(DeriveIden)]
    enum Memberships {
        Table,
        UserId,
        OrgId,
        Role,
        IsActive,
        JoinedAt,
    }

    #[derive(DeriveIden)]
    enum Boards {
        Table,
        Id,
        OrgId,
        Title,
        ImageUrl,
        CreatedAt,
    }

    #[derive(DeriveIden)]
    enum Lists {
        Table,
        Id,
        BoardId,
        Title,
        Order,
    }

    #[derive(DeriveIden)]
    enum Cards {
        Table,
        Id,
        ListId,
        Title,
        Description,
        Priority,
        DueDate,
        AssigneeUserId,
        Order,
        CreatedAt,
    }

    #[derive(DeriveIden)]
    enum Labels {
        Table,
        Id,
        OrgId,
        Name,
        Color,
    }

    #[derive(DeriveIden)]
    enum CardLabels {
        Table,
        CardId,
        LabelId,
    }

    #[derive(DeriveIden)]
    enum Comments {
        Table,
        Id,
        CardId,
        AuthorUserId,
        Text,
        ParentId,
        IsDraft,
        CreatedAt,
    }

    #[derive(DeriveIden)]
    enum Reactions {
        Table,
        Id,
        CommentId,
        UserId,
        Emoji,
    }

    #[derive(DeriveIden)]
    enum Checklists {
        Table,
        Id,
        CardId,
        Title,
        Order,
    }

    #[derive(DeriveIden)]
    enum ChecklistItems {
        Table,
        Id,
        ChecklistId,
        Text,
        IsComplete,
        Order,
    }

    #[derive(DeriveIden)]
    enum Automations {
        Table,
        Id,
        OrgId,
        BoardId,
        Name,
        IsEnabled,
        Trigger,
        Conditions,
        Actions,
        RunCount,
        LastRunAt,
    }

    #[derive(DeriveIden)]
    enum AutomationLogs {
        Table,
        Id,
        AutomationId,
        CardId,
        Success,
        Error,
        CreatedAt,
    }

    #[derive(DeriveIden)]
    enum Webhooks {
        Table,
        Id,
        OrgId,
        Url,
        Secret,
        Events,
        IsEnabled,
    }

    #[derive(DeriveIden)]
    enum WebhookDeliveries {
        Table,
        Id,
        WebhookId,
        Event,
        Payload,
        StatusCode,
        Success,
        DurationMs,
        CreatedAt,
    }

    #[derive(DeriveIden)]
    enum AuditLogs {
        Table,
        Id,
        OrgId,
        UserId,
        EntityType,
        EntityId,
        EntityTitle,
        Action,
        IpAddress,
        UserAgent,
        CreatedAt,
    }
}
