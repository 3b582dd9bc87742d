use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Users::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Users::Username).string_len(50).not_null().unique_key())
                    .col(ColumnDef::new(Users::Email).string().null().unique_key())
                    .col(ColumnDef::new(Users::PasswordHash).string().not_null())
                    .col(ColumnDef::new(Users::IsAdmin).boolean().not_null().default(false))
                    .col(timestamp(Users::CreatedAt))
                    .col(timestamp(Users::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Posts::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Posts::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Posts::Title).string_len(200).not_null())
                    .col(ColumnDef::new(Posts::Slug).string_len(255).not_null().unique_key())
                    .col(ColumnDef::new(Posts::Content).text().not_null())
                    .col(ColumnDef::new(Posts::Excerpt).string_len(500).null())
                    .col(ColumnDef::new(Posts::Status).string_len(20).not_null().default("draft"))
                    .col(
                        ColumnDef::new(Posts::VerificationStatus)
                            .string_len(20)
                            .not_null()
                            .default("unverified"),
                    )
                    .col(ColumnDef::new(Posts::Category).string_len(50).null())
                    .col(ColumnDef::new(Posts::DocumentUrl).string_len(500).null())
                    .col(ColumnDef::new(Posts::AuthorId).uuid().not_null())
                    .col(ColumnDef::new(Posts::PublishedAt).timestamp_with_time_zone().null())
                    .col(timestamp(Posts::CreatedAt))
                    .col(timestamp(Posts::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_posts_author")
                            .from(Posts::Table, Posts::AuthorId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        for (name, column) in [
            ("idx_posts_status", Posts::Status),
            ("idx_posts_category", Posts::Category),
            ("idx_posts_published_at", Posts::PublishedAt),
            ("idx_posts_author_id", Posts::AuthorId),
        ] {
            manager
                .create_index(
                    Index::create()
                        .name(name)
                        .table(Posts::Table)
                        .col(column)
                        .if_not_exists()
                        .to_owned(),
                )
                .await?;
        }

        manager
            .create_table(
                Table::create()
                    .table(Impacts::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Impacts::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Impacts::Title).string_len(200).not_null())
                    .col(ColumnDef::new(Impacts::Description).text().not_null())
                    .col(ColumnDef::new(Impacts::Date).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(Impacts::Type).string_len(20).not_null())
                    .col(ColumnDef::new(Impacts::Status).string_len(20).not_null().default("pending"))
                    .col(ColumnDef::new(Impacts::PostId).uuid().not_null())
                    .col(timestamp(Impacts::CreatedAt))
                    .col(timestamp(Impacts::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_impacts_post")
                            .from(Impacts::Table, Impacts::PostId)
                            .to(Posts::Table, Posts::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_impacts_post_id")
                    .table(Impacts::Table)
                    .col(Impacts::PostId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PushSubscriptions::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(PushSubscriptions::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(PushSubscriptions::UserId).uuid().null())
                    .col(ColumnDef::new(PushSubscriptions::Endpoint).text().not_null().unique_key())
                    .col(ColumnDef::new(PushSubscriptions::P256dh).string().not_null())
                    .col(ColumnDef::new(PushSubscriptions::Auth).string().not_null())
                    .col(ColumnDef::new(PushSubscriptions::UserAgent).string().null())
                    .col(flag(PushSubscriptions::IsActive, true))
                    .col(flag(PushSubscriptions::NotifyNewPosts, true))
                    .col(flag(PushSubscriptions::NotifyUpdates, true))
                    .col(flag(PushSubscriptions::NotifyWeeklyDigest, false))
                    .col(timestamp(PushSubscriptions::CreatedAt))
                    .col(timestamp(PushSubscriptions::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_push_subscriptions_user")
                            .from(PushSubscriptions::Table, PushSubscriptions::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for table in [
            PushSubscriptions::Table.into_iden(),
            Impacts::Table.into_iden(),
            Posts::Table.into_iden(),
            Users::Table.into_iden(),
        ] {
            manager
                .drop_table(Table::drop().table(table).if_exists().to_owned())
                .await?;
        }
        Ok(())
    }
}

fn timestamp<T: IntoIden>(column: T) -> ColumnDef {
    ColumnDef::new(column)
        .timestamp_with_time_zone()
        .not_null()
        .default(Expr::current_timestamp())
        .to_owned()
}

fn flag<T: IntoIden>(column: T, default: bool) -> ColumnDef {
    ColumnDef::new(column)
        .boolean()
        .not_null()
        .default(default)
        .to_owned()
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Username,
    Email,
    PasswordHash,
    IsAdmin,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Posts {
    Table,
    Id,
    Title,
    Slug,
    Content,
    Excerpt,
    Status,
    VerificationStatus,
    Category,
    DocumentUrl,
    AuthorId,
    PublishedAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Impacts {
    Table,
    Id,
    Title,
    Description,
    Date,
    Type,
    Status,
    PostId,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum PushSubscriptions {
    Table,
    Id,
    UserId,
    Endpoint,
    #[sea_orm(iden = "p256dh")]
    P256dh,
    Auth,
    UserAgent,
    IsActive,
    NotifyNewPosts,
    NotifyUpdates,
    NotifyWeeklyDigest,
    CreatedAt,
    UpdatedAt,
}
