use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(GenerationJobs::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(GenerationJobs::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(GenerationJobs::UserId).uuid().not_null())
                    .col(ColumnDef::new(GenerationJobs::JobType).string().not_null())
                    .col(
                        ColumnDef::new(GenerationJobs::Status)
                            .string()
                            .not_null()
                            .default("pending"),
                    )
                    .col(ColumnDef::new(GenerationJobs::Prompt).text().not_null())
                    .col(ColumnDef::new(GenerationJobs::SourceUrl).text().null())
                    .col(
                        ColumnDef::new(GenerationJobs::Settings)
                            .json_binary()
                            .not_null(),
                    )
                    .col(ColumnDef::new(GenerationJobs::ProviderTaskId).string().null())
                    .col(ColumnDef::new(GenerationJobs::ResultUrl).text().null())
                    .col(ColumnDef::new(GenerationJobs::ThumbnailUrl).text().null())
                    .col(
                        ColumnDef::new(GenerationJobs::Metadata)
                            .json_binary()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(GenerationJobs::CreditsCost)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(GenerationJobs::CreditsCharged)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(GenerationJobs::Error).text().null())
                    .col(
                        ColumnDef::new(GenerationJobs::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(GenerationJobs::StartedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(GenerationJobs::CompletedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(GenerationJobs::Table, GenerationJobs::UserId)
                            .to(CreditAccounts::Table, CreditAccounts::UserId)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(GenerationJobs::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum GenerationJobs {
    Table,
    Id,
    UserId,
    JobType,
    Status,
    Prompt,
    SourceUrl,
    Settings,
    ProviderTaskId,
    ResultUrl,
    ThumbnailUrl,
    Metadata,
    CreditsCost,
    CreditsCharged,
    Error,
    CreatedAt,
    StartedAt,
    CompletedAt,
}

#[derive(Iden)]
enum CreditAccounts {
    Table,
    UserId,
}
