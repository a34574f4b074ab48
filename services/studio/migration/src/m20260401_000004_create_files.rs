use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Files::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Files::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Files::UserId).uuid().not_null())
                    .col(ColumnDef::new(Files::JobId).uuid().null())
                    .col(ColumnDef::new(Files::Origin).string().not_null())
                    .col(ColumnDef::new(Files::Kind).string().not_null())
                    .col(ColumnDef::new(Files::StorageKey).text().not_null())
                    .col(ColumnDef::new(Files::Url).text().not_null())
                    .col(ColumnDef::new(Files::Size).big_integer().not_null())
                    .col(ColumnDef::new(Files::MimeType).string().not_null())
                    .col(
                        ColumnDef::new(Files::Deleted)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Files::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Files::Table, Files::JobId)
                            .to(GenerationJobs::Table, GenerationJobs::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Files::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Files {
    Table,
    Id,
    UserId,
    JobId,
    Origin,
    Kind,
    StorageKey,
    Url,
    Size,
    MimeType,
    Deleted,
    CreatedAt,
}

#[derive(Iden)]
enum GenerationJobs {
    Table,
    Id,
}
