use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Webhook fallback lookup path.
        manager
            .create_index(
                Index::create()
                    .table(GenerationJobs::Table)
                    .col(GenerationJobs::ProviderTaskId)
                    .name("idx_generation_jobs_provider_task_id")
                    .to_owned(),
            )
            .await?;
        // Reaper sweep: processing jobs by start time.
        manager
            .create_index(
                Index::create()
                    .table(GenerationJobs::Table)
                    .col(GenerationJobs::Status)
                    .col(GenerationJobs::StartedAt)
                    .name("idx_generation_jobs_status_started_at")
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .table(GenerationJobs::Table)
                    .col(GenerationJobs::UserId)
                    .col(GenerationJobs::CreatedAt)
                    .name("idx_generation_jobs_user_id_created_at")
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .table(CreditTransactions::Table)
                    .col(CreditTransactions::UserId)
                    .col(CreditTransactions::CreatedAt)
                    .name("idx_credit_transactions_user_id_created_at")
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .table(Files::Table)
                    .col(Files::UserId)
                    .col(Files::CreatedAt)
                    .name("idx_files_user_id_created_at")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_files_user_id_created_at")
                    .to_owned(),
            )
            .await?;
        manager
            .drop_index(
                Index::drop()
                    .name("idx_credit_transactions_user_id_created_at")
                    .to_owned(),
            )
            .await?;
        manager
            .drop_index(
                Index::drop()
                    .name("idx_generation_jobs_user_id_created_at")
                    .to_owned(),
            )
            .await?;
        manager
            .drop_index(
                Index::drop()
                    .name("idx_generation_jobs_status_started_at")
                    .to_owned(),
            )
            .await?;
        manager
            .drop_index(
                Index::drop()
                    .name("idx_generation_jobs_provider_task_id")
                    .to_owned(),
            )
            .await
    }
}

#[derive(Iden)]
enum GenerationJobs {
    Table,
    UserId,
    Status,
    ProviderTaskId,
    StartedAt,
    CreatedAt,
}

#[derive(Iden)]
enum CreditTransactions {
    Table,
    UserId,
    CreatedAt,
}

#[derive(Iden)]
enum Files {
    Table,
    UserId,
    CreatedAt,
}
