use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(CreditTransactions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CreditTransactions::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(CreditTransactions::UserId).uuid().not_null())
                    .col(
                        ColumnDef::new(CreditTransactions::Amount)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CreditTransactions::TxType)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(CreditTransactions::Action).string().null())
                    .col(ColumnDef::new(CreditTransactions::JobId).uuid().null())
                    .col(
                        ColumnDef::new(CreditTransactions::Description)
                            .text()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CreditTransactions::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(CreditTransactions::Table, CreditTransactions::UserId)
                            .to(CreditAccounts::Table, CreditAccounts::UserId)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(CreditTransactions::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum CreditTransactions {
    Table,
    Id,
    UserId,
    Amount,
    TxType,
    Action,
    JobId,
    Description,
    CreatedAt,
}

#[derive(Iden)]
enum CreditAccounts {
    Table,
    UserId,
}
