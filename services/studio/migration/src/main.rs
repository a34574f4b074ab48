use sea_orm_migration::prelude::*;

mod m20260401_000001_create_credit_accounts;
mod m20260401_000002_create_generation_jobs;
mod m20260401_000003_create_credit_transactions;
mod m20260401_000004_create_files;
mod m20260401_000005_add_indexes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260401_000001_create_credit_accounts::Migration),
            Box::new(m20260401_000002_create_generation_jobs::Migration),
            Box::new(m20260401_000003_create_credit_transactions::Migration),
            Box::new(m20260401_000004_create_files::Migration),
            Box::new(m20260401_000005_add_indexes::Migration),
        ]
    }
}

#[tokio::main]
async fn main() {
    cli::run_cli(Migrator).await;
}
