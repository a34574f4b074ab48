use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::config::StudioConfig;
use crate::infra::db::{DbCreditLedgerRepository, DbFileRepository, DbJobRepository};
use crate::infra::provider::HttpRenderClient;
use crate::infra::rate_limit::MemoryRateLimiter;
use crate::infra::storage::HttpBlobStorage;
use crate::usecase::materialize::MaterializeArtifactUseCase;
use crate::usecase::settle::SettleJobUseCase;

/// Shared application state passed to every handler via axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub provider: HttpRenderClient,
    pub storage: HttpBlobStorage,
    pub limiter: Arc<MemoryRateLimiter>,
    pub config: Arc<StudioConfig>,
}

impl AppState {
    pub fn job_repo(&self) -> DbJobRepository {
        DbJobRepository {
            db: self.db.clone(),
        }
    }

    pub fn ledger_repo(&self) -> DbCreditLedgerRepository {
        DbCreditLedgerRepository {
            db: self.db.clone(),
        }
    }

    pub fn file_repo(&self) -> DbFileRepository {
        DbFileRepository {
            db: self.db.clone(),
        }
    }

    pub fn settle(
        &self,
    ) -> SettleJobUseCase<DbJobRepository, DbCreditLedgerRepository, DbFileRepository, HttpBlobStorage>
    {
        SettleJobUseCase {
            jobs: self.job_repo(),
            ledger: self.ledger_repo(),
            files: self.file_repo(),
            materializer: MaterializeArtifactUseCase {
                storage: self.storage.clone(),
            },
        }
    }
}
