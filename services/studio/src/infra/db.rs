use anyhow::Context as _;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::{Expr, ExprTrait};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect,
};
use uuid::Uuid;

use lumeo_domain::action::CreditPool;
use lumeo_domain::id::{FileId, JobId, TaskHandle};
use lumeo_domain::pagination::PageRequest;
use lumeo_studio_schema::{credit_accounts, credit_transactions, files, generation_jobs};

use crate::domain::repository::{CreditLedgerRepository, FileRepository, JobRepository};
use crate::domain::types::{
    CreditAccount, CreditTransaction, FileRecord, Job, JobStatus, TxType,
};
use crate::error::StudioServiceError;

const ACTIVE_STATUSES: [&str; 2] = ["pending", "processing"];

// ── Job repository ───────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbJobRepository {
    pub db: DatabaseConnection,
}

impl JobRepository for DbJobRepository {
    async fn create(&self, job: &Job) -> Result<(), StudioServiceError> {
        generation_jobs::ActiveModel {
            id: Set(job.id.0),
            user_id: Set(job.user_id),
            job_type: Set(job.action.as_str().to_owned()),
            status: Set(job.status.as_str().to_owned()),
            prompt: Set(job.prompt.clone()),
            source_url: Set(job.source_url.clone()),
            settings: Set(job.settings.clone()),
            provider_task_id: Set(job.task_handle.as_ref().map(|h| h.0.clone())),
            result_url: Set(job.result_url.clone()),
            thumbnail_url: Set(job.thumbnail_url.clone()),
            metadata: Set(job.metadata.clone()),
            credits_cost: Set(job.credits_cost),
            credits_charged: Set(job.credits_charged),
            error: Set(job.error.clone()),
            created_at: Set(job.created_at),
            started_at: Set(job.started_at),
            completed_at: Set(job.completed_at),
        }
        .insert(&self.db)
        .await
        .context("create generation job")?;
        Ok(())
    }

    async fn find_by_id(&self, id: JobId) -> Result<Option<Job>, StudioServiceError> {
        let model = generation_jobs::Entity::find_by_id(id.0)
            .one(&self.db)
            .await
            .context("find job by id")?;
        model.map(job_from_model).transpose()
    }

    async fn find_by_task_handle(
        &self,
        handle: &TaskHandle,
    ) -> Result<Option<Job>, StudioServiceError> {
        let model = generation_jobs::Entity::find()
            .filter(generation_jobs::Column::ProviderTaskId.eq(&handle.0))
            .one(&self.db)
            .await
            .context("find job by task handle")?;
        model.map(job_from_model).transpose()
    }

    async fn list(
        &self,
        user_id: Uuid,
        page: PageRequest,
    ) -> Result<Vec<Job>, StudioServiceError> {
        let page = page.clamped();
        let models = generation_jobs::Entity::find()
            .filter(generation_jobs::Column::UserId.eq(user_id))
            .order_by_desc(generation_jobs::Column::CreatedAt)
            .offset(page.offset())
            .limit(page.per_page as u64)
            .all(&self.db)
            .await
            .context("list jobs")?;
        models.into_iter().map(job_from_model).collect()
    }

    async fn mark_processing(
        &self,
        id: JobId,
        handle: &TaskHandle,
    ) -> Result<(), StudioServiceError> {
        generation_jobs::ActiveModel {
            id: Set(id.0),
            status: Set(JobStatus::Processing.as_str().to_owned()),
            provider_task_id: Set(Some(handle.0.clone())),
            started_at: Set(Some(Utc::now())),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .context("mark job processing")?;
        Ok(())
    }

    async fn update_metadata(
        &self,
        id: JobId,
        metadata: &serde_json::Value,
    ) -> Result<(), StudioServiceError> {
        generation_jobs::Entity::update_many()
            .col_expr(generation_jobs::Column::Metadata, Expr::value(metadata.clone()))
            .filter(generation_jobs::Column::Id.eq(id.0))
            .exec(&self.db)
            .await
            .context("update job metadata")?;
        Ok(())
    }

    async fn complete_if_active(
        &self,
        id: JobId,
        result_url: &str,
        thumbnail_url: Option<&str>,
    ) -> Result<bool, StudioServiceError> {
        // Conditional terminal transition: the status guard makes the racing
        // observers (webhook, reconciler, reaper) agree on a single winner.
        let result = generation_jobs::Entity::update_many()
            .col_expr(
                generation_jobs::Column::Status,
                Expr::value(JobStatus::Completed.as_str()),
            )
            .col_expr(
                generation_jobs::Column::ResultUrl,
                Expr::value(Some(result_url.to_owned())),
            )
            .col_expr(
                generation_jobs::Column::ThumbnailUrl,
                Expr::value(thumbnail_url.map(str::to_owned)),
            )
            .col_expr(generation_jobs::Column::CompletedAt, Expr::value(Some(Utc::now())))
            .filter(generation_jobs::Column::Id.eq(id.0))
            .filter(generation_jobs::Column::Status.is_in(ACTIVE_STATUSES))
            .exec(&self.db)
            .await
            .context("complete job if active")?;
        Ok(result.rows_affected == 1)
    }

    async fn fail_if_active(&self, id: JobId, error: &str) -> Result<bool, StudioServiceError> {
        let result = generation_jobs::Entity::update_many()
            .col_expr(
                generation_jobs::Column::Status,
                Expr::value(JobStatus::Failed.as_str()),
            )
            .col_expr(
                generation_jobs::Column::Error,
                Expr::value(Some(error.to_owned())),
            )
            .col_expr(generation_jobs::Column::CompletedAt, Expr::value(Some(Utc::now())))
            .filter(generation_jobs::Column::Id.eq(id.0))
            .filter(generation_jobs::Column::Status.is_in(ACTIVE_STATUSES))
            .exec(&self.db)
            .await
            .context("fail job if active")?;
        Ok(result.rows_affected == 1)
    }

    async fn set_charged(&self, id: JobId) -> Result<(), StudioServiceError> {
        generation_jobs::Entity::update_many()
            .col_expr(generation_jobs::Column::CreditsCharged, Expr::value(true))
            .filter(generation_jobs::Column::Id.eq(id.0))
            .exec(&self.db)
            .await
            .context("set job charged")?;
        Ok(())
    }

    async fn find_stuck(
        &self,
        cutoff: DateTime<Utc>,
        limit: u64,
    ) -> Result<Vec<Job>, StudioServiceError> {
        let models = generation_jobs::Entity::find()
            .filter(generation_jobs::Column::Status.eq(JobStatus::Processing.as_str()))
            .filter(generation_jobs::Column::StartedAt.lt(cutoff))
            .order_by_asc(generation_jobs::Column::StartedAt)
            .limit(limit)
            .all(&self.db)
            .await
            .context("find stuck jobs")?;
        models.into_iter().map(job_from_model).collect()
    }
}

fn job_from_model(model: generation_jobs::Model) -> Result<Job, StudioServiceError> {
    let action = model
        .job_type
        .parse()
        .map_err(anyhow::Error::from)
        .context("job_type column")?;
    let status = model
        .status
        .parse()
        .map_err(anyhow::Error::from)
        .context("status column")?;
    Ok(Job {
        id: JobId(model.id),
        user_id: model.user_id,
        action,
        status,
        prompt: model.prompt,
        source_url: model.source_url,
        settings: model.settings,
        task_handle: model.provider_task_id.map(TaskHandle),
        result_url: model.result_url,
        thumbnail_url: model.thumbnail_url,
        metadata: model.metadata,
        credits_cost: model.credits_cost,
        credits_charged: model.credits_charged,
        error: model.error,
        created_at: model.created_at,
        started_at: model.started_at,
        completed_at: model.completed_at,
    })
}

// ── Credit ledger repository ─────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbCreditLedgerRepository {
    pub db: DatabaseConnection,
}

/// (total, used) column pair for a pool.
fn pool_columns(pool: CreditPool) -> (credit_accounts::Column, credit_accounts::Column) {
    match pool {
        CreditPool::Image => (
            credit_accounts::Column::ImageCredits,
            credit_accounts::Column::ImageCreditsUsed,
        ),
        CreditPool::Video => (
            credit_accounts::Column::VideoCredits,
            credit_accounts::Column::VideoCreditsUsed,
        ),
        CreditPool::Legacy => (
            credit_accounts::Column::CreditsBalance,
            credit_accounts::Column::CreditsUsed,
        ),
    }
}

impl CreditLedgerRepository for DbCreditLedgerRepository {
    async fn find_account(
        &self,
        user_id: Uuid,
    ) -> Result<Option<CreditAccount>, StudioServiceError> {
        let model = credit_accounts::Entity::find_by_id(user_id)
            .one(&self.db)
            .await
            .context("find credit account")?;
        Ok(model.map(account_from_model))
    }

    async fn try_deduct(
        &self,
        user_id: Uuid,
        pool: CreditPool,
        cost: i32,
    ) -> Result<bool, StudioServiceError> {
        let (total, used) = pool_columns(pool);
        // The availability check and the increment are one statement; the
        // WHERE clause is evaluated under the row lock, so concurrent
        // deductions on the same account cannot both pass a stale check.
        let result = credit_accounts::Entity::update_many()
            .col_expr(used, Expr::col(used).add(cost))
            .col_expr(credit_accounts::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(credit_accounts::Column::UserId.eq(user_id))
            .filter(Expr::col(total).sub(Expr::col(used)).gte(cost))
            .exec(&self.db)
            .await
            .context("conditional credit deduction")?;
        Ok(result.rows_affected == 1)
    }

    async fn refund(
        &self,
        user_id: Uuid,
        pool: CreditPool,
        cost: i32,
    ) -> Result<(), StudioServiceError> {
        let (_, used) = pool_columns(pool);
        credit_accounts::Entity::update_many()
            .col_expr(
                used,
                Expr::cust_with_exprs(
                    "GREATEST(? - ?, 0)",
                    [Expr::col(used).into(), Expr::val(cost).into()],
                ),
            )
            .col_expr(credit_accounts::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(credit_accounts::Column::UserId.eq(user_id))
            .exec(&self.db)
            .await
            .context("credit refund")?;
        Ok(())
    }

    async fn add_balance(&self, user_id: Uuid, amount: i32) -> Result<(), StudioServiceError> {
        let result = credit_accounts::Entity::update_many()
            .col_expr(
                credit_accounts::Column::CreditsBalance,
                Expr::col(credit_accounts::Column::CreditsBalance).add(amount),
            )
            .col_expr(credit_accounts::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(credit_accounts::Column::UserId.eq(user_id))
            .exec(&self.db)
            .await
            .context("add credits")?;
        if result.rows_affected == 0 {
            return Err(StudioServiceError::AccountNotFound);
        }
        Ok(())
    }

    async fn append_transaction(
        &self,
        tx: &CreditTransaction,
    ) -> Result<(), StudioServiceError> {
        credit_transactions::ActiveModel {
            id: Set(tx.id),
            user_id: Set(tx.user_id),
            amount: Set(tx.amount),
            tx_type: Set(tx.tx_type.as_str().to_owned()),
            action: Set(tx.action.map(|a| a.as_str().to_owned())),
            job_id: Set(tx.job_id.map(|j| j.0)),
            description: Set(tx.description.clone()),
            created_at: Set(tx.created_at),
        }
        .insert(&self.db)
        .await
        .context("append credit transaction")?;
        Ok(())
    }

    async fn list_transactions(
        &self,
        user_id: Uuid,
        page: PageRequest,
    ) -> Result<Vec<CreditTransaction>, StudioServiceError> {
        let page = page.clamped();
        let models = credit_transactions::Entity::find()
            .filter(credit_transactions::Column::UserId.eq(user_id))
            .order_by_desc(credit_transactions::Column::CreatedAt)
            .offset(page.offset())
            .limit(page.per_page as u64)
            .all(&self.db)
            .await
            .context("list credit transactions")?;
        models.into_iter().map(transaction_from_model).collect()
    }
}

fn account_from_model(model: credit_accounts::Model) -> CreditAccount {
    CreditAccount {
        user_id: model.user_id,
        image_credits: model.image_credits,
        image_credits_used: model.image_credits_used,
        video_credits: model.video_credits,
        video_credits_used: model.video_credits_used,
        credits_balance: model.credits_balance,
        credits_used: model.credits_used,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

fn transaction_from_model(
    model: credit_transactions::Model,
) -> Result<CreditTransaction, StudioServiceError> {
    let tx_type = match model.tx_type.as_str() {
        "usage" => TxType::Usage,
        "refund" => TxType::Refund,
        "purchase" => TxType::Purchase,
        other => {
            return Err(StudioServiceError::Internal(anyhow::anyhow!(
                "unknown tx_type: {other}"
            )));
        }
    };
    let action = model
        .action
        .as_deref()
        .map(str::parse)
        .transpose()
        .map_err(anyhow::Error::from)
        .context("action column")?;
    Ok(CreditTransaction {
        id: model.id,
        user_id: model.user_id,
        amount: model.amount,
        tx_type,
        action,
        job_id: model.job_id.map(JobId),
        description: model.description,
        created_at: model.created_at,
    })
}

// ── File repository ──────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbFileRepository {
    pub db: DatabaseConnection,
}

impl FileRepository for DbFileRepository {
    async fn create(&self, file: &FileRecord) -> Result<(), StudioServiceError> {
        files::ActiveModel {
            id: Set(file.id.0),
            user_id: Set(file.user_id),
            job_id: Set(file.job_id.map(|j| j.0)),
            origin: Set(file.origin.as_str().to_owned()),
            kind: Set(file.kind.as_str().to_owned()),
            storage_key: Set(file.storage_key.clone()),
            url: Set(file.url.clone()),
            size: Set(file.size),
            mime_type: Set(file.mime_type.clone()),
            deleted: Set(file.deleted),
            created_at: Set(file.created_at),
        }
        .insert(&self.db)
        .await
        .context("create file record")?;
        Ok(())
    }

    async fn list(
        &self,
        user_id: Uuid,
        page: PageRequest,
    ) -> Result<Vec<FileRecord>, StudioServiceError> {
        let page = page.clamped();
        let models = files::Entity::find()
            .filter(files::Column::UserId.eq(user_id))
            .filter(files::Column::Deleted.eq(false))
            .order_by_desc(files::Column::CreatedAt)
            .offset(page.offset())
            .limit(page.per_page as u64)
            .all(&self.db)
            .await
            .context("list files")?;
        models.into_iter().map(file_from_model).collect()
    }

    async fn soft_delete(&self, user_id: Uuid, id: FileId) -> Result<bool, StudioServiceError> {
        // Files are never hard-deleted; ownership is part of the predicate.
        let result = files::Entity::update_many()
            .col_expr(files::Column::Deleted, Expr::value(true))
            .filter(files::Column::Id.eq(id.0))
            .filter(files::Column::UserId.eq(user_id))
            .filter(files::Column::Deleted.eq(false))
            .exec(&self.db)
            .await
            .context("soft delete file")?;
        Ok(result.rows_affected == 1)
    }
}

fn file_from_model(model: files::Model) -> Result<FileRecord, StudioServiceError> {
    use crate::domain::types::FileOrigin;
    use lumeo_domain::media::MediaKind;

    let origin = match model.origin.as_str() {
        "upload" => FileOrigin::Upload,
        "generated" => FileOrigin::Generated,
        "edited" => FileOrigin::Edited,
        other => {
            return Err(StudioServiceError::Internal(anyhow::anyhow!(
                "unknown file origin: {other}"
            )));
        }
    };
    let kind = match model.kind.as_str() {
        "image" => MediaKind::Image,
        "video" => MediaKind::Video,
        other => {
            return Err(StudioServiceError::Internal(anyhow::anyhow!(
                "unknown file kind: {other}"
            )));
        }
    };
    Ok(FileRecord {
        id: FileId(model.id),
        user_id: model.user_id,
        job_id: model.job_id.map(JobId),
        origin,
        kind,
        storage_key: model.storage_key,
        url: model.url,
        size: model.size,
        mime_type: model.mime_type,
        deleted: model.deleted,
        created_at: model.created_at,
    })
}
