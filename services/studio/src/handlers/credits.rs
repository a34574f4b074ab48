use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use lumeo_core::identity::IdentityHeaders;
use lumeo_domain::id::JobId;
use lumeo_domain::pagination::PageRequest;

use crate::domain::types::{CreditAccount, CreditTransaction};
use crate::error::StudioServiceError;
use crate::state::AppState;
use crate::usecase::credits::{AddCreditsUseCase, GetBalanceUseCase, ListTransactionsUseCase};

// ── Response types ───────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct PoolBalance {
    pub total: i32,
    pub used: i32,
    pub remaining: i32,
}

#[derive(Serialize)]
pub struct BalanceResponse {
    pub image: PoolBalance,
    pub video: PoolBalance,
    pub legacy: PoolBalance,
}

impl From<CreditAccount> for BalanceResponse {
    fn from(account: CreditAccount) -> Self {
        Self {
            image: PoolBalance {
                total: account.image_credits,
                used: account.image_credits_used,
                remaining: account.image_remaining(),
            },
            video: PoolBalance {
                total: account.video_credits,
                used: account.video_credits_used,
                remaining: account.video_remaining(),
            },
            legacy: PoolBalance {
                total: account.credits_balance,
                used: account.credits_used,
                remaining: account.legacy_remaining(),
            },
        }
    }
}

#[derive(Serialize)]
pub struct TransactionResponse {
    pub id: Uuid,
    pub amount: i32,
    #[serde(rename = "type")]
    pub tx_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_id: Option<JobId>,
    pub description: String,
    #[serde(serialize_with = "lumeo_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<CreditTransaction> for TransactionResponse {
    fn from(tx: CreditTransaction) -> Self {
        Self {
            id: tx.id,
            amount: tx.amount,
            tx_type: tx.tx_type.as_str().to_owned(),
            action: tx.action.map(|a| a.as_str().to_owned()),
            job_id: tx.job_id,
            description: tx.description,
            created_at: tx.created_at,
        }
    }
}

#[derive(Deserialize)]
pub struct TopupRequest {
    pub user_id: Uuid,
    pub amount: i32,
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// `GET /credits`
pub async fn get_balance(
    State(state): State<AppState>,
    identity: IdentityHeaders,
) -> Result<Json<BalanceResponse>, StudioServiceError> {
    let uc = GetBalanceUseCase {
        ledger: state.ledger_repo(),
    };
    let account = uc.execute(identity.user_id).await?;
    Ok(Json(account.into()))
}

/// `GET /credits/transactions`
pub async fn list_transactions(
    State(state): State<AppState>,
    identity: IdentityHeaders,
    Query(page): Query<PageRequest>,
) -> Result<Json<Vec<TransactionResponse>>, StudioServiceError> {
    let uc = ListTransactionsUseCase {
        ledger: state.ledger_repo(),
    };
    let txs = uc.execute(identity.user_id, page).await?;
    Ok(Json(txs.into_iter().map(TransactionResponse::from).collect()))
}

/// `POST /credits/topup` — admin only.
pub async fn topup(
    State(state): State<AppState>,
    identity: IdentityHeaders,
    Json(request): Json<TopupRequest>,
) -> Result<StatusCode, StudioServiceError> {
    if identity.role < 1 {
        return Err(StudioServiceError::Forbidden);
    }
    let uc = AddCreditsUseCase {
        ledger: state.ledger_repo(),
    };
    uc.execute(request.user_id, request.amount).await?;
    Ok(StatusCode::NO_CONTENT)
}
