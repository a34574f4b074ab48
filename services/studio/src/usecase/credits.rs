//! Credit ledger operations.
//!
//! The deduction path never reads-then-writes a balance: `try_deduct` is a
//! single conditional update in the repository and its return value is the
//! admission verdict. Everything here composes around that primitive.

use uuid::Uuid;

use lumeo_domain::action::GenAction;
use lumeo_domain::id::JobId;
use lumeo_domain::pagination::PageRequest;

use crate::domain::repository::CreditLedgerRepository;
use crate::domain::types::{CreditAccount, CreditTransaction, TxType};
use crate::error::StudioServiceError;

/// Deduct `cost` for `action` and log a usage entry. Zero-cost actions are a
/// no-op. Returns [`StudioServiceError::InsufficientCredits`] when the pool
/// cannot cover the cost.
pub async fn charge<L: CreditLedgerRepository>(
    ledger: &L,
    user_id: Uuid,
    action: GenAction,
    job_id: JobId,
) -> Result<(), StudioServiceError> {
    let cost = action.cost();
    if cost == 0 {
        return Ok(());
    }
    if !ledger.try_deduct(user_id, action.pool(), cost).await? {
        return Err(StudioServiceError::InsufficientCredits);
    }
    let tx = CreditTransaction::new(
        user_id,
        -cost,
        TxType::Usage,
        Some(action),
        Some(job_id),
        format!("{action} ({cost} credits)"),
    );
    if let Err(e) = ledger.append_transaction(&tx).await {
        // The deduction already landed; put it back before surfacing.
        if let Err(refund_err) = ledger.refund(user_id, action.pool(), cost).await {
            tracing::error!(
                %user_id,
                %job_id,
                error = %refund_err,
                "could not return deduction after failed usage entry"
            );
        }
        return Err(e);
    }
    Ok(())
}

/// Return `cost` for a job that did not produce a result, and log a refund
/// entry. Zero-cost actions are a no-op.
pub async fn refund<L: CreditLedgerRepository>(
    ledger: &L,
    user_id: Uuid,
    action: GenAction,
    job_id: JobId,
) -> Result<(), StudioServiceError> {
    let cost = action.cost();
    if cost == 0 {
        return Ok(());
    }
    ledger.refund(user_id, action.pool(), cost).await?;
    let tx = CreditTransaction::new(
        user_id,
        cost,
        TxType::Refund,
        Some(action),
        Some(job_id),
        format!("refund for failed {action}"),
    );
    ledger.append_transaction(&tx).await?;
    Ok(())
}

pub struct GetBalanceUseCase<L: CreditLedgerRepository> {
    pub ledger: L,
}

impl<L: CreditLedgerRepository> GetBalanceUseCase<L> {
    pub async fn execute(&self, user_id: Uuid) -> Result<CreditAccount, StudioServiceError> {
        self.ledger
            .find_account(user_id)
            .await?
            .ok_or(StudioServiceError::AccountNotFound)
    }
}

pub struct ListTransactionsUseCase<L: CreditLedgerRepository> {
    pub ledger: L,
}

impl<L: CreditLedgerRepository> ListTransactionsUseCase<L> {
    pub async fn execute(
        &self,
        user_id: Uuid,
        page: PageRequest,
    ) -> Result<Vec<CreditTransaction>, StudioServiceError> {
        self.ledger.list_transactions(user_id, page).await
    }
}

pub struct AddCreditsUseCase<L: CreditLedgerRepository> {
    pub ledger: L,
}

impl<L: CreditLedgerRepository> AddCreditsUseCase<L> {
    /// Top up the legacy balance. Amount must be positive.
    pub async fn execute(&self, user_id: Uuid, amount: i32) -> Result<(), StudioServiceError> {
        if amount <= 0 {
            return Err(StudioServiceError::InvalidRequest(
                "top-up amount must be positive".into(),
            ));
        }
        self.ledger.add_balance(user_id, amount).await?;
        let tx = CreditTransaction::new(
            user_id,
            amount,
            TxType::Purchase,
            None,
            None,
            format!("top-up of {amount} credits"),
        );
        self.ledger.append_transaction(&tx).await?;
        Ok(())
    }
}
