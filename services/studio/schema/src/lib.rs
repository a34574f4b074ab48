//! Sea-orm entities for the studio service.

pub mod credit_accounts;
pub mod credit_transactions;
pub mod files;
pub mod generation_jobs;
