use sea_orm::entity::prelude::*;

/// Per-user credit ledger state: two metered pools (image, video) plus the
/// legacy single balance for unmetered actions.
///
/// The `*_used <= *_credits` invariant is enforced exclusively by conditional
/// updates in the repository layer, never by read-then-write.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "credit_accounts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: Uuid,
    pub image_credits: i32,
    pub image_credits_used: i32,
    pub video_credits: i32,
    pub video_credits_used: i32,
    pub credits_balance: i32,
    pub credits_used: i32,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::credit_transactions::Entity")]
    CreditTransactions,
    #[sea_orm(has_many = "super::generation_jobs::Entity")]
    GenerationJobs,
}

impl Related<super::credit_transactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CreditTransactions.def()
    }
}

impl Related<super::generation_jobs::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::GenerationJobs.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
