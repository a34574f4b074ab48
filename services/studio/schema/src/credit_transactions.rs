use sea_orm::entity::prelude::*;

/// Append-only ledger entry. Rows are inserted and read, never updated or
/// deleted; the signed `amount` sum per user reconciles with the account's
/// `*_used` counters.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "credit_transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(indexed)]
    pub user_id: Uuid,
    pub amount: i32,
    /// `usage`, `refund`, or `purchase`.
    pub tx_type: String,
    /// Absent for purchases, which are not caused by a metered action.
    pub action: Option<String>,
    pub job_id: Option<Uuid>,
    pub description: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::credit_accounts::Entity",
        from = "Column::UserId",
        to = "super::credit_accounts::Column::UserId"
    )]
    CreditAccount,
}

impl Related<super::credit_accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CreditAccount.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
