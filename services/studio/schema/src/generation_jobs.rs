use sea_orm::entity::prelude::*;

/// One generation request tracked from submission to completion.
///
/// `status` is one of `pending`, `processing`, `completed`, `failed`.
/// Terminal transitions go through conditional updates guarded on a
/// non-terminal current status; see `DbJobRepository`.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "generation_jobs")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub job_type: String,
    pub status: String,
    pub prompt: String,
    pub source_url: Option<String>,
    pub settings: Json,
    #[sea_orm(indexed)]
    pub provider_task_id: Option<String>,
    pub result_url: Option<String>,
    pub thumbnail_url: Option<String>,
    pub metadata: Json,
    pub credits_cost: i32,
    pub credits_charged: bool,
    pub error: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub started_at: Option<chrono::DateTime<chrono::Utc>>,
    pub completed_at: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::credit_accounts::Entity",
        from = "Column::UserId",
        to = "super::credit_accounts::Column::UserId"
    )]
    CreditAccount,
    #[sea_orm(has_many = "super::files::Entity")]
    Files,
}

impl Related<super::credit_accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CreditAccount.def()
    }
}

impl Related<super::files::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Files.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
