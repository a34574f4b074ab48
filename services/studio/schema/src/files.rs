use sea_orm::entity::prelude::*;

/// A durably stored artifact. Soft-deleted via the `deleted` flag, never
/// removed from the table.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "files")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(indexed)]
    pub user_id: Uuid,
    pub job_id: Option<Uuid>,
    /// `upload`, `generated`, or `edited`.
    pub origin: String,
    /// `image` or `video`.
    pub kind: String,
    pub storage_key: String,
    pub url: String,
    pub size: i64,
    pub mime_type: String,
    pub deleted: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::generation_jobs::Entity",
        from = "Column::JobId",
        to = "super::generation_jobs::Column::Id"
    )]
    GenerationJob,
}

impl Related<super::generation_jobs::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::GenerationJob.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
