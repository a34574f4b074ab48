use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Serialize;

use lumeo_core::identity::IdentityHeaders;
use lumeo_domain::id::{FileId, JobId};
use lumeo_domain::pagination::PageRequest;

use crate::domain::types::FileRecord;
use crate::error::StudioServiceError;
use crate::state::AppState;
use crate::usecase::files::{DeleteFileUseCase, ListFilesUseCase};

// ── Response types ───────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct FileResponse {
    pub id: FileId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_id: Option<JobId>,
    pub origin: String,
    pub kind: String,
    pub url: String,
    pub size: i64,
    pub mime_type: String,
    #[serde(serialize_with = "lumeo_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<FileRecord> for FileResponse {
    fn from(file: FileRecord) -> Self {
        Self {
            id: file.id,
            job_id: file.job_id,
            origin: file.origin.as_str().to_owned(),
            kind: file.kind.as_str().to_owned(),
            url: file.url,
            size: file.size,
            mime_type: file.mime_type,
            created_at: file.created_at,
        }
    }
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// `GET /files`
pub async fn list_files(
    State(state): State<AppState>,
    identity: IdentityHeaders,
    Query(page): Query<PageRequest>,
) -> Result<Json<Vec<FileResponse>>, StudioServiceError> {
    let uc = ListFilesUseCase {
        files: state.file_repo(),
    };
    let files = uc.execute(identity.user_id, page).await?;
    Ok(Json(files.into_iter().map(FileResponse::from).collect()))
}

/// `DELETE /files/{id}`
pub async fn delete_file(
    State(state): State<AppState>,
    identity: IdentityHeaders,
    Path(id): Path<FileId>,
) -> Result<StatusCode, StudioServiceError> {
    let uc = DeleteFileUseCase {
        files: state.file_repo(),
    };
    uc.execute(identity.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
