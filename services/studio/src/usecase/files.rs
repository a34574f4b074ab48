use uuid::Uuid;

use lumeo_domain::id::FileId;
use lumeo_domain::pagination::PageRequest;

use crate::domain::repository::FileRepository;
use crate::domain::types::FileRecord;
use crate::error::StudioServiceError;

pub struct ListFilesUseCase<F: FileRepository> {
    pub files: F,
}

impl<F: FileRepository> ListFilesUseCase<F> {
    pub async fn execute(
        &self,
        user_id: Uuid,
        page: PageRequest,
    ) -> Result<Vec<FileRecord>, StudioServiceError> {
        self.files.list(user_id, page).await
    }
}

pub struct DeleteFileUseCase<F: FileRepository> {
    pub files: F,
}

impl<F: FileRepository> DeleteFileUseCase<F> {
    /// Soft delete. Someone else's file and a missing file are the same
    /// answer on purpose.
    pub async fn execute(&self, user_id: Uuid, id: FileId) -> Result<(), StudioServiceError> {
        if !self.files.soft_delete(user_id, id).await? {
            return Err(StudioServiceError::FileNotFound);
        }
        Ok(())
    }
}
