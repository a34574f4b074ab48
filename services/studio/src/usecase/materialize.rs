//! Copying provider results into durable storage.
//!
//! Provider result URLs are time-limited; a job is only `completed` once its
//! artifact lives under our own storage and the stored URL is permanent.

use uuid::Uuid;

use crate::domain::repository::BlobStoragePort;
use crate::domain::types::Job;
use crate::error::StudioServiceError;

#[derive(Debug, Clone)]
pub struct MaterializedArtifact {
    pub url: String,
    pub storage_key: String,
    pub size: i64,
}

#[derive(Clone)]
pub struct MaterializeArtifactUseCase<B: BlobStoragePort> {
    pub storage: B,
}

impl<B: BlobStoragePort> MaterializeArtifactUseCase<B> {
    /// Download the provider's artifact and re-upload it under a key owned
    /// by the job's user.
    pub async fn execute(
        &self,
        job: &Job,
        source_url: &str,
    ) -> Result<MaterializedArtifact, StudioServiceError> {
        let kind = job.media_kind();
        let storage_key = format!(
            "{}/{}/{}.{}",
            job.user_id,
            job.action,
            Uuid::new_v4(),
            kind.extension()
        );
        let body = self.storage.download(source_url).await?;
        let size = body.len() as i64;
        let url = self.storage.upload(&storage_key, kind.mime_type(), body).await?;
        Ok(MaterializedArtifact {
            url,
            storage_key,
            size,
        })
    }

    /// Drop an artifact that will never be referenced, keeping storage free
    /// of orphans when a settlement loses the terminal race.
    pub async fn discard(&self, storage_key: &str) -> Result<(), StudioServiceError> {
        self.storage.delete(storage_key).await
    }
}
