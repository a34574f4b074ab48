//! HTTP client for the blob storage service.

use anyhow::{Context as _, anyhow};
use bytes::Bytes;
use serde::Deserialize;

use crate::domain::repository::BlobStoragePort;
use crate::error::StudioServiceError;

#[derive(Clone)]
pub struct HttpBlobStorage {
    http: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    url: String,
}

impl HttpBlobStorage {
    pub fn new(base_url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_owned(),
        }
    }
}

impl BlobStoragePort for HttpBlobStorage {
    async fn download(&self, url: &str) -> Result<Bytes, StudioServiceError> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .context("download artifact")?;
        let status = response.status();
        if !status.is_success() {
            return Err(StudioServiceError::Internal(anyhow!(
                "artifact download returned {status}"
            )));
        }
        let body = response.bytes().await.context("read artifact body")?;
        Ok(body)
    }

    async fn upload(
        &self,
        key: &str,
        content_type: &str,
        body: Bytes,
    ) -> Result<String, StudioServiceError> {
        let response = self
            .http
            .put(format!("{}/objects/{key}", self.base_url))
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(body)
            .send()
            .await
            .context("upload artifact")?;
        let status = response.status();
        if !status.is_success() {
            return Err(StudioServiceError::Internal(anyhow!(
                "artifact upload returned {status}"
            )));
        }
        let parsed: UploadResponse = response.json().await.context("parse upload response")?;
        Ok(parsed.url)
    }

    async fn delete(&self, key: &str) -> Result<(), StudioServiceError> {
        let response = self
            .http
            .delete(format!("{}/objects/{key}", self.base_url))
            .send()
            .await
            .context("delete artifact")?;
        let status = response.status();
        // Already gone is fine; the goal is absence.
        if !status.is_success() && status != reqwest::StatusCode::NOT_FOUND {
            return Err(StudioServiceError::Internal(anyhow!(
                "artifact delete returned {status}"
            )));
        }
        Ok(())
    }
}
