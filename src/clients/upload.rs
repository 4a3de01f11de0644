use reqwest::{
    StatusCode,
    multipart::{Form, Part},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Reqwest error: {0}")]
    Reqwest(#[from] reqwest::Error),
    #[error("upload service returned {status}: {body}")]
    Status { status: StatusCode, body: String },
    #[error("no files to upload")]
    Empty,
}

/// A file received from a client, ready to be forwarded.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UploadedFileInfo {
    pub file: String,
    pub url: String,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    files: Vec<UploadedFileInfo>,
}

/// Client for the object-storage upload service (`POST /uploads`).
#[derive(Debug, Clone)]
pub struct UploadClient {
    http: reqwest::Client,
    base_url: String,
}

impl UploadClient {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Send `files` to the service under `save_dir`. The service may return
    /// fewer entries than were sent when some files fail.
    pub async fn upload(
        &self,
        token: &str,
        files: Vec<UploadFile>,
        save_dir: &str,
    ) -> Result<Vec<UploadedFileInfo>, UploadError> {
        if files.is_empty() {
            return Err(UploadError::Empty);
        }

        let mut form = Form::new();
        for file in files {
            let mut part = Part::bytes(file.bytes).file_name(file.file_name);
            if let Some(content_type) = file.content_type.as_deref() {
                part = part.mime_str(content_type)?;
            }
            form = form.part("files", part);
        }
        form = form.text("saveDir", save_dir.to_string());

        let response = self
            .http
            .post(format!("{}/uploads", self.base_url))
            .bearer_auth(token)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(UploadError::Status { status, body });
        }

        let parsed: UploadResponse = response.json().await?;
        Ok(parsed.files)
    }
}
