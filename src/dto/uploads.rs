use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{clients::upload::UploadedFileInfo, models::UploadRecord};

#[derive(Debug, Serialize, ToSchema)]
pub struct UploadFilesResponse {
    pub files: Vec<UploadedFileInfo>,
    pub records: Vec<UploadRecord>,
    /// Files sent but not returned by the upload service.
    pub missing: usize,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct PruneRequest {
    #[serde(rename = "ref")]
    pub reference: String,
    pub keep_urls: Vec<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PruneResult {
    pub deleted: u64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UploadRecordList {
    pub items: Vec<UploadRecord>,
}
