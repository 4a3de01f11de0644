use reqwest::StatusCode;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::models::ChatMessage;

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("Reqwest error: {0}")]
    Reqwest(#[from] reqwest::Error),
    #[error("AI chat function returned {status}: {body}")]
    Status { status: StatusCode, body: String },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RelayRequest {
    message_id: Uuid,
}

/// Calls the serverless function that answers a stored chat message with
/// an assistant reply and persists that reply.
#[derive(Debug, Clone)]
pub struct ChatRelay {
    http: reqwest::Client,
    functions_url: String,
}

impl ChatRelay {
    pub const FUNCTION_PATH: &'static str = "/functions/v1/openai-message-sender";

    pub fn new(http: reqwest::Client, functions_url: impl Into<String>) -> Self {
        Self {
            http,
            functions_url: functions_url.into(),
        }
    }

    pub async fn request_reply(
        &self,
        token: &str,
        message_id: Uuid,
    ) -> Result<ChatMessage, RelayError> {
        let response = self
            .http
            .post(format!("{}{}", self.functions_url, Self::FUNCTION_PATH))
            .bearer_auth(token)
            .json(&RelayRequest { message_id })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RelayError::Status { status, body });
        }

        Ok(response.json().await?)
    }
}
