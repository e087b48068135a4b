//! Thin JSON client for the Vitrine server API.

use serde::Deserialize;
use thiserror::Error;

use vitrine_shared::constants::IDENTITY_HEADER;
use vitrine_shared::protocol::{
    ConversationDto, MessageDto, SendMessageRequest, UnreadCountResponse,
};
use vitrine_shared::UserId;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with an error status and (usually) a JSON
    /// `{"error": ...}` body.
    #[error("Server returned {status}: {message}")]
    Api { status: u16, message: String },
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

/// API client bound to one server and one caller identity.
pub struct ApiClient {
    base_url: String,
    user_id: UserId,
    http: reqwest::Client,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, user_id: UserId) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            user_id,
            http: reqwest::Client::new(),
        }
    }

    pub async fn conversations(&self) -> Result<Vec<ConversationDto>, ClientError> {
        let resp = self
            .http
            .get(format!("{}/api/messages", self.base_url))
            .header(IDENTITY_HEADER, self.user_id.to_string())
            .send()
            .await?;
        Self::json(resp).await
    }

    pub async fn thread(&self, peer: UserId) -> Result<Vec<MessageDto>, ClientError> {
        let resp = self
            .http
            .get(format!(
                "{}/api/messages/conversation/{peer}",
                self.base_url
            ))
            .header(IDENTITY_HEADER, self.user_id.to_string())
            .send()
            .await?;
        Self::json(resp).await
    }

    pub async fn send(&self, peer: UserId, body: &str) -> Result<MessageDto, ClientError> {
        let resp = self
            .http
            .post(format!("{}/api/messages", self.base_url))
            .header(IDENTITY_HEADER, self.user_id.to_string())
            .json(&SendMessageRequest {
                recipient_id: peer,
                body: body.to_string(),
            })
            .send()
            .await?;
        Self::json(resp).await
    }

    pub async fn unread_count(&self) -> Result<u64, ClientError> {
        let resp = self
            .http
            .get(format!("{}/api/messages/unread/count", self.base_url))
            .header(IDENTITY_HEADER, self.user_id.to_string())
            .send()
            .await?;
        let body: UnreadCountResponse = Self::json(resp).await?;
        Ok(body.count)
    }

    async fn json<T: serde::de::DeserializeOwned>(
        resp: reqwest::Response,
    ) -> Result<T, ClientError> {
        let status = resp.status();
        if status.is_success() {
            Ok(resp.json().await?)
        } else {
            let message = match resp.json::<ErrorBody>().await {
                Ok(body) => body.error,
                Err(_) => status.canonical_reason().unwrap_or("unknown").to_string(),
            };
            Err(ClientError::Api {
                status: status.as_u16(),
                message,
            })
        }
    }
}
