//! HTTP API payloads exchanged between the server and its frontends.
//!
//! Everything here serializes as camelCase JSON because that is what the
//! web frontend expects.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{MessageId, Role, UserId};

/// A single persisted message, as exposed over the API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MessageDto {
    pub id: MessageId,
    pub sender_id: UserId,
    pub recipient_id: UserId,
    pub body: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

/// Directory data about a user, enough for a frontend to render a
/// conversation header or avatar.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserRef {
    pub id: UserId,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub profile_image_url: Option<String>,
    pub role: Role,
}

/// One entry in the conversation list: the peer, the most recent message
/// exchanged with them, and how many of their messages are still unread.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ConversationDto {
    pub other_user: UserRef,
    pub last_message: MessageDto,
    pub unread_count: u32,
}

/// Body of `POST /api/messages`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    pub recipient_id: UserId,
    pub body: String,
}

/// Body of `POST /api/users` -- identity provider sync.
///
/// The upsert preserves `createdAt` on existing records; everything else
/// is overwritten with what the provider sends.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertUserRequest {
    pub id: UserId,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub profile_image_url: Option<String>,
    #[serde(default)]
    pub role: Role,
}

/// Response of `GET /api/messages/unread/count`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnreadCountResponse {
    pub count: u64,
}

/// Response of `PUT /api/messages/{id}/read`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkReadResponse {
    pub marked: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn message_dto_serializes_camel_case() {
        let dto = MessageDto {
            id: MessageId::new(),
            sender_id: UserId::new(),
            recipient_id: UserId::new(),
            body: "hi".to_string(),
            is_read: false,
            created_at: Utc.with_ymd_and_hms(2025, 1, 15, 12, 0, 0).unwrap(),
        };

        let json = serde_json::to_value(&dto).unwrap();
        assert!(json.get("senderId").is_some());
        assert!(json.get("recipientId").is_some());
        assert!(json.get("isRead").is_some());
        assert!(json.get("createdAt").is_some());
    }

    #[test]
    fn upsert_request_defaults_role_to_creator() {
        let json = format!(r#"{{"id":"{}","email":"a@b.c"}}"#, UserId::new());
        let req: UpsertUserRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(req.role, Role::Creator);
    }
}
