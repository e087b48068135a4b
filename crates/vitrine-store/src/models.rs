//! Domain model structs persisted in the SQLite database.
//!
//! Every struct derives `Serialize` and `Deserialize` so it can be handed
//! directly to the API layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use vitrine_shared::{MessageId, Role, UserId};

// ---------------------------------------------------------------------------
// User
// ---------------------------------------------------------------------------

/// A directory record for a known user.
///
/// The identity provider is the source of truth; records land here via
/// upsert so the messaging layer can validate participants and decorate
/// conversations without calling out.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    /// Identifier assigned by the identity provider.
    pub id: UserId,
    /// Optional unique email address.
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    /// URL of the avatar image, if the provider supplied one.
    pub profile_image_url: Option<String>,
    /// Capability tag; the messaging contract treats both roles alike.
    pub role: Role,
    /// When this record was first created locally.
    pub created_at: DateTime<Utc>,
    /// When this record was last overwritten by an upsert.
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Message
// ---------------------------------------------------------------------------

/// A single direct message.  Messages are append-only: there is no edit or
/// delete operation anywhere in the subsystem.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    /// Unique message identifier, assigned at creation.
    pub id: MessageId,
    pub sender_id: UserId,
    pub recipient_id: UserId,
    /// Non-empty text payload (whitespace-trimmed at creation).
    pub body: String,
    /// Read flag.  Transitions `false -> true` exactly once and never
    /// reverts; only the recipient may flip it.
    pub is_read: bool,
    /// Creation timestamp, the sole ordering key for transcripts.
    pub created_at: DateTime<Utc>,
}
