use thiserror::Error;

use vitrine_shared::constants::MAX_BODY_BYTES;
use vitrine_shared::UserId;

/// Errors produced by the store layer.
#[derive(Error, Debug)]
pub enum StoreError {
    /// SQLite error.
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Failed to determine a platform data directory.
    #[error("Could not determine application data directory")]
    NoDataDir,

    /// Generic I/O error (e.g. creating the database directory).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A query expected exactly one row but found none.
    #[error("Record not found")]
    NotFound,

    /// Migration failure.
    #[error("Migration error: {0}")]
    Migration(String),

    /// Message body was empty or whitespace-only.
    #[error("Message body is empty")]
    EmptyBody,

    /// Message body exceeded the shared size limit.
    #[error("Message body exceeds {} bytes", MAX_BODY_BYTES)]
    BodyTooLarge,

    /// Sender and recipient are the same user.
    #[error("Cannot send a message to yourself")]
    SelfMessage,

    /// A referenced user is missing from the directory.
    #[error("Unknown user: {0}")]
    UnknownUser(UserId),

    /// Someone other than the recipient tried to mark a message read.
    #[error("Only the recipient may mark a message read")]
    NotRecipient,

    /// UUID parsing error.
    #[error("UUID error: {0}")]
    Uuid(#[from] uuid::Error),

    /// Chrono parsing error.
    #[error("Timestamp parse error: {0}")]
    ChronoParse(#[from] chrono::ParseError),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, StoreError>;
