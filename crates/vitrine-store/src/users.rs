//! Directory operations for [`User`] records.
//!
//! The identity provider owns these records; the store only mirrors them.

use chrono::{DateTime, Utc};
use rusqlite::params;

use vitrine_shared::{Role, UserId};

use crate::database::Database;
use crate::error::{Result, StoreError};
use crate::models::User;

impl Database {
    /// Insert or update a directory record.
    ///
    /// On conflict the existing `created_at` is preserved and everything
    /// else is overwritten.  Returns the stored row.
    pub fn upsert_user(&self, user: &User) -> Result<User> {
        self.conn().execute(
            "INSERT INTO users (id, email, first_name, last_name, profile_image_url, role, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
             ON CONFLICT(id) DO UPDATE SET
                 email             = excluded.email,
                 first_name        = excluded.first_name,
                 last_name         = excluded.last_name,
                 profile_image_url = excluded.profile_image_url,
                 role              = excluded.role,
                 updated_at        = excluded.updated_at",
            params![
                user.id.to_string(),
                user.email,
                user.first_name,
                user.last_name,
                user.profile_image_url,
                user.role.as_str(),
                user.created_at.to_rfc3339(),
                user.updated_at.to_rfc3339(),
            ],
        )?;

        self.get_user(user.id)
    }

    /// Fetch a single directory record.
    pub fn get_user(&self, id: UserId) -> Result<User> {
        self.conn()
            .query_row(
                "SELECT id, email, first_name, last_name, profile_image_url, role, created_at, updated_at
                 FROM users
                 WHERE id = ?1",
                params![id.to_string()],
                row_to_user,
            )
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => StoreError::NotFound,
                other => StoreError::Sqlite(other),
            })
    }

    /// Cheap existence check used to validate message participants.
    pub fn user_exists(&self, id: UserId) -> Result<bool> {
        let exists: bool = self.conn().query_row(
            "SELECT EXISTS(SELECT 1 FROM users WHERE id = ?1)",
            params![id.to_string()],
            |row| row.get(0),
        )?;
        Ok(exists)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Map a `rusqlite::Row` to a [`User`].
fn row_to_user(row: &rusqlite::Row<'_>) -> rusqlite::Result<User> {
    let id_str: String = row.get(0)?;
    let email: Option<String> = row.get(1)?;
    let first_name: Option<String> = row.get(2)?;
    let last_name: Option<String> = row.get(3)?;
    let profile_image_url: Option<String> = row.get(4)?;
    let role_str: String = row.get(5)?;
    let created_str: String = row.get(6)?;
    let updated_str: String = row.get(7)?;

    let id = UserId::parse(&id_str).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
    })?;

    let role: Role = role_str.parse().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(5, rusqlite::types::Type::Text, Box::new(e))
    })?;

    let created_at: DateTime<Utc> = DateTime::parse_from_rfc3339(&created_str)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(6, rusqlite::types::Type::Text, Box::new(e))
        })?;

    let updated_at: DateTime<Utc> = DateTime::parse_from_rfc3339(&updated_str)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(7, rusqlite::types::Type::Text, Box::new(e))
        })?;

    Ok(User {
        id,
        email,
        first_name,
        last_name,
        profile_image_url,
        role,
        created_at,
        updated_at,
    })
}
