//! Operations on the append-only message log.
//!
//! This module is the single source of truth for read state: the
//! `is_read` flag only ever moves `false -> true`, and only
//! [`Database::mark_message_read`] moves it.

use chrono::{DateTime, Utc};
use rusqlite::params;

use vitrine_shared::constants::MAX_BODY_BYTES;
use vitrine_shared::{MessageId, UserId};

use crate::database::Database;
use crate::error::{Result, StoreError};
use crate::models::Message;

impl Database {
    /// Validate and persist a new message.
    ///
    /// The body is whitespace-trimmed before storage; an empty or
    /// oversized body, a self-message, or an unknown participant is
    /// rejected without touching the log.
    pub fn send_message(
        &self,
        sender_id: UserId,
        recipient_id: UserId,
        body: &str,
    ) -> Result<Message> {
        let body = body.trim();
        if body.is_empty() {
            return Err(StoreError::EmptyBody);
        }
        if body.len() > MAX_BODY_BYTES {
            return Err(StoreError::BodyTooLarge);
        }
        if sender_id == recipient_id {
            return Err(StoreError::SelfMessage);
        }
        if !self.user_exists(sender_id)? {
            return Err(StoreError::UnknownUser(sender_id));
        }
        if !self.user_exists(recipient_id)? {
            return Err(StoreError::UnknownUser(recipient_id));
        }

        let message = Message {
            id: MessageId::new(),
            sender_id,
            recipient_id,
            body: body.to_string(),
            is_read: false,
            created_at: Utc::now(),
        };

        let (pair_lo, pair_hi) = pair_key(sender_id, recipient_id);

        self.conn().execute(
            "INSERT INTO messages (id, sender_id, recipient_id, body, is_read, created_at, pair_lo, pair_hi)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                message.id.to_string(),
                message.sender_id.to_string(),
                message.recipient_id.to_string(),
                message.body,
                message.is_read as i32,
                message.created_at.to_rfc3339(),
                pair_lo,
                pair_hi,
            ],
        )?;

        tracing::debug!(
            id = %message.id,
            sender = %sender_id,
            recipient = %recipient_id,
            "message persisted"
        );

        Ok(message)
    }

    /// Every message where the user is sender or recipient, newest first.
    ///
    /// The conversation aggregator does not depend on this ordering; it is
    /// only a convenience for callers rendering a raw inbox.
    pub fn list_messages_for_user(&self, user_id: UserId) -> Result<Vec<Message>> {
        let mut stmt = self.conn().prepare(
            "SELECT id, sender_id, recipient_id, body, is_read, created_at
             FROM messages
             WHERE sender_id = ?1 OR recipient_id = ?1
             ORDER BY created_at DESC, id DESC",
        )?;

        let rows = stmt.query_map(params![user_id.to_string()], row_to_message)?;

        let mut messages = Vec::new();
        for row in rows {
            messages.push(row?);
        }
        Ok(messages)
    }

    /// The full transcript between an unordered pair of users, oldest
    /// first.  Timestamp ties are broken by `id` so repeated reads return
    /// the same order.
    pub fn list_conversation(&self, user_a: UserId, user_b: UserId) -> Result<Vec<Message>> {
        let (pair_lo, pair_hi) = pair_key(user_a, user_b);

        let mut stmt = self.conn().prepare(
            "SELECT id, sender_id, recipient_id, body, is_read, created_at
             FROM messages
             WHERE pair_lo = ?1 AND pair_hi = ?2
             ORDER BY created_at ASC, id ASC",
        )?;

        let rows = stmt.query_map(params![pair_lo, pair_hi], row_to_message)?;

        let mut messages = Vec::new();
        for row in rows {
            messages.push(row?);
        }
        Ok(messages)
    }

    /// Transition a message to read.
    ///
    /// Only the recipient may do this.  Marking an already-read message is
    /// a no-op, so concurrent calls are safe to race.
    pub fn mark_message_read(&self, message_id: MessageId, acting_user: UserId) -> Result<()> {
        let (recipient_str, is_read): (String, bool) = self
            .conn()
            .query_row(
                "SELECT recipient_id, is_read FROM messages WHERE id = ?1",
                params![message_id.to_string()],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => StoreError::NotFound,
                other => StoreError::Sqlite(other),
            })?;

        if recipient_str != acting_user.to_string() {
            return Err(StoreError::NotRecipient);
        }

        if is_read {
            return Ok(());
        }

        self.conn().execute(
            "UPDATE messages SET is_read = 1 WHERE id = ?1",
            params![message_id.to_string()],
        )?;

        Ok(())
    }

    /// Count of unread messages addressed to the user, across all peers.
    pub fn count_unread(&self, user_id: UserId) -> Result<u64> {
        let count: i64 = self.conn().query_row(
            "SELECT COUNT(*) FROM messages WHERE recipient_id = ?1 AND is_read = 0",
            params![user_id.to_string()],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Canonical key for an unordered pair of participants.
fn pair_key(a: UserId, b: UserId) -> (String, String) {
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    (lo.to_string(), hi.to_string())
}

/// Map a `rusqlite::Row` to a [`Message`].
fn row_to_message(row: &rusqlite::Row<'_>) -> rusqlite::Result<Message> {
    let id_str: String = row.get(0)?;
    let sender_str: String = row.get(1)?;
    let recipient_str: String = row.get(2)?;
    let body: String = row.get(3)?;
    let is_read: bool = row.get(4)?;
    let created_str: String = row.get(5)?;

    let id = MessageId::parse(&id_str).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
    })?;
    let sender_id = UserId::parse(&sender_str).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(1, rusqlite::types::Type::Text, Box::new(e))
    })?;
    let recipient_id = UserId::parse(&recipient_str).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(2, rusqlite::types::Type::Text, Box::new(e))
    })?;

    let created_at: DateTime<Utc> = DateTime::parse_from_rfc3339(&created_str)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(5, rusqlite::types::Type::Text, Box::new(e))
        })?;

    Ok(Message {
        id,
        sender_id,
        recipient_id,
        body,
        is_read,
        created_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use vitrine_shared::Role;

    use crate::models::User;

    fn test_db() -> (tempfile::TempDir, Database) {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open_at(&dir.path().join("test.db")).unwrap();
        (dir, db)
    }

    fn add_user(db: &Database) -> UserId {
        let now = Utc::now();
        let user = User {
            id: UserId::new(),
            email: None,
            first_name: None,
            last_name: None,
            profile_image_url: None,
            role: Role::Creator,
            created_at: now,
            updated_at: now,
        };
        db.upsert_user(&user).unwrap();
        user.id
    }

    /// Pin a message's timestamp so ordering assertions are deterministic.
    fn set_created_at(db: &Database, id: MessageId, secs: u32) {
        let ts = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, secs).unwrap();
        db.conn()
            .execute(
                "UPDATE messages SET created_at = ?1 WHERE id = ?2",
                params![ts.to_rfc3339(), id.to_string()],
            )
            .unwrap();
    }

    #[test]
    fn send_and_list_conversation_ascending() {
        let (_dir, db) = test_db();
        let a = add_user(&db);
        let b = add_user(&db);

        let m1 = db.send_message(a, b, "hi").unwrap();
        let m2 = db.send_message(b, a, "hello").unwrap();
        let m3 = db.send_message(a, b, "how are you").unwrap();
        set_created_at(&db, m1.id, 1);
        set_created_at(&db, m2.id, 2);
        set_created_at(&db, m3.id, 3);

        let transcript = db.list_conversation(a, b).unwrap();
        let bodies: Vec<&str> = transcript.iter().map(|m| m.body.as_str()).collect();
        assert_eq!(bodies, ["hi", "hello", "how are you"]);

        // Same transcript regardless of argument order.
        assert_eq!(db.list_conversation(b, a).unwrap(), transcript);
    }

    #[test]
    fn conversation_excludes_other_pairs() {
        let (_dir, db) = test_db();
        let a = add_user(&db);
        let b = add_user(&db);
        let c = add_user(&db);

        db.send_message(a, b, "to b").unwrap();
        db.send_message(a, c, "to c").unwrap();
        db.send_message(c, b, "c to b").unwrap();

        let ab = db.list_conversation(a, b).unwrap();
        assert_eq!(ab.len(), 1);
        assert_eq!(ab[0].body, "to b");
    }

    #[test]
    fn send_rejects_empty_body() {
        let (_dir, db) = test_db();
        let a = add_user(&db);
        let b = add_user(&db);

        assert!(matches!(
            db.send_message(a, b, ""),
            Err(StoreError::EmptyBody)
        ));
        assert!(matches!(
            db.send_message(a, b, "   \n\t "),
            Err(StoreError::EmptyBody)
        ));

        // Nothing persisted.
        assert!(db.list_conversation(a, b).unwrap().is_empty());
    }

    #[test]
    fn send_rejects_oversized_body() {
        let (_dir, db) = test_db();
        let a = add_user(&db);
        let b = add_user(&db);

        let big = "x".repeat(MAX_BODY_BYTES + 1);
        assert!(matches!(
            db.send_message(a, b, &big),
            Err(StoreError::BodyTooLarge)
        ));
    }

    #[test]
    fn send_rejects_unknown_participants() {
        let (_dir, db) = test_db();
        let a = add_user(&db);
        let ghost = UserId::new();

        assert!(matches!(
            db.send_message(a, ghost, "hi"),
            Err(StoreError::UnknownUser(id)) if id == ghost
        ));
        assert!(matches!(
            db.send_message(ghost, a, "hi"),
            Err(StoreError::UnknownUser(id)) if id == ghost
        ));
    }

    #[test]
    fn send_rejects_self_message() {
        let (_dir, db) = test_db();
        let a = add_user(&db);

        assert!(matches!(
            db.send_message(a, a, "note to self"),
            Err(StoreError::SelfMessage)
        ));
    }

    #[test]
    fn send_trims_body() {
        let (_dir, db) = test_db();
        let a = add_user(&db);
        let b = add_user(&db);

        let m = db.send_message(a, b, "  hi there \n").unwrap();
        assert_eq!(m.body, "hi there");
        assert_eq!(db.list_conversation(a, b).unwrap()[0].body, "hi there");
    }

    #[test]
    fn mark_read_is_recipient_only_and_idempotent() {
        let (_dir, db) = test_db();
        let a = add_user(&db);
        let b = add_user(&db);

        let m = db.send_message(a, b, "hi").unwrap();
        assert!(!m.is_read);

        // The sender may not mark their own message read.
        assert!(matches!(
            db.mark_message_read(m.id, a),
            Err(StoreError::NotRecipient)
        ));
        assert_eq!(db.count_unread(b).unwrap(), 1);

        db.mark_message_read(m.id, b).unwrap();
        assert_eq!(db.count_unread(b).unwrap(), 0);

        // Second call is a no-op, not an error.
        db.mark_message_read(m.id, b).unwrap();
        assert_eq!(db.count_unread(b).unwrap(), 0);
        assert!(db.list_conversation(a, b).unwrap()[0].is_read);
    }

    #[test]
    fn mark_read_unknown_message_is_not_found() {
        let (_dir, db) = test_db();
        let a = add_user(&db);

        assert!(matches!(
            db.mark_message_read(MessageId::new(), a),
            Err(StoreError::NotFound)
        ));
    }

    #[test]
    fn count_unread_spans_all_peers() {
        let (_dir, db) = test_db();
        let a = add_user(&db);
        let b = add_user(&db);
        let c = add_user(&db);

        db.send_message(a, c, "one").unwrap();
        db.send_message(b, c, "two").unwrap();
        let read_one = db.send_message(a, c, "three").unwrap();
        db.mark_message_read(read_one.id, c).unwrap();

        assert_eq!(db.count_unread(c).unwrap(), 2);
        assert_eq!(db.count_unread(a).unwrap(), 0);
    }

    #[test]
    fn fresh_user_has_empty_history() {
        let (_dir, db) = test_db();
        let a = add_user(&db);

        assert!(db.list_messages_for_user(a).unwrap().is_empty());
        assert_eq!(db.count_unread(a).unwrap(), 0);
    }

    #[test]
    fn list_for_user_covers_both_directions() {
        let (_dir, db) = test_db();
        let a = add_user(&db);
        let b = add_user(&db);
        let c = add_user(&db);

        db.send_message(a, b, "out").unwrap();
        db.send_message(c, a, "in").unwrap();
        db.send_message(b, c, "unrelated").unwrap();

        let msgs = db.list_messages_for_user(a).unwrap();
        assert_eq!(msgs.len(), 2);
        assert!(msgs.iter().all(|m| m.sender_id == a || m.recipient_id == a));
    }

    #[test]
    fn equal_timestamps_read_back_stably() {
        let (_dir, db) = test_db();
        let a = add_user(&db);
        let b = add_user(&db);

        let m1 = db.send_message(a, b, "first").unwrap();
        let m2 = db.send_message(b, a, "second").unwrap();
        set_created_at(&db, m1.id, 10);
        set_created_at(&db, m2.id, 10);

        let first = db.list_conversation(a, b).unwrap();
        let second = db.list_conversation(a, b).unwrap();
        assert_eq!(first, second);
    }
}
