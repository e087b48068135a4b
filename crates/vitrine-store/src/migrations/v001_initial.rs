//! v001 -- Initial schema creation.
//!
//! Creates the two core tables: `users` (directory records synced from the
//! identity provider) and `messages` (the append-only message log).
//!
//! `messages` carries the derived `pair_lo` / `pair_hi` columns so the
//! unordered participant pair is a real compound index rather than an OR
//! over two join conditions.

use rusqlite::Connection;

/// SQL executed when upgrading from version 0 to version 1.
const UP_SQL: &str = r#"
-- ----------------------------------------------------------------
-- Users (directory records, owned by the identity provider)
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS users (
    id                TEXT PRIMARY KEY NOT NULL,  -- UUID
    email             TEXT UNIQUE,
    first_name        TEXT,
    last_name         TEXT,
    profile_image_url TEXT,
    role              TEXT NOT NULL DEFAULT 'creator',
    created_at        TEXT NOT NULL,              -- ISO-8601 / RFC-3339
    updated_at        TEXT NOT NULL
);

-- ----------------------------------------------------------------
-- Messages (append-only; no edit or delete path exists)
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS messages (
    id           TEXT PRIMARY KEY NOT NULL,       -- UUID v4
    sender_id    TEXT NOT NULL,                   -- FK -> users(id)
    recipient_id TEXT NOT NULL,                   -- FK -> users(id)
    body         TEXT NOT NULL,
    is_read      INTEGER NOT NULL DEFAULT 0,      -- boolean 0/1
    created_at   TEXT NOT NULL,                   -- ISO-8601
    pair_lo      TEXT NOT NULL,                   -- min(sender_id, recipient_id)
    pair_hi      TEXT NOT NULL,                   -- max(sender_id, recipient_id)

    FOREIGN KEY (sender_id)    REFERENCES users(id),
    FOREIGN KEY (recipient_id) REFERENCES users(id)
);

-- Access path: "all messages involving a participant".
CREATE INDEX IF NOT EXISTS idx_messages_sender_ts
    ON messages(sender_id, created_at);
CREATE INDEX IF NOT EXISTS idx_messages_recipient_ts
    ON messages(recipient_id, created_at);

-- Access path: "the unordered pair's transcript, in time order".
CREATE INDEX IF NOT EXISTS idx_messages_pair_ts
    ON messages(pair_lo, pair_hi, created_at);

-- Access path: "unread badge count for a recipient".
CREATE INDEX IF NOT EXISTS idx_messages_recipient_unread
    ON messages(recipient_id, is_read);
"#;

/// Apply the initial migration.
pub fn up(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(UP_SQL)
}
