//! # vitrine-store
//!
//! SQLite persistence for the Vitrine messaging subsystem.
//!
//! The crate exposes a synchronous [`Database`] handle that wraps a
//! `rusqlite::Connection` and provides typed helpers for the user
//! directory and the append-only message log. Conversations are never
//! persisted; [`conversations::aggregate_conversations`] derives them
//! from the flat message list on every read.

pub mod conversations;
pub mod database;
pub mod messages;
pub mod migrations;
pub mod models;
pub mod users;

mod error;

pub use conversations::{aggregate_conversations, ConversationSummary};
pub use database::Database;
pub use error::StoreError;
pub use models::*;
