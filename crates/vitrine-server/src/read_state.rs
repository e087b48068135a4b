//! Auto-mark-on-view.
//!
//! Viewing a thread marks every unread message addressed to the viewer as
//! read.  This is a deliberate product rule, not an incidental side
//! effect, so it is a named operation here rather than something buried
//! in the fetch handler.

use std::sync::Arc;

use tokio::sync::Mutex;

use vitrine_shared::UserId;
use vitrine_store::{Database, Message};

/// Mark every unread message in `thread` addressed to `viewer` as read.
///
/// Each message is marked with an independent store call; a failed mark is
/// logged at warn level and skipped, so the viewer still gets their
/// transcript even when some marks fail.  Returns how many messages were
/// actually marked.
///
/// The per-message calls take the database lock one at a time, so the
/// whole pass can be abandoned mid-flight without leaving anything in a
/// half-written state.
pub async fn mark_thread_read(
    db: &Arc<Mutex<Database>>,
    viewer: UserId,
    thread: &[Message],
) -> usize {
    let mut marked = 0;

    for message in thread {
        if message.recipient_id != viewer || message.is_read {
            continue;
        }

        let result = {
            let db = db.lock().await;
            db.mark_message_read(message.id, viewer)
        };

        match result {
            Ok(()) => marked += 1,
            Err(e) => {
                tracing::warn!(
                    message_id = %message.id,
                    viewer = %viewer,
                    error = %e,
                    "failed to mark message read on view"
                );
            }
        }
    }

    marked
}
