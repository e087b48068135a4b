//! Conversation aggregation.
//!
//! A conversation is never persisted: it is derived on every read from the
//! viewer's flat message list.  [`aggregate_conversations`] is a pure
//! function so the grouping rules can be tested without a database.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use vitrine_shared::UserId;

use crate::models::Message;

/// One derived conversation from the viewer's perspective.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConversationSummary {
    /// The other participant.
    pub other_user: UserId,
    /// The most recent message exchanged with them.
    pub last_message: Message,
    /// Messages addressed to the viewer that are still unread.
    pub unread_count: u32,
}

/// Group a flat message list into per-peer conversations.
///
/// Single left-to-right scan: each message is bucketed under its "other
/// party" (the recipient when the viewer sent it, the sender otherwise).
/// `last_message` is the bucket's maximum `created_at`; on a timestamp tie
/// the first-encountered message wins.  The result is sorted by last
/// activity, most recent first; the sort is stable so ties keep scan
/// order.
///
/// Messages that do not involve `viewer` at all are ignored rather than
/// misattributed.
pub fn aggregate_conversations(viewer: UserId, messages: &[Message]) -> Vec<ConversationSummary> {
    let mut summaries: Vec<ConversationSummary> = Vec::new();
    let mut index: HashMap<UserId, usize> = HashMap::new();

    for message in messages {
        let other_user = if message.sender_id == viewer {
            message.recipient_id
        } else if message.recipient_id == viewer {
            message.sender_id
        } else {
            continue;
        };

        let unread = u32::from(message.recipient_id == viewer && !message.is_read);

        match index.get(&other_user) {
            Some(&i) => {
                let summary = &mut summaries[i];
                if message.created_at > summary.last_message.created_at {
                    summary.last_message = message.clone();
                }
                summary.unread_count += unread;
            }
            None => {
                index.insert(other_user, summaries.len());
                summaries.push(ConversationSummary {
                    other_user,
                    last_message: message.clone(),
                    unread_count: unread,
                });
            }
        }
    }

    summaries.sort_by(|a, b| b.last_message.created_at.cmp(&a.last_message.created_at));
    summaries
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use vitrine_shared::MessageId;

    fn msg(sender: UserId, recipient: UserId, body: &str, secs: u32, is_read: bool) -> Message {
        Message {
            id: MessageId::new(),
            sender_id: sender,
            recipient_id: recipient,
            body: body.to_string(),
            is_read,
            created_at: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, secs).unwrap(),
        }
    }

    #[test]
    fn empty_input_yields_empty_output() {
        let viewer = UserId::new();
        assert!(aggregate_conversations(viewer, &[]).is_empty());
    }

    #[test]
    fn one_conversation_per_distinct_peer() {
        let viewer = UserId::new();
        let b = UserId::new();
        let c = UserId::new();

        let messages = vec![
            msg(viewer, b, "to b", 1, false),
            msg(c, viewer, "from c", 2, false),
            msg(b, viewer, "from b", 3, false),
        ];

        let convs = aggregate_conversations(viewer, &messages);
        assert_eq!(convs.len(), 2);
    }

    #[test]
    fn last_message_is_latest_and_sort_is_descending() {
        let viewer = UserId::new();
        let b = UserId::new();
        let c = UserId::new();

        let messages = vec![
            msg(viewer, b, "old b", 1, true),
            msg(b, viewer, "new b", 5, false),
            msg(c, viewer, "only c", 3, false),
        ];

        let convs = aggregate_conversations(viewer, &messages);
        assert_eq!(convs[0].other_user, b);
        assert_eq!(convs[0].last_message.body, "new b");
        assert_eq!(convs[1].other_user, c);
    }

    #[test]
    fn unread_counts_only_messages_to_viewer() {
        let viewer = UserId::new();
        let b = UserId::new();

        let messages = vec![
            msg(viewer, b, "mine, unread by b", 1, false),
            msg(b, viewer, "unread", 2, false),
            msg(b, viewer, "read", 3, true),
            msg(b, viewer, "also unread", 4, false),
        ];

        let convs = aggregate_conversations(viewer, &messages);
        assert_eq!(convs.len(), 1);
        assert_eq!(convs[0].unread_count, 2);
    }

    #[test]
    fn outgoing_only_conversation_has_zero_unread() {
        let viewer = UserId::new();
        let b = UserId::new();

        let messages = vec![msg(viewer, b, "one", 1, false), msg(viewer, b, "two", 2, false)];

        let convs = aggregate_conversations(viewer, &messages);
        assert_eq!(convs.len(), 1);
        assert_eq!(convs[0].unread_count, 0);
        assert_eq!(convs[0].last_message.body, "two");
    }

    #[test]
    fn unread_sum_matches_per_message_count() {
        let viewer = UserId::new();
        let b = UserId::new();
        let c = UserId::new();

        let messages = vec![
            msg(b, viewer, "1", 1, false),
            msg(c, viewer, "2", 2, false),
            msg(c, viewer, "3", 3, true),
            msg(viewer, b, "4", 4, false),
            msg(c, viewer, "5", 5, false),
        ];

        let expected: u32 = messages
            .iter()
            .filter(|m| m.recipient_id == viewer && !m.is_read)
            .count() as u32;

        let convs = aggregate_conversations(viewer, &messages);
        let total: u32 = convs.iter().map(|c| c.unread_count).sum();
        assert_eq!(total, expected);
    }

    #[test]
    fn timestamp_tie_keeps_first_encountered() {
        let viewer = UserId::new();
        let b = UserId::new();

        let first = msg(b, viewer, "first", 7, false);
        let second = msg(viewer, b, "second", 7, false);
        let messages = vec![first.clone(), second];

        let convs = aggregate_conversations(viewer, &messages);
        assert_eq!(convs[0].last_message.id, first.id);
    }

    #[test]
    fn foreign_messages_are_ignored() {
        let viewer = UserId::new();
        let b = UserId::new();
        let c = UserId::new();

        let messages = vec![msg(b, c, "not ours", 1, false)];
        assert!(aggregate_conversations(viewer, &messages).is_empty());
    }

    #[test]
    fn input_order_does_not_change_grouping() {
        let viewer = UserId::new();
        let b = UserId::new();

        let newest_first = vec![msg(b, viewer, "new", 9, false), msg(b, viewer, "old", 1, true)];
        let oldest_first: Vec<Message> = newest_first.iter().rev().cloned().collect();

        let a = aggregate_conversations(viewer, &newest_first);
        let o = aggregate_conversations(viewer, &oldest_first);
        assert_eq!(a[0].last_message.body, "new");
        assert_eq!(o[0].last_message.body, "new");
        assert_eq!(a[0].unread_count, o[0].unread_count);
    }
}
