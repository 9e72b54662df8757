//! Message grouping
//!
//! Decides when a message continues the previous one, so the presentation
//! layer can skip repeating the avatar and name header.

use crate::chat::models::Message;

/// Two same-sender messages closer than this are grouped together
pub const CONSECUTIVE_WINDOW_MS: i64 = 60_000;

/// Whether `next` continues `prev`: same sender, less than a minute apart
pub fn is_consecutive(prev: &Message, next: &Message) -> bool {
    prev.sender == next.sender
        && (next.timestamp - prev.timestamp).num_milliseconds() < CONSECUTIVE_WINDOW_MS
}

/// One flag per message; the first message never continues anything
pub fn consecutive_flags(messages: &[Message]) -> Vec<bool> {
    std::iter::once(false)
        .chain(messages.windows(2).map(|pair| is_consecutive(&pair[0], &pair[1])))
        .take(messages.len())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::models::MessageDraft;
    use chrono::{Duration, Utc};

    fn at(draft: MessageDraft, id: u64, offset_secs: i64) -> Message {
        let base = Utc::now();
        draft.into_message(id, base + Duration::seconds(offset_secs))
    }

    #[test]
    fn test_same_sender_within_window() {
        let base = Utc::now();
        let prev = MessageDraft::user("a").into_message(1, base);
        let next = MessageDraft::user("b").into_message(2, base + Duration::seconds(30));
        assert!(is_consecutive(&prev, &next));
    }

    #[test]
    fn test_same_sender_outside_window() {
        let base = Utc::now();
        let prev = MessageDraft::user("a").into_message(1, base);
        let next = MessageDraft::user("b").into_message(2, base + Duration::seconds(90));
        assert!(!is_consecutive(&prev, &next));
    }

    #[test]
    fn test_exactly_one_minute_is_not_consecutive() {
        let base = Utc::now();
        let prev = MessageDraft::user("a").into_message(1, base);
        let next = MessageDraft::user("b").into_message(2, base + Duration::milliseconds(60_000));
        assert!(!is_consecutive(&prev, &next));
    }

    #[test]
    fn test_sender_change_breaks_group() {
        let base = Utc::now();
        let prev = MessageDraft::user("a").into_message(1, base);
        let next = MessageDraft::reply("b", "Support").into_message(2, base);
        assert!(!is_consecutive(&prev, &next));
    }

    #[test]
    fn test_consecutive_flags() {
        assert!(consecutive_flags(&[]).is_empty());

        let messages = vec![
            at(MessageDraft::user("a"), 1, 0),
            at(MessageDraft::user("b"), 2, 5),
            at(MessageDraft::reply("c", "Support"), 3, 6),
            at(MessageDraft::reply("d", "Support"), 4, 200),
        ];
        assert_eq!(consecutive_flags(&messages), vec![false, true, false, false]);
    }
}
