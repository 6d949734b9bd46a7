//! Folds streamed reply fragments into the placeholder message.

use shared::message::MessageId;

use crate::store::MessageStore;

/// Accumulator for one turn.
///
/// Each fragment is appended to a turn-local buffer and the whole buffer is
/// written into the placeholder, so a reader of the store always sees the full
/// reply so far.
#[derive(Debug)]
pub struct StreamingReducer {
    placeholder: MessageId,
    accumulated: String,
    fragments: usize,
}

impl StreamingReducer {
    pub fn new(placeholder: MessageId) -> Self {
        Self {
            placeholder,
            accumulated: String::new(),
            fragments: 0,
        }
    }

    pub fn placeholder(&self) -> MessageId {
        self.placeholder
    }

    /// Fold one fragment into `store`.
    ///
    /// Returns the placeholder's new content, or `None` if the fragment was empty
    /// or the placeholder is no longer the streaming tail of the store (the
    /// conversation was reset under this turn).
    pub fn apply(&mut self, store: &mut MessageStore, fragment: &str) -> Option<&str> {
        if fragment.is_empty() {
            return None;
        }
        self.accumulated.push_str(fragment);
        self.fragments += 1;

        if store.last().map(|m| m.id) != Some(self.placeholder) {
            return None;
        }
        let content = &self.accumulated;
        store
            .update_last(|m| m.content.clone_from(content))
            .then_some(self.accumulated.as_str())
    }

    pub fn accumulated(&self) -> &str {
        &self.accumulated
    }

    pub fn fragment_count(&self) -> usize {
        self.fragments
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use shared::message::Message;

    fn open_turn(store: &mut MessageStore) -> MessageId {
        let now = Utc::now();
        let user = store.next_id(now);
        store.append(Message::user(user, "Hello", now));
        let bot = store.next_id(now);
        store.append(Message::placeholder(bot, now));
        bot
    }

    #[test]
    fn test_content_is_prefix_sequence() {
        let mut store = MessageStore::new();
        let mut reducer = StreamingReducer::new(open_turn(&mut store));

        let mut seen = Vec::new();
        for fragment in ["A", "B", "C"] {
            seen.push(reducer.apply(&mut store, fragment).unwrap().to_string());
            assert_eq!(store.last().unwrap().content, *seen.last().unwrap());
            assert!(store.last().unwrap().streaming);
        }

        assert_eq!(seen, vec!["A", "AB", "ABC"]);
        assert_eq!(reducer.fragment_count(), 3);
    }

    #[test]
    fn test_empty_fragment_ignored() {
        let mut store = MessageStore::new();
        let mut reducer = StreamingReducer::new(open_turn(&mut store));

        assert!(reducer.apply(&mut store, "").is_none());
        assert_eq!(reducer.fragment_count(), 0);
    }

    #[test]
    fn test_stale_turn_does_not_write_into_new_conversation() {
        let mut store = MessageStore::new();
        let mut stale = StreamingReducer::new(open_turn(&mut store));

        store.clear();
        let current = open_turn(&mut store);

        assert!(stale.apply(&mut store, "old").is_none());
        assert_eq!(store.last().unwrap().id, current);
        assert_eq!(store.last().unwrap().content, "");
    }

    #[test]
    fn test_finalized_placeholder_is_left_alone() {
        let mut store = MessageStore::new();
        let mut reducer = StreamingReducer::new(open_turn(&mut store));
        reducer.apply(&mut store, "done");
        store.update_last(|m| m.streaming = false);

        assert!(reducer.apply(&mut store, " more").is_none());
        assert_eq!(store.last().unwrap().content, "done");
    }
}
