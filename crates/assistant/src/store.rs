//! Ordered, append-only log of conversation messages.
//!
//! Once appended, a message keeps its position. The only in-place mutation is on
//! the trailing message while it is still streaming.

use chrono::{DateTime, Utc};
use shared::agent_api::ChatMessage;
use shared::message::{Message, MessageId, MessageIdAllocator};

#[derive(Debug, Default)]
pub struct MessageStore {
    messages: Vec<Message>,
    /// Survives `clear` so ids stay unique for the whole session
    ids: MessageIdAllocator,
}

impl MessageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the id for a message created at `now`.
    pub fn next_id(&mut self, now: DateTime<Utc>) -> MessageId {
        self.ids.next_at(now)
    }

    pub fn append(&mut self, message: Message) {
        debug_assert!(
            !(message.streaming && self.streaming_count() > 0),
            "a second streaming message would be appended"
        );
        self.messages.push(message);
    }

    /// Apply `mutator` to the last message if it is the streaming placeholder.
    ///
    /// Returns false, leaving the store untouched, when the last message is
    /// already finalized or the store is empty.
    pub fn update_last<F>(&mut self, mutator: F) -> bool
    where
        F: FnOnce(&mut Message),
    {
        match self.messages.last_mut() {
            Some(last) if last.streaming => {
                mutator(last);
                true
            }
            _ => false,
        }
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn streaming_count(&self) -> usize {
        self.messages.iter().filter(|m| m.streaming).count()
    }

    /// Finalized messages in order, reduced to what the provider sees.
    pub fn history(&self) -> Vec<ChatMessage> {
        self.messages
            .iter()
            .filter(|m| !m.streaming)
            .map(Message::to_chat_message)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::message::Role;

    fn store_with_turn() -> MessageStore {
        let mut store = MessageStore::new();
        let now = Utc::now();
        let user = store.next_id(now);
        store.append(Message::user(user, "Hello", now));
        let bot = store.next_id(now);
        store.append(Message::placeholder(bot, now));
        store
    }

    #[test]
    fn test_update_last_applies_to_streaming_placeholder() {
        let mut store = store_with_turn();

        assert!(store.update_last(|m| m.content.push_str("Hi")));
        assert_eq!(store.last().unwrap().content, "Hi");
        assert_eq!(store.messages()[0].content, "Hello");
    }

    #[test]
    fn test_update_last_refuses_finalized_message() {
        let mut store = store_with_turn();
        store.update_last(|m| m.streaming = false);

        assert!(!store.update_last(|m| m.content.push_str("late")));
        assert_eq!(store.last().unwrap().content, "");
        assert_eq!(store.streaming_count(), 0);
    }

    #[test]
    fn test_update_last_on_empty_store() {
        let mut store = MessageStore::new();
        assert!(!store.update_last(|m| m.content.push('x')));
    }

    #[test]
    fn test_history_excludes_placeholder() {
        let store = store_with_turn();
        let history = store.history();

        assert_eq!(history.len(), 1);
        assert_eq!(history[0].role, Role::User);
        assert_eq!(history[0].content, "Hello");
    }

    #[test]
    fn test_ids_keep_increasing_after_clear() {
        let mut store = store_with_turn();
        let before = store.last().unwrap().id;
        store.clear();

        assert!(store.is_empty());
        assert!(store.next_id(Utc::now()) > before);
    }
}
