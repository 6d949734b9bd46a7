//! Conversation message types.
//!
//! A message id is its creation time in milliseconds, bumped forward when two
//! messages are created within the same millisecond, so ids are unique and
//! ordered for the whole session.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::agent_api::ChatMessage;

/// Who authored a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Model => "model",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MessageId(u64);

impl MessageId {
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Hands out strictly increasing, time-derived message ids.
#[derive(Debug, Default)]
pub struct MessageIdAllocator {
    last: u64,
}

impl MessageIdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the id for a message created at `now`.
    pub fn next_at(&mut self, now: DateTime<Utc>) -> MessageId {
        let millis = u64::try_from(now.timestamp_millis()).unwrap_or(0);
        let id = millis.max(self.last + 1);
        self.last = id;
        MessageId(id)
    }
}

/// One conversation turn entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    /// True only while the model reply is still receiving fragments
    #[serde(default)]
    pub streaming: bool,
}

impl Message {
    pub fn user(id: MessageId, content: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            id,
            role: Role::User,
            content: content.into(),
            timestamp,
            streaming: false,
        }
    }

    /// Empty model reply that fragments are folded into.
    pub fn placeholder(id: MessageId, timestamp: DateTime<Utc>) -> Self {
        Self {
            id,
            role: Role::Model,
            content: String::new(),
            timestamp,
            streaming: true,
        }
    }

    /// Strip the message down to what the provider sees.
    pub fn to_chat_message(&self) -> ChatMessage {
        ChatMessage {
            role: self.role,
            content: self.content.clone(),
        }
    }

    /// Format timestamp for display
    pub fn formatted_time(&self) -> String {
        self.timestamp.format("%H:%M").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_ids_distinct_within_same_millisecond() {
        let mut ids = MessageIdAllocator::new();
        let now = Utc.timestamp_millis_opt(1_700_000_000_000).unwrap();

        let user = ids.next_at(now);
        let bot = ids.next_at(now);

        assert_eq!(user.as_u64(), 1_700_000_000_000);
        assert_eq!(bot.as_u64(), 1_700_000_000_001);
        assert!(bot > user);
    }

    #[test]
    fn test_ids_never_go_backwards_when_clock_does() {
        let mut ids = MessageIdAllocator::new();
        let later = Utc.timestamp_millis_opt(2_000).unwrap();
        let earlier = Utc.timestamp_millis_opt(1_000).unwrap();

        let first = ids.next_at(later);
        let second = ids.next_at(earlier);

        assert!(second > first);
    }

    #[test]
    fn test_to_chat_message_drops_metadata() {
        let now = Utc::now();
        let mut msg = Message::placeholder(MessageIdAllocator::new().next_at(now), now);
        msg.content.push_str("partial");

        let chat = msg.to_chat_message();
        assert_eq!(chat, ChatMessage::model("partial"));
    }
}
