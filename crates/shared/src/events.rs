//! Conversation events for observers that re-render after each mutation.

use serde::{Deserialize, Serialize};

use crate::category::Category;
use crate::message::{Message, MessageId};

/// How a turn ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TurnOutcome {
    /// Reply streamed to completion
    Completed,
    /// Provider failed; the reply now holds the fallback notice
    Failed,
}

/// Why the conversation was emptied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClearReason {
    CategorySwitch,
    UserRequest,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ConversationEvent {
    /// A message was appended to the log
    MessageAppended(Message),
    /// The streaming reply grew; `content` is the full text so far
    ContentUpdated { id: MessageId, content: String },
    /// The streaming reply was finalized
    TurnFinished {
        id: MessageId,
        outcome: TurnOutcome,
        content: String,
    },
    /// The log was emptied
    Cleared {
        category: Category,
        reason: ClearReason,
    },
    /// A turn started or stopped being in flight
    LoadingChanged(bool),
}

impl ConversationEvent {
    pub fn message_id(&self) -> Option<MessageId> {
        match self {
            ConversationEvent::MessageAppended(message) => Some(message.id),
            ConversationEvent::ContentUpdated { id, .. } => Some(*id),
            ConversationEvent::TurnFinished { id, .. } => Some(*id),
            ConversationEvent::Cleared { .. } => None,
            ConversationEvent::LoadingChanged(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::MessageIdAllocator;
    use chrono::Utc;

    #[test]
    fn test_message_id_for_turn_events() {
        let now = Utc::now();
        let id = MessageIdAllocator::new().next_at(now);

        let appended = ConversationEvent::MessageAppended(Message::placeholder(id, now));
        let updated = ConversationEvent::ContentUpdated {
            id,
            content: "Hi".into(),
        };

        assert_eq!(appended.message_id(), Some(id));
        assert_eq!(updated.message_id(), Some(id));
        assert_eq!(ConversationEvent::LoadingChanged(true).message_id(), None);
    }
}
