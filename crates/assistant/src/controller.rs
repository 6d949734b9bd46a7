//! Conversation controller.
//!
//! Owns the message store and the active category, turns a submission into one
//! full request/response exchange, and reports every mutation to an optional
//! observer channel. At most one turn is in flight; a second submission while
//! one is pending is rejected, not queued.
//!
//! Resetting the conversation (category switch or clear) aborts the in-flight
//! generation. The abandoned turn never writes into the new conversation and
//! never clears the loading flag of a turn started after the reset.

use chrono::Utc;
use futures::future::{AbortHandle, Abortable};
use parking_lot::Mutex;
use shared::agent_api::ReplyGenerator;
use shared::category::Category;
use shared::events::{ClearReason, ConversationEvent, TurnOutcome};
use shared::message::{Message, MessageId};
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::prompts;
use crate::reducer::StreamingReducer;
use crate::store::MessageStore;

/// Shown in place of the reply when generation fails
pub const FALLBACK_NOTICE: &str = "抱歉，我现在遇到了一些问题，请稍后再试。";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// Nothing but whitespace was submitted
    EmptyInput,
    /// Another turn is still streaming
    TurnInFlight,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Input ignored; the store was not touched
    Rejected(RejectReason),
    /// Reply streamed to completion
    Completed { reply: MessageId },
    /// Provider failed; the reply holds [`FALLBACK_NOTICE`]
    Failed { reply: MessageId },
    /// The conversation was reset while this turn was in flight
    Abandoned { reply: MessageId },
}

/// Read-only view for rendering
#[derive(Debug, Clone, PartialEq)]
pub struct ConversationSnapshot {
    pub messages: Vec<Message>,
    pub category: Category,
    pub loading: bool,
}

impl ConversationSnapshot {
    /// True when the welcome screen should be shown
    pub fn is_new_chat(&self) -> bool {
        self.messages.is_empty()
    }
}

struct InFlightTurn {
    reply: MessageId,
    abort: AbortHandle,
}

struct ConversationState {
    store: MessageStore,
    category: Category,
    in_flight: Option<InFlightTurn>,
}

pub struct ConversationController {
    generator: Arc<dyn ReplyGenerator>,
    state: Mutex<ConversationState>,
    /// Replaces the built-in base system instruction
    base_instruction: Option<String>,
    events: Option<mpsc::UnboundedSender<ConversationEvent>>,
}

impl ConversationController {
    pub fn new(generator: Arc<dyn ReplyGenerator>, category: Category) -> Self {
        Self {
            generator,
            state: Mutex::new(ConversationState {
                store: MessageStore::new(),
                category,
                in_flight: None,
            }),
            base_instruction: None,
            events: None,
        }
    }

    /// Report every mutation on `events`.
    pub fn with_events(mut self, events: mpsc::UnboundedSender<ConversationEvent>) -> Self {
        self.events = Some(events);
        self
    }

    pub fn with_base_instruction(mut self, instruction: Option<String>) -> Self {
        self.base_instruction = instruction;
        self
    }

    pub fn category(&self) -> Category {
        self.state.lock().category
    }

    /// True while a turn is in flight; input should be disabled.
    pub fn is_loading(&self) -> bool {
        self.state.lock().in_flight.is_some()
    }

    pub fn snapshot(&self) -> ConversationSnapshot {
        let state = self.state.lock();
        ConversationSnapshot {
            messages: state.store.messages().to_vec(),
            category: state.category,
            loading: state.in_flight.is_some(),
        }
    }

    /// Switch persona. A different category empties the conversation; the same
    /// category is a no-op. Returns whether the category changed.
    pub fn select_category(&self, category: Category) -> bool {
        let mut state = self.state.lock();
        if state.category == category {
            return false;
        }
        tracing::info!(from = %state.category.as_str(), to = %category.as_str(), "switching category");
        state.category = category;
        self.reset(&mut state, ClearReason::CategorySwitch);
        true
    }

    /// Empty the conversation, keeping the category.
    pub fn clear_conversation(&self) {
        let mut state = self.state.lock();
        tracing::info!(messages = state.store.len(), "clearing conversation");
        self.reset(&mut state, ClearReason::UserRequest);
    }

    /// Drive one full turn for `text`.
    ///
    /// Generation failures are recovered here and never surface as errors.
    pub async fn submit(&self, text: &str) -> SubmitOutcome {
        if text.trim().is_empty() {
            return SubmitOutcome::Rejected(RejectReason::EmptyInput);
        }

        let (abort, registration) = AbortHandle::new_pair();
        let (reply, history, instruction) = {
            let mut state = self.state.lock();
            if state.in_flight.is_some() {
                tracing::debug!("submission rejected: turn in flight");
                return SubmitOutcome::Rejected(RejectReason::TurnInFlight);
            }

            let now = Utc::now();
            let user_id = state.store.next_id(now);
            let user = Message::user(user_id, text, now);
            let reply_id = state.store.next_id(now);
            let placeholder = Message::placeholder(reply_id, now);

            state.store.append(user.clone());
            self.emit(ConversationEvent::MessageAppended(user));
            // History is taken before the placeholder goes in
            let history = state.store.history();
            state.store.append(placeholder.clone());
            self.emit(ConversationEvent::MessageAppended(placeholder));

            state.in_flight = Some(InFlightTurn {
                reply: reply_id,
                abort,
            });
            self.emit(ConversationEvent::LoadingChanged(true));

            let instruction =
                prompts::system_instruction(state.category, self.base_instruction.as_deref());
            (reply_id, history, instruction)
        };

        tracing::info!(
            provider = self.generator.name(),
            reply = %reply,
            history = history.len(),
            "turn started"
        );

        let (tx, mut rx) = mpsc::unbounded_channel();
        let generation = Abortable::new(
            self.generator.generate_reply(&instruction, history, tx),
            registration,
        );
        let mut reducer = StreamingReducer::new(reply);
        let reduce = async {
            // Ends once the generation future drops its sender
            while let Some(fragment) = rx.recv().await {
                let mut state = self.state.lock();
                if let Some(content) = reducer.apply(&mut state.store, &fragment) {
                    self.emit(ConversationEvent::ContentUpdated {
                        id: reply,
                        content: content.to_string(),
                    });
                }
            }
        };
        let (result, ()) = tokio::join!(generation, reduce);

        let mut state = self.state.lock();
        let still_current = state
            .in_flight
            .as_ref()
            .is_some_and(|turn| turn.reply == reply);
        // Only a reset aborts, and a reset always takes the in-flight turn
        let result = match result {
            Ok(result) if still_current => result,
            _ => {
                tracing::info!(reply = %reply, "turn abandoned after conversation reset");
                return SubmitOutcome::Abandoned { reply };
            }
        };

        let outcome = match result {
            Ok(()) => {
                state.store.update_last(|m| m.streaming = false);
                tracing::debug!(
                    reply = %reply,
                    fragments = reducer.fragment_count(),
                    chars = reducer.accumulated().chars().count(),
                    "turn completed"
                );
                TurnOutcome::Completed
            }
            Err(e) => {
                tracing::warn!(
                    provider = self.generator.name(),
                    reply = %reply,
                    "generation failed: {}",
                    e
                );
                self.fail_reply(&mut state.store);
                TurnOutcome::Failed
            }
        };
        let content = state
            .store
            .last()
            .map(|m| m.content.clone())
            .unwrap_or_default();
        self.emit(ConversationEvent::TurnFinished {
            id: reply,
            outcome,
            content,
        });

        // Only after the store holds the final reply
        state.in_flight = None;
        self.emit(ConversationEvent::LoadingChanged(false));

        match outcome {
            TurnOutcome::Completed => SubmitOutcome::Completed { reply },
            TurnOutcome::Failed => SubmitOutcome::Failed { reply },
        }
    }

    fn fail_reply(&self, store: &mut MessageStore) {
        store.update_last(|m| {
            m.content = FALLBACK_NOTICE.to_string();
            m.streaming = false;
        });
    }

    fn reset(&self, state: &mut ConversationState, reason: ClearReason) {
        state.store.clear();
        self.emit(ConversationEvent::Cleared {
            category: state.category,
            reason,
        });
        if let Some(turn) = state.in_flight.take() {
            tracing::info!(reply = %turn.reply, "aborting in-flight turn");
            turn.abort.abort();
            self.emit(ConversationEvent::LoadingChanged(false));
        }
    }

    fn emit(&self, event: ConversationEvent) {
        if let Some(tx) = &self.events {
            let _ = tx.send(event);
        }
    }
}
