//! Assistant core - conversation state and streamed replies
//!
//! This crate provides:
//! - The message store holding the conversation log
//! - The streaming reducer that folds reply fragments into the log
//! - The conversation controller driving one turn at a time
//! - Category-specific system instructions

pub mod controller;
pub mod input;
pub mod prompts;
pub mod reducer;
pub mod store;

pub use controller::{
    ConversationController, ConversationSnapshot, RejectReason, SubmitOutcome, FALLBACK_NOTICE,
};
pub use input::compose_outgoing;
pub use prompts::{system_instruction, BASE_SYSTEM_INSTRUCTION};
pub use reducer::StreamingReducer;
pub use store::MessageStore;
