//! Generation providers for the assistant.

pub mod gemini;
pub mod sse;

pub use gemini::GeminiClient;
