pub mod category;
pub mod events;
pub mod message;

pub mod settings {
    use crate::category::Category;
    use serde::{Deserialize, Serialize};

    fn default_true() -> bool {
        true
    }

    fn default_timeout_secs() -> u64 {
        120
    }

    #[derive(Debug, Clone, Default, Serialize, Deserialize)]
    pub struct ProviderAuth {
        pub api_key: Option<String>,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct ModelSettings {
        pub gemini_model: String, // e.g., "gemini-3-flash-preview"
        #[serde(default)]
        pub gemini_auth: ProviderAuth,
        /// Endpoint root; `None` means the public Gemini API
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub base_url: Option<String>,
        /// Longest wait for a connection or for the next streamed chunk
        #[serde(default = "default_timeout_secs")]
        pub timeout_secs: u64,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct AppSettings {
        pub model: ModelSettings,
        #[serde(default)]
        pub default_category: Category,
        /// Ask before wiping the conversation on `/clear`
        #[serde(default = "default_true")]
        pub confirm_clear: bool,
        /// Replaces the built-in base instruction when set
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub system_instruction: Option<String>,
    }

    impl Default for ModelSettings {
        fn default() -> Self {
            Self {
                gemini_model: "gemini-3-flash-preview".into(),
                gemini_auth: ProviderAuth::default(),
                base_url: None,
                timeout_secs: default_timeout_secs(),
            }
        }
    }

    impl Default for AppSettings {
        fn default() -> Self {
            Self {
                model: ModelSettings::default(),
                default_category: Category::default(),
                confirm_clear: true,
                system_instruction: None,
            }
        }
    }
}

pub mod agent_api {
    use crate::message::Role;
    use async_trait::async_trait;
    use serde::{Deserialize, Serialize};
    use tokio::sync::mpsc::UnboundedSender;

    /// One history entry as sent to the generation provider.
    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    pub struct ChatMessage {
        pub role: Role,
        pub content: String,
    }

    impl ChatMessage {
        pub fn user(content: impl Into<String>) -> Self {
            Self {
                role: Role::User,
                content: content.into(),
            }
        }

        pub fn model(content: impl Into<String>) -> Self {
            Self {
                role: Role::Model,
                content: content.into(),
            }
        }
    }

    /// Receives reply fragments in emission order.
    pub type FragmentSender = UnboundedSender<String>;

    /// Failures reported by a generation provider.
    #[derive(Debug, thiserror::Error)]
    pub enum GenerationError {
        #[error("{provider} error: {status}{detail}")]
        Http {
            provider: &'static str,
            status: u16,
            detail: String,
        },

        #[error("Response blocked: {reason}")]
        Blocked { reason: String },

        #[error("Provider reported an error: {message}")]
        Remote { message: String },

        #[error("Stream read error: {0}")]
        Stream(String),

        #[error("Generation failed: {0}")]
        Provider(#[from] anyhow::Error),
    }

    /// Streaming reply generation, the one operation the conversation core needs
    /// from a language model.
    #[async_trait]
    pub trait ReplyGenerator: Send + Sync {
        /// Short provider name for logs
        fn name(&self) -> &'static str;

        /// Generate a reply to `history`, sending each non-empty text fragment
        /// through `fragments` as it arrives. Returns once the reply is complete.
        /// No retries happen here.
        async fn generate_reply(
            &self,
            system_instruction: &str,
            history: Vec<ChatMessage>,
            fragments: FragmentSender,
        ) -> Result<(), GenerationError>;
    }

}
