use anyhow::{anyhow, Result};
use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use shared::agent_api::{ChatMessage, FragmentSender, GenerationError, ReplyGenerator};
use shared::settings::ModelSettings;
use std::env;
use std::time::Duration;

use crate::sse::SseParser;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const PROVIDER: &str = "gemini";

// ── Request types ────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct GeminiContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize)]
struct GeminiPart {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContent>,
}

// ── Streaming response types ─────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiStreamChunk {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(default)]
    prompt_feedback: Option<GeminiPromptFeedback>,
    #[serde(default)]
    error: Option<GeminiApiError>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    #[serde(default)]
    content: Option<GeminiCandidateContent>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidateContent {
    #[serde(default)]
    parts: Vec<GeminiCandidatePart>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidatePart {
    #[serde(default)]
    text: Option<String>,
    /// Thought summaries are not part of the visible reply
    #[serde(default)]
    thought: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiApiError {
    #[serde(default)]
    code: u16,
    #[serde(default)]
    message: String,
}

// ── Conversion ───────────────────────────────────────────────────────

fn build_request(system_instruction: &str, history: Vec<ChatMessage>) -> GeminiRequest {
    let contents = history
        .into_iter()
        .map(|m| GeminiContent {
            role: Some(m.role.as_str()),
            parts: vec![GeminiPart { text: m.content }],
        })
        .collect();
    let system_instruction = if system_instruction.trim().is_empty() {
        None
    } else {
        Some(GeminiContent {
            role: None,
            parts: vec![GeminiPart {
                text: system_instruction.to_string(),
            }],
        })
    };
    GeminiRequest {
        contents,
        system_instruction,
    }
}

/// Turn one streamed SSE payload into the reply text it carries.
///
/// `Ok(None)` means the chunk had no visible text (usage metadata, finish markers,
/// or a payload we cannot parse).
fn fragment_from_event(data: &str) -> Result<Option<String>, GenerationError> {
    let chunk = match serde_json::from_str::<GeminiStreamChunk>(data) {
        Ok(chunk) => chunk,
        Err(e) => {
            tracing::debug!("skipping unparseable gemini event: {}", e);
            return Ok(None);
        }
    };

    if let Some(err) = chunk.error {
        return Err(GenerationError::Remote {
            message: format!("{} {}", err.code, err.message),
        });
    }
    if let Some(reason) = chunk.prompt_feedback.and_then(|f| f.block_reason) {
        return Err(GenerationError::Blocked { reason });
    }

    let text: String = chunk
        .candidates
        .first()
        .and_then(|c| c.content.as_ref())
        .map(|c| {
            c.parts
                .iter()
                .filter(|p| !p.thought)
                .filter_map(|p| p.text.as_deref())
                .collect()
        })
        .unwrap_or_default();

    Ok((!text.is_empty()).then_some(text))
}

pub struct GeminiClient {
    http: Client,
    auth_token: String,
    model: String,
    base_url: String,
}

impl GeminiClient {
    /// `idle_timeout` bounds connecting and each gap between streamed chunks,
    /// not the length of the whole reply.
    pub fn new(model: &str, auth_token: &str, base_url: &str, idle_timeout: Duration) -> Result<Self> {
        Ok(Self {
            http: Client::builder()
                .connect_timeout(idle_timeout)
                .read_timeout(idle_timeout)
                .build()?,
            auth_token: auth_token.to_string(),
            model: model.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Build a client from settings, falling back to `GEMINI_API_KEY` for the key.
    /// `GEMINI_BASE_URL` overrides the configured endpoint.
    pub fn from_settings(settings: &ModelSettings) -> Result<Self> {
        let auth_token = match settings
            .gemini_auth
            .api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
        {
            Some(key) => key.to_string(),
            None => env::var("GEMINI_API_KEY")
                .map_err(|_| anyhow!("No Gemini authentication configured"))?,
        };
        let base_url = env::var("GEMINI_BASE_URL")
            .ok()
            .or_else(|| settings.base_url.clone())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        Self::new(
            &settings.gemini_model,
            &auth_token,
            &base_url,
            Duration::from_secs(settings.timeout_secs),
        )
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn stream_url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:streamGenerateContent?alt=sse",
            self.base_url, self.model
        )
    }

    /// Stream a reply, sending every visible text fragment through `tx` in order.
    pub async fn generate_stream(
        &self,
        system_instruction: &str,
        history: Vec<ChatMessage>,
        tx: &FragmentSender,
    ) -> Result<(), GenerationError> {
        let req = build_request(system_instruction, history);
        let resp = self
            .http
            .post(self.stream_url())
            .header("x-goog-api-key", &self.auth_token)
            .json(&req)
            .send()
            .await
            .map_err(|e| anyhow!("gemini request failed: {}", e))?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            let detail: String = body.trim().chars().take(800).collect();
            return Err(GenerationError::Http {
                provider: PROVIDER,
                status,
                detail: if detail.is_empty() {
                    detail
                } else {
                    format!("\n{}", detail)
                },
            });
        }

        let mut parser = SseParser::new();
        let mut stream = resp.bytes_stream();
        let mut sent = 0usize;

        while let Some(chunk) = stream.next().await {
            let bytes = chunk.map_err(|e| GenerationError::Stream(e.to_string()))?;
            for event in parser.feed(&bytes) {
                if let Some(text) = fragment_from_event(&event.data)? {
                    if tx.send(text).is_err() {
                        // Nobody is listening for this reply any more
                        return Ok(());
                    }
                    sent += 1;
                }
            }
        }
        if let Some(event) = parser.finish() {
            if let Some(text) = fragment_from_event(&event.data)? {
                let _ = tx.send(text);
                sent += 1;
            }
        }

        tracing::debug!(model = %self.model, fragments = sent, "gemini stream finished");
        Ok(())
    }
}

#[async_trait]
impl ReplyGenerator for GeminiClient {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    async fn generate_reply(
        &self,
        system_instruction: &str,
        history: Vec<ChatMessage>,
        fragments: FragmentSender,
    ) -> Result<(), GenerationError> {
        self.generate_stream(system_instruction, history, &fragments)
            .await
    }
}
