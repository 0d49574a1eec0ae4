//! OpenAI chat-completions client.
//!
//! One non-streaming call per inbound message. Generation parameters are
//! fixed at this call site: max_tokens 1000, temperature 0.7.

use serde::{Deserialize, Serialize};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const MAX_TOKENS: u32 = 1000;
const TEMPERATURE: f32 = 0.7;

/// Substituted when the API answers without usable content. This one call
/// site degrades instead of failing.
pub const FALLBACK_REPLY: &str = "No response generated";

/// Completion model, selected per request from attachment presence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelVariant {
    /// Vision-capable model used when the inbound message carries an image.
    Gpt4o,
    /// Lower-cost text-only model.
    Gpt4oMini,
}

impl ModelVariant {
    /// Attachment presence is the only selection criterion.
    pub fn select(has_image: bool) -> Self {
        if has_image {
            Self::Gpt4o
        } else {
            Self::Gpt4oMini
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Gpt4o => "gpt-4o",
            Self::Gpt4oMini => "gpt-4o-mini",
        }
    }
}

/// One conversation turn submitted to the completions API.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: ChatContent,
}

/// Message content: a bare string, or typed parts when an image is attached.
/// Untagged so the text shape serializes as a plain JSON string.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ChatContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

/// Typed content part (OpenAI vision format).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageUrl {
    pub url: String,
}

#[derive(Debug, thiserror::Error)]
pub enum OpenAiError {
    #[error("openai request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("openai api error: {0}")]
    Api(String),
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    #[serde(default)]
    message: Option<ResponseMessage>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Client for the OpenAI chat-completions API. No retries; transport defaults apply.
#[derive(Clone)]
pub struct OpenAiClient {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl OpenAiClient {
    pub fn new(api_key: String, base_url: Option<String>) -> Self {
        let base_url = base_url
            .map(|u| u.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        Self {
            base_url,
            api_key,
            client: reqwest::Client::new(),
        }
    }

    /// POST /chat/completions — submit the ordered turns and model, return the
    /// first choice's text. An answer without usable content yields FALLBACK_REPLY.
    pub async fn generate(
        &self,
        messages: Vec<ChatMessage>,
        model: ModelVariant,
    ) -> Result<String, OpenAiError> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = ChatRequest {
            model: model.as_str().to_string(),
            messages,
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
        };
        let res = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(OpenAiError::Api(format!("{} {}", status, body)));
        }
        let data: ChatResponse = res.json().await?;
        let content = data
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .and_then(|m| m.content)
            .filter(|c| !c.is_empty());
        Ok(content.unwrap_or_else(|| FALLBACK_REPLY.to_string()))
    }
}
