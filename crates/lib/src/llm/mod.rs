//! LLM abstraction and OpenAI client.
//!
//! One non-streaming chat completion per inbound message; the gateway picks
//! the model variant from attachment presence.

mod openai;

pub use openai::{
    ChatContent, ChatMessage, ContentPart, ImageUrl, ModelVariant, OpenAiClient, OpenAiError,
    FALLBACK_REPLY,
};
