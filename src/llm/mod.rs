//! Chat backend abstraction.
//!
//! `LlmProvider` is an enum over concrete provider implementations — enum
//! dispatch avoids `dyn` trait objects and the `async-trait` dependency.
//! Adding a backend = new module in `providers/`, new variant, new match arm.
//!
//! Providers stream: `stream_chat` returns a [`ReplyStream`], a lazy finite
//! sequence of text fragments pulled with `next_fragment`. Dropping the
//! stream cancels the in-flight request; restarting means issuing a new one.

pub mod providers;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ── Error ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("unknown provider: {0}")]
    UnknownProvider(String),
    #[error("provider '{0}' requires LLM_API_KEY")]
    MissingApiKey(String),
    #[error("provider request failed: {0}")]
    Request(String),
    #[error("reply stream interrupted: {0}")]
    Stream(String),
}

// ── Conversation types ────────────────────────────────────────────────────────

/// Who authored a history entry. Serialized lowercase on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One turn in the conversation history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: Role::System, content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: Role::Assistant, content: content.into() }
    }
}

// ── Provider enum ─────────────────────────────────────────────────────────────

/// All available chat backends.
#[derive(Debug, Clone)]
pub enum LlmProvider {
    Dummy(providers::dummy::DummyProvider),
    OpenAiCompatible(providers::openai_compatible::OpenAiCompatibleProvider),
}

impl LlmProvider {
    /// Send the full conversation history and return the reply as a stream.
    pub async fn stream_chat(&self, history: &[ChatMessage]) -> Result<ReplyStream, ProviderError> {
        match self {
            LlmProvider::Dummy(p) => Ok(ReplyStream::Dummy(p.stream_chat(history))),
            LlmProvider::OpenAiCompatible(p) => {
                Ok(ReplyStream::OpenAiCompatible(p.stream_chat(history).await?))
            }
        }
    }
}

/// A lazy, finite sequence of reply fragments.
pub enum ReplyStream {
    Dummy(providers::dummy::DummyStream),
    OpenAiCompatible(providers::openai_compatible::SseStream),
}

impl ReplyStream {
    /// Pull the next text fragment; `None` means the reply is complete.
    ///
    /// An `Err` mid-stream means the reply is truncated — callers must not
    /// treat fragments received so far as a complete answer.
    pub async fn next_fragment(&mut self) -> Result<Option<String>, ProviderError> {
        match self {
            ReplyStream::Dummy(s) => s.next_fragment().await,
            ReplyStream::OpenAiCompatible(s) => s.next_fragment().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roles_serialize_lowercase() {
        let msg = ChatMessage::user("hello");
        let json = serde_json::to_string(&msg).unwrap();
        assert_eq!(json, r#"{"role":"user","content":"hello"}"#);

        let sys = serde_json::to_string(&ChatMessage::system("hi")).unwrap();
        assert!(sys.contains(r#""role":"system""#));
        let asst = serde_json::to_string(&ChatMessage::assistant("ok")).unwrap();
        assert!(asst.contains(r#""role":"assistant""#));
    }

    #[tokio::test]
    async fn dummy_provider_round_trip() {
        let provider = LlmProvider::Dummy(providers::dummy::DummyProvider);
        let history = vec![ChatMessage::system("greeting"), ChatMessage::user("I have a cough")];

        let mut stream = provider.stream_chat(&history).await.unwrap();
        let mut reply = String::new();
        while let Some(fragment) = stream.next_fragment().await.unwrap() {
            reply.push_str(&fragment);
        }
        assert_eq!(reply, "[echo] I have a cough");
    }
}
