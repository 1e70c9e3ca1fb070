//! OpenAI-compatible streaming chat completions (`/v1/chat/completions`).
//!
//! Covers the AI71 endpoint the default config targets, OpenAI itself, and
//! local compatible servers. All wire types are private to this module —
//! callers only see [`ChatMessage`] in and text fragments out.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, trace};

use crate::llm::{ChatMessage, ProviderError};

// ── Public provider ───────────────────────────────────────────────────────────

/// Adapter for any HTTP endpoint implementing `/v1/chat/completions` with
/// server-sent-event streaming.
///
/// Constructed once at startup, then cheaply cloned because
/// `reqwest::Client` is an `Arc` internally.
#[derive(Debug, Clone)]
pub struct OpenAiCompatibleProvider {
    client: Client,
    api_base_url: String,
    model: String,
    temperature: f32,
    api_key: String,
}

impl OpenAiCompatibleProvider {
    /// Build a provider from config values and the API key.
    ///
    /// `timeout_seconds` bounds connection establishment only — a whole-request
    /// timeout would cut long streamed replies short.
    pub fn new(
        api_base_url: String,
        model: String,
        temperature: f32,
        timeout_seconds: u64,
        api_key: String,
    ) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .connect_timeout(std::time::Duration::from_secs(timeout_seconds))
            .build()
            .map_err(|e| ProviderError::Request(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client, api_base_url, model, temperature, api_key })
    }

    /// POST the full history with `stream: true` and hand back the SSE body.
    pub async fn stream_chat(&self, history: &[ChatMessage]) -> Result<SseStream, ProviderError> {
        let payload = ChatCompletionRequest {
            model: self.model.clone(),
            messages: history.to_vec(),
            temperature: Some(self.temperature),
            stream: true,
        };

        debug!(
            model = %payload.model,
            turns = payload.messages.len(),
            "sending streaming chat request"
        );
        if tracing::enabled!(tracing::Level::TRACE) {
            let json = serde_json::to_string_pretty(&payload)
                .unwrap_or_else(|e| format!("<serialization failed: {e}>"));
            trace!(payload = %json, "full chat request payload");
        }

        let response = self
            .client
            .post(&self.api_base_url)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                error!(url = %self.api_base_url, error = %e, "chat HTTP request failed (transport)");
                ProviderError::Request(e.to_string())
            })?;

        let response = check_status(response).await?;
        Ok(SseStream::new(response))
    }
}

// ── Reply stream ──────────────────────────────────────────────────────────────

/// Pull-based view over the SSE response body.
///
/// Fragments arrive in order; `[DONE]` closes the stream. A connection that
/// ends without `[DONE]` is reported as an interrupted stream, never as a
/// complete reply. Dropping the stream aborts the request.
pub struct SseStream {
    response: reqwest::Response,
    buffer: String,
    done: bool,
}

impl SseStream {
    fn new(response: reqwest::Response) -> Self {
        Self { response, buffer: String::new(), done: false }
    }

    /// Next `delta.content` fragment, or `None` once the server sent `[DONE]`.
    pub async fn next_fragment(&mut self) -> Result<Option<String>, ProviderError> {
        loop {
            while let Some(pos) = self.buffer.find('\n') {
                let mut line: String = self.buffer.drain(..=pos).collect();
                line.truncate(line.trim_end_matches(['\n', '\r']).len());

                match parse_sse_line(&line) {
                    SseEvent::Fragment(text) => return Ok(Some(text)),
                    SseEvent::Done => {
                        self.done = true;
                        return Ok(None);
                    }
                    SseEvent::Ignore => {}
                }
            }

            if self.done {
                return Ok(None);
            }

            match self.response.chunk().await {
                Ok(Some(bytes)) => {
                    self.buffer.push_str(&String::from_utf8_lossy(&bytes));
                }
                Ok(None) => {
                    // Body ended without [DONE] — the reply is truncated.
                    return Err(ProviderError::Stream(
                        "connection closed before the reply completed".into(),
                    ));
                }
                Err(e) => {
                    error!(error = %e, "chat stream read failed");
                    return Err(ProviderError::Stream(e.to_string()));
                }
            }
        }
    }
}

enum SseEvent {
    Fragment(String),
    Done,
    Ignore,
}

/// Decode one SSE line. Blank lines, comments, and deltas without content
/// (role announcements, finish chunks) are ignored.
fn parse_sse_line(line: &str) -> SseEvent {
    let Some(data) = line.strip_prefix("data:") else {
        return SseEvent::Ignore;
    };
    let data = data.trim();
    if data == "[DONE]" {
        return SseEvent::Done;
    }
    match serde_json::from_str::<StreamChunk>(data) {
        Ok(chunk) => chunk
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.delta.content)
            .filter(|s| !s.is_empty())
            .map_or(SseEvent::Ignore, SseEvent::Fragment),
        Err(e) => {
            debug!(error = %e, "skipping undecodable SSE data line");
            SseEvent::Ignore
        }
    }
}

// ── Private wire types ────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct StreamChunk {
    #[serde(default)]
    choices: Vec<StreamChoice>,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    #[serde(default)]
    delta: StreamDelta,
}

#[derive(Debug, Default, Deserialize)]
struct StreamDelta {
    #[serde(default)]
    content: Option<String>,
}

// Error envelope used by OpenAI and compatible APIs.
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
    #[serde(default)]
    code: Option<serde_json::Value>,
}

/// Consume the response and return it if successful, or a structured error.
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ProviderError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "<failed to read error body>".to_string());

    let message = if let Ok(env) = serde_json::from_str::<ErrorEnvelope>(&body) {
        let code = env
            .error
            .code
            .map(|v| match v {
                serde_json::Value::String(s) => format!(" [code={s}]"),
                other => format!(" [code={other}]"),
            })
            .unwrap_or_default();
        format!("HTTP {status}{code}: {}", env.error.message)
    } else {
        format!("HTTP {status}: {body}")
    };

    error!(%status, %message, "chat request returned HTTP error");
    Err(ProviderError::Request(message))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_line_with_content_is_a_fragment() {
        let line = r#"data: {"choices":[{"delta":{"content":"Hel"}}]}"#;
        match parse_sse_line(line) {
            SseEvent::Fragment(text) => assert_eq!(text, "Hel"),
            _ => panic!("expected a fragment"),
        }
    }

    #[test]
    fn done_marker_closes_the_stream() {
        assert!(matches!(parse_sse_line("data: [DONE]"), SseEvent::Done));
    }

    #[test]
    fn role_announcement_and_finish_chunks_are_ignored() {
        let role = r#"data: {"choices":[{"delta":{"role":"assistant"}}]}"#;
        assert!(matches!(parse_sse_line(role), SseEvent::Ignore));

        let finish = r#"data: {"choices":[{"delta":{},"finish_reason":"stop"}]}"#;
        assert!(matches!(parse_sse_line(finish), SseEvent::Ignore));
    }

    #[test]
    fn comments_blanks_and_other_fields_are_ignored() {
        assert!(matches!(parse_sse_line(""), SseEvent::Ignore));
        assert!(matches!(parse_sse_line(": keep-alive"), SseEvent::Ignore));
        assert!(matches!(parse_sse_line("event: ping"), SseEvent::Ignore));
    }

    #[test]
    fn undecodable_data_lines_are_skipped() {
        assert!(matches!(parse_sse_line("data: not json"), SseEvent::Ignore));
    }

    #[test]
    fn request_serializes_history_and_stream_flag() {
        let payload = ChatCompletionRequest {
            model: "m".into(),
            messages: vec![ChatMessage::user("hi")],
            temperature: Some(0.2),
            stream: true,
        };
        let json = serde_json::to_string(&payload).unwrap();
        assert!(json.contains(r#""stream":true"#));
        assert!(json.contains(r#""role":"user""#));
        assert!(json.contains(r#""content":"hi""#));
    }
}
