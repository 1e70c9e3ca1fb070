//! Dummy backend — echoes the last user message back in word fragments.
//! Used to exercise the full session loop without a network or API key.

use std::collections::VecDeque;

use crate::llm::{ChatMessage, ProviderError, Role};

#[derive(Debug, Clone)]
pub struct DummyProvider;

impl DummyProvider {
    pub fn stream_chat(&self, history: &[ChatMessage]) -> DummyStream {
        let last_user = history
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.as_str())
            .unwrap_or_default();
        DummyStream::new(&format!("[echo] {last_user}"))
    }
}

/// Pre-split reply, one word (with trailing whitespace) per fragment, so the
/// consumer sees the same shape a real streamed reply has.
pub struct DummyStream {
    fragments: VecDeque<String>,
}

impl DummyStream {
    fn new(reply: &str) -> Self {
        Self {
            fragments: reply.split_inclusive(' ').map(str::to_string).collect(),
        }
    }

    pub async fn next_fragment(&mut self) -> Result<Option<String>, ProviderError> {
        Ok(self.fragments.pop_front())
    }
}
