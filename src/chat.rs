//! FareGuide chat session
//!
//! Holds the append-only conversation shown in the chat window. Sending a
//! message appends the user turn and an empty model placeholder, then fills
//! the placeholder fragment by fragment as the provider streams.

use futures::StreamExt;

use crate::error::UserAction;
use crate::models::{ChatMessage, ChatRole, Tip};
use crate::providers::ChatProvider;

/// First message of every session
pub const GREETING: &str = "Hello! I am FareGuide, your AI travel assistant. Ask me about the tips on your screen or any other travel questions you have!";

/// In-memory chat transcript
#[derive(Debug, Clone)]
pub struct ChatSession {
    messages: Vec<ChatMessage>,
    loading: bool,
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatSession {
    pub fn new() -> Self {
        Self {
            messages: vec![ChatMessage::model(GREETING)],
            loading: false,
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// True while a reply is streaming
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Start a turn. Returns `false` (and changes nothing) for blank input
    /// or while a reply is still streaming.
    pub fn begin(&mut self, input: &str) -> bool {
        let input = input.trim();
        if input.is_empty() || self.loading {
            return false;
        }
        self.messages.push(ChatMessage::user(input));
        self.messages.push(ChatMessage::model(""));
        self.loading = true;
        true
    }

    /// Append a streamed fragment to the model placeholder
    pub fn push_fragment(&mut self, fragment: &str) {
        if let Some(last) = self.messages.last_mut() {
            if last.role == ChatRole::Model {
                last.content.push_str(fragment);
            }
        }
    }

    /// Close the turn; an empty reply becomes the connection banner
    pub fn finish(&mut self) {
        if let Some(last) = self.messages.last_mut() {
            if last.role == ChatRole::Model && last.content.is_empty() {
                tracing::warn!("Chat reply was empty");
                last.content = UserAction::Chat.banner().to_string();
            }
        }
        self.loading = false;
    }

    /// Send `input` and stream the reply, calling `on_fragment` per fragment.
    ///
    /// Returns the complete reply, or `None` when the input was ignored.
    pub async fn send_with<F>(
        &mut self,
        provider: &dyn ChatProvider,
        input: &str,
        context_tips: &[Tip],
        mut on_fragment: F,
    ) -> Option<String>
    where
        F: FnMut(&str) + Send,
    {
        if !self.begin(input) {
            return None;
        }

        let question = input.trim().to_string();
        tracing::debug!(tips = context_tips.len(), "Sending chat message");
        let mut stream = provider.stream_reply(&question, context_tips).await;
        while let Some(fragment) = stream.next().await {
            on_fragment(&fragment);
            self.push_fragment(&fragment);
        }
        self.finish();

        self.messages.last().map(|m| m.content.clone())
    }

    /// Send `input` and collect the whole reply
    pub async fn send(
        &mut self,
        provider: &dyn ChatProvider,
        input: &str,
        context_tips: &[Tip],
    ) -> Option<String> {
        self.send_with(provider, input, context_tips, |_| {}).await
    }
}
