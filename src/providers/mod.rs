//! Provider module for FairFare
//!
//! This module contains the AI provider abstraction used for geocoding
//! tip origins and for the FareGuide chat, plus the Gemini implementation
//! and an in-process fake.

pub mod fake;
pub mod gemini;
pub mod sse;

pub use fake::FakeProvider;
pub use gemini::GeminiProvider;

use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;
use futures::Stream;

use crate::config::GeminiConfig;
use crate::error::Result;
use crate::models::{Coordinates, Tip};

/// Fragment shown in place of a reply when the chat stream fails
pub const CHAT_APOLOGY: &str = "I'm sorry, I encountered an error while trying to respond. Please check the connection and try again.";

/// Finite stream of reply fragments; consumed once
pub type TextStream = Pin<Box<dyn Stream<Item = String> + Send>>;

/// Address → coordinates lookup
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Resolve `address` to coordinates.
    ///
    /// Returns `Ok(None)` when the service answers but the answer is not a
    /// usable coordinate pair.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::FairfareError::Provider`] when the service
    /// cannot be reached or rejects the request.
    async fn geocode(&self, address: &str) -> Result<Option<Coordinates>>;
}

/// Streaming assistant replies
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Stream a reply to `message` with `context_tips` as grounding.
    ///
    /// Failures are not errors: the stream yields [`CHAT_APOLOGY`] and ends.
    async fn stream_reply(&self, message: &str, context_tips: &[Tip]) -> TextStream;
}

/// Create the Gemini provider based on configuration
///
/// # Errors
///
/// Returns error if no API key is configured or the HTTP client cannot be
/// built
pub fn create_provider(config: &GeminiConfig) -> Result<Arc<GeminiProvider>> {
    Ok(Arc::new(GeminiProvider::new(config.clone())?))
}
