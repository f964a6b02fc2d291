//! In-process fake provider for unit and integration tests
//!
//! [`FakeProvider`] answers geocoding requests from a fixed address table
//! and streams a scripted reply fragment by fragment. It records every
//! chat prompt it receives.
//!
//! # Example
//!
//! ```
//! use fairfare::models::Coordinates;
//! use fairfare::providers::{ChatProvider, FakeProvider, Geocoder};
//! use futures::StreamExt;
//!
//! # tokio_test::block_on(async {
//! let provider = FakeProvider::new()
//!     .with_place("Howrah Station", Coordinates::new(22.5839, 88.3425))
//!     .with_reply(&["Take ", "the ferry."]);
//!
//! let coords = provider.geocode("Howrah Station").await.unwrap();
//! assert_eq!(coords, Some(Coordinates::new(22.5839, 88.3425)));
//!
//! let reply: Vec<String> = provider.stream_reply("How?", &[]).await.collect().await;
//! assert_eq!(reply.concat(), "Take the ferry.");
//! # });
//! ```

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{FairfareError, Result};
use crate::models::{Coordinates, Tip};
use crate::providers::{ChatProvider, Geocoder, TextStream, CHAT_APOLOGY};

/// Scripted provider
#[derive(Debug, Default)]
pub struct FakeProvider {
    places: HashMap<String, Coordinates>,
    reply: Vec<String>,
    fail_geocode: AtomicBool,
    fail_chat: AtomicBool,
    prompts: Mutex<Vec<(String, usize)>>,
}

impl FakeProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve `address` (case-insensitive) to `coordinates`
    pub fn with_place(mut self, address: &str, coordinates: Coordinates) -> Self {
        self.places.insert(address.to_lowercase(), coordinates);
        self
    }

    /// Fragments streamed for every chat message
    pub fn with_reply(mut self, fragments: &[&str]) -> Self {
        self.reply = fragments.iter().map(|f| f.to_string()).collect();
        self
    }

    pub fn set_fail_geocode(&self, fail: bool) {
        self.fail_geocode.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_chat(&self, fail: bool) {
        self.fail_chat.store(fail, Ordering::SeqCst);
    }

    /// Messages received so far, with the number of context tips each carried
    pub fn received(&self) -> Vec<(String, usize)> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Geocoder for FakeProvider {
    async fn geocode(&self, address: &str) -> Result<Option<Coordinates>> {
        if self.fail_geocode.load(Ordering::SeqCst) {
            return Err(FairfareError::Provider("geocoder unavailable".to_string()).into());
        }
        Ok(self.places.get(&address.to_lowercase()).copied())
    }
}

#[async_trait]
impl ChatProvider for FakeProvider {
    async fn stream_reply(&self, message: &str, context_tips: &[Tip]) -> TextStream {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push((message.to_string(), context_tips.len()));
        }

        let fragments = if self.fail_chat.load(Ordering::SeqCst) {
            vec![CHAT_APOLOGY.to_string()]
        } else {
            self.reply.clone()
        };
        Box::pin(futures::stream::iter(fragments))
    }
}
