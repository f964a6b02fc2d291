//! Cross-instance tip broadcast
//!
//! Newly created tips are published on a named channel so that every other
//! open instance of the application can merge them into its own collection.
//! Delivery is best-effort: there is no acknowledgment, no retry and no
//! ordering beyond what the underlying channel provides. Merging is the
//! receiver's job and is idempotent by tip id (see
//! [`TipStore::merge_broadcast`](crate::store::TipStore::merge_broadcast)).
//!
//! The [`TipBroadcast`] trait keeps callers independent of the transport.
//! [`BroadcastHub`] provides a process-local implementation backed by
//! `tokio::sync::broadcast`, one channel per name.
//!
//! # Example
//!
//! ```
//! use fairfare::broadcast::{BroadcastHub, TipBroadcast};
//! use fairfare::remote::mock::seed_tips;
//! use futures::StreamExt;
//!
//! # #[tokio::main]
//! # async fn main() -> fairfare::error::Result<()> {
//! let hub = BroadcastHub::new();
//! let tab_a = hub.channel("fairfare_tips")?;
//! let tab_b = hub.channel("fairfare_tips")?;
//!
//! let mut inbox = tab_b.subscribe();
//! let tip = seed_tips().remove(0);
//! tab_a.publish(&tip)?;
//!
//! assert_eq!(inbox.next().await.map(|t| t.id), Some(tip.id));
//! # Ok(())
//! # }
//! ```

use std::collections::HashMap;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use futures::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;
use uuid::Uuid;

use crate::error::{FairfareError, Result};
use crate::models::Tip;

/// Default channel name shared by every instance
pub const DEFAULT_CHANNEL: &str = "fairfare_tips";

/// Messages buffered per channel before slow subscribers start lagging
const CHANNEL_CAPACITY: usize = 64;

/// Stream of tips published by other instances
pub type TipSubscription = Pin<Box<dyn Stream<Item = Tip> + Send>>;

/// Publish/subscribe interface for newly created tips
pub trait TipBroadcast: Send + Sync + std::fmt::Debug {
    /// Name of the channel this endpoint is attached to
    fn channel_name(&self) -> &str;

    /// Publish a tip to every other subscriber of the channel.
    ///
    /// Having no subscribers is not an error.
    fn publish(&self, tip: &Tip) -> Result<()>;

    /// Subscribe to tips published by other endpoints.
    ///
    /// Tips published through this same endpoint are never delivered back.
    fn subscribe(&self) -> TipSubscription;
}

/// Message carried on the wire
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TipEnvelope {
    /// Instance that published the tip
    pub origin: Uuid,
    pub tip: Tip,
}

/// Process-local registry of named broadcast channels
#[derive(Debug, Clone, Default)]
pub struct BroadcastHub {
    channels: Arc<Mutex<HashMap<String, broadcast::Sender<TipEnvelope>>>>,
}

impl BroadcastHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a new endpoint (one per application instance) to `name`.
    ///
    /// The channel is created on first use.
    ///
    /// # Errors
    ///
    /// Returns [`FairfareError::Broadcast`] for an empty name or a poisoned
    /// registry.
    pub fn channel(&self, name: &str) -> Result<LocalBroadcast> {
        if name.trim().is_empty() {
            return Err(
                FairfareError::Broadcast("channel name cannot be empty".to_string()).into(),
            );
        }

        let mut channels = self
            .channels
            .lock()
            .map_err(|_| FairfareError::Broadcast("channel registry poisoned".to_string()))?;

        let sender = channels
            .entry(name.to_string())
            .or_insert_with(|| {
                tracing::debug!(channel = name, "Opening broadcast channel");
                broadcast::channel(CHANNEL_CAPACITY).0
            })
            .clone();

        Ok(LocalBroadcast {
            name: name.to_string(),
            instance: Uuid::new_v4(),
            sender,
        })
    }
}

/// One instance's endpoint on a [`BroadcastHub`] channel
#[derive(Debug, Clone)]
pub struct LocalBroadcast {
    name: String,
    instance: Uuid,
    sender: broadcast::Sender<TipEnvelope>,
}

impl LocalBroadcast {
    /// Identifier stamped on every envelope this endpoint publishes
    pub fn instance_id(&self) -> Uuid {
        self.instance
    }
}

impl TipBroadcast for LocalBroadcast {
    fn channel_name(&self) -> &str {
        &self.name
    }

    fn publish(&self, tip: &Tip) -> Result<()> {
        let envelope = TipEnvelope {
            origin: self.instance,
            tip: tip.clone(),
        };
        match self.sender.send(envelope) {
            Ok(receivers) => {
                tracing::debug!(channel = %self.name, tip_id = tip.id, receivers, "Published tip");
            }
            Err(_) => {
                tracing::debug!(channel = %self.name, tip_id = tip.id, "Published tip with no subscribers");
            }
        }
        Ok(())
    }

    fn subscribe(&self) -> TipSubscription {
        let own = self.instance;
        let channel = self.name.clone();
        let stream = BroadcastStream::new(self.sender.subscribe()).filter_map(move |item| {
            let tip = match item {
                Ok(envelope) if envelope.origin == own => None,
                Ok(envelope) => Some(envelope.tip),
                Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                    tracing::warn!(channel = %channel, skipped, "Broadcast subscriber lagged; tips dropped");
                    None
                }
            };
            futures::future::ready(tip)
        });
        Box::pin(stream)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{TransportMode, User};
    use std::time::Duration;

    fn tip(id: i64) -> Tip {
        Tip {
            id,
            origin: "Bandra".to_string(),
            destination: "Churchgate".to_string(),
            transport_mode: TransportMode::Train,
            estimated_cost: "₹10".to_string(),
            estimated_time: "35 minutes".to_string(),
            advice: "Board the fast local from platform 1 outside peak hours.".to_string(),
            user: User::new("MumbaiLocal", 1, &["New Contributor"]),
            rating: 0,
            coordinates: None,
        }
    }

    #[tokio::test]
    async fn test_other_instance_receives_tip() {
        let hub = BroadcastHub::new();
        let a = hub.channel(DEFAULT_CHANNEL).unwrap();
        let b = hub.channel(DEFAULT_CHANNEL).unwrap();
        let mut inbox = b.subscribe();

        a.publish(&tip(1)).unwrap();
        let received = tokio::time::timeout(Duration::from_secs(1), inbox.next())
            .await
            .unwrap();
        assert_eq!(received.map(|t| t.id), Some(1));
    }

    #[tokio::test]
    async fn test_publisher_does_not_hear_itself() {
        let hub = BroadcastHub::new();
        let a = hub.channel(DEFAULT_CHANNEL).unwrap();
        let b = hub.channel(DEFAULT_CHANNEL).unwrap();
        let mut own = a.subscribe();

        a.publish(&tip(1)).unwrap();
        b.publish(&tip(2)).unwrap();

        let received = tokio::time::timeout(Duration::from_secs(1), own.next())
            .await
            .unwrap();
        assert_eq!(received.map(|t| t.id), Some(2));
    }

    #[tokio::test]
    async fn test_channels_are_isolated_by_name() {
        let hub = BroadcastHub::new();
        let a = hub.channel("fairfare_tips").unwrap();
        let other = hub.channel("other").unwrap();
        let mut inbox = other.subscribe();

        a.publish(&tip(1)).unwrap();
        let received = tokio::time::timeout(Duration::from_millis(100), inbox.next()).await;
        assert!(received.is_err(), "no tip should cross channels");
    }

    #[test]
    fn test_publish_without_subscribers_is_ok() {
        let hub = BroadcastHub::new();
        let a = hub.channel(DEFAULT_CHANNEL).unwrap();
        assert!(a.publish(&tip(1)).is_ok());
    }

    #[test]
    fn test_empty_channel_name_rejected() {
        let hub = BroadcastHub::new();
        assert!(hub.channel("  ").is_err());
    }

    #[test]
    fn test_instances_have_distinct_ids() {
        let hub = BroadcastHub::new();
        let a = hub.channel(DEFAULT_CHANNEL).unwrap();
        let b = hub.channel(DEFAULT_CHANNEL).unwrap();
        assert_ne!(a.instance_id(), b.instance_id());
        assert_eq!(a.channel_name(), DEFAULT_CHANNEL);
    }
}
