//! In-memory tip source
//!
//! Stands in for the backend: tips live in memory, new tips get an epoch
//! millisecond id, and every call can be delayed to simulate network
//! latency. Failures can be switched on per operation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;

use crate::error::{FairfareError, Result};
use crate::models::{Coordinates, NewTip, Tip, TipId, TransportMode, User};
use crate::remote::TipSource;
use crate::session::SessionContext;

/// Author snapshot for a first tip
const NEW_CONTRIBUTOR_SCORE: i64 = 1;
const NEW_CONTRIBUTOR_BADGE: &str = "New Contributor";

/// The community tips every fresh instance starts with
pub fn seed_tips() -> Vec<Tip> {
    vec![
        Tip {
            id: 1,
            origin: "Indira Gandhi International Airport (DEL)".to_string(),
            destination: "New Delhi Metro Station".to_string(),
            transport_mode: TransportMode::Metro,
            estimated_cost: "₹60".to_string(),
            estimated_time: "25 minutes".to_string(),
            advice: "Use the Airport Express Line (Orange Line) for a fast and cheap ride to the city center. It's much better than dealing with taxi or auto-rickshaw touts at the airport.".to_string(),
            user: User::new("MetroManMohan", 180, &["Metro Master", "Top Contributor"]),
            rating: 32,
            coordinates: Some(Coordinates::new(28.5562, 77.1000)),
        },
        Tip {
            id: 2,
            origin: "Connaught Place".to_string(),
            destination: "Chandni Chowk".to_string(),
            transport_mode: TransportMode::AutoRickshaw,
            estimated_cost: "₹80-120".to_string(),
            estimated_time: "15-20 minutes".to_string(),
            advice: "Negotiate the fare *before* getting into an auto-rickshaw, or use a ride-hailing app like Uber or Ola to book one for a fixed price. The traffic can be heavy, but it's a classic Delhi experience.".to_string(),
            user: User::new("DelhiExplorerPriya", 110, &["Bargain Hunter"]),
            rating: 25,
            coordinates: Some(Coordinates::new(28.6304, 77.2177)),
        },
        Tip {
            id: 3,
            origin: "Central Delhi".to_string(),
            destination: "Various Locations".to_string(),
            transport_mode: TransportMode::Bus,
            estimated_cost: "₹5-25".to_string(),
            estimated_time: "Varies".to_string(),
            advice: "Delhi's DTC buses are incredibly cheap, especially the AC ones. Use a transit app like Google Maps to figure out routes. It's a great way to see the city like a local.".to_string(),
            user: User::new("LocalSaverRavi", 90, &["Frugal Traveler", "Route Wizard"]),
            rating: 18,
            coordinates: Some(Coordinates::new(28.6139, 77.2090)),
        },
    ]
}

/// Tip source held entirely in memory
#[derive(Debug, Default)]
pub struct MockTipSource {
    tips: Mutex<Vec<Tip>>,
    latency: Duration,
    fail_fetch: AtomicBool,
    fail_create: AtomicBool,
    fail_ratings: AtomicBool,
}

impl MockTipSource {
    /// Empty source
    pub fn new() -> Self {
        Self::default()
    }

    /// Source holding [`seed_tips`]
    pub fn seeded() -> Self {
        Self::with_tips(seed_tips())
    }

    pub fn with_tips(tips: Vec<Tip>) -> Self {
        Self {
            tips: Mutex::new(tips),
            ..Self::default()
        }
    }

    /// Delay every call by `latency`
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn set_fail_fetch(&self, fail: bool) {
        self.fail_fetch.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_create(&self, fail: bool) {
        self.fail_create.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_ratings(&self, fail: bool) {
        self.fail_ratings.store(fail, Ordering::SeqCst);
    }

    /// Rating the source currently holds for `tip_id`
    pub fn rating_of(&self, tip_id: TipId) -> Option<i64> {
        self.tips
            .lock()
            .ok()?
            .iter()
            .find(|t| t.id == tip_id)
            .map(|t| t.rating)
    }

    async fn simulate_latency(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Vec<Tip>>> {
        self.tips
            .lock()
            .map_err(|_| FairfareError::Remote("mock tip store poisoned".to_string()).into())
    }
}

#[async_trait]
impl TipSource for MockTipSource {
    async fn fetch_all(&self) -> Result<Vec<Tip>> {
        tracing::debug!("Fetching tips from mock source");
        self.simulate_latency().await;
        if self.fail_fetch.load(Ordering::SeqCst) {
            return Err(FairfareError::Remote("tip fetch failed".to_string()).into());
        }
        Ok(self.lock()?.clone())
    }

    async fn create(
        &self,
        new_tip: &NewTip,
        coordinates: Option<Coordinates>,
        session: &SessionContext,
    ) -> Result<Tip> {
        let (profile, _token) = session.require()?;
        new_tip.validate()?;
        self.simulate_latency().await;
        if self.fail_create.load(Ordering::SeqCst) {
            return Err(FairfareError::Remote("tip creation failed".to_string()).into());
        }

        let username = if profile.name.trim().is_empty() {
            "Anonymous".to_string()
        } else {
            profile.name.clone()
        };

        let mut tips = self.lock()?;
        let mut id = Utc::now().timestamp_millis();
        while tips.iter().any(|t| t.id == id) {
            id += 1;
        }

        let tip = Tip {
            id,
            origin: new_tip.origin.clone(),
            destination: new_tip.destination.clone(),
            transport_mode: new_tip.transport_mode,
            estimated_cost: new_tip.estimated_cost.clone(),
            estimated_time: new_tip.estimated_time.clone(),
            advice: new_tip.advice.clone(),
            user: User::new(username, NEW_CONTRIBUTOR_SCORE, &[NEW_CONTRIBUTOR_BADGE]),
            rating: 0,
            coordinates,
        };
        tips.insert(0, tip.clone());
        tracing::info!(tip_id = tip.id, "Mock source created tip");
        Ok(tip)
    }

    async fn update_rating(
        &self,
        tip_id: TipId,
        delta: i64,
        _session: &SessionContext,
    ) -> Result<()> {
        tracing::debug!(tip_id, delta, "Updating rating on mock source");
        self.simulate_latency().await;
        if self.fail_ratings.load(Ordering::SeqCst) {
            return Err(FairfareError::Remote("rating update rejected".to_string()).into());
        }

        let mut tips = self.lock()?;
        let tip = tips
            .iter_mut()
            .find(|t| t.id == tip_id)
            .ok_or_else(|| FairfareError::NotFound(format!("tip {}", tip_id)))?;
        tip.rating += delta;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GoogleUser;
    use crate::session::MemorySlotStore;

    fn signed_in(name: &str) -> SessionContext {
        let store = MemorySlotStore::new();
        SessionContext::establish(
            &store,
            GoogleUser {
                name: name.to_string(),
                email: "x@example.com".to_string(),
                picture: String::new(),
            },
            "tok".to_string(),
        )
        .unwrap()
    }

    fn new_tip() -> NewTip {
        NewTip {
            origin: "Gateway of India".to_string(),
            destination: "Elephanta Caves".to_string(),
            transport_mode: TransportMode::Ferry,
            estimated_cost: "₹260 return".to_string(),
            estimated_time: "1 hour".to_string(),
            advice: "Take the first ferry at 9 AM to beat the crowds.".to_string(),
        }
    }

    #[tokio::test]
    async fn test_fetch_all_returns_seed() {
        let source = MockTipSource::seeded();
        let tips = source.fetch_all().await.unwrap();
        assert_eq!(tips.len(), 3);
        assert_eq!(tips[0].user.username, "MetroManMohan");
    }

    #[tokio::test]
    async fn test_create_requires_session() {
        let source = MockTipSource::seeded();
        let err = source
            .create(&new_tip(), None, &SessionContext::anonymous())
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<FairfareError>(),
            Some(FairfareError::Authentication(_))
        ));
    }

    #[tokio::test]
    async fn test_create_assigns_new_contributor_snapshot() {
        let source = MockTipSource::seeded();
        let coords = Coordinates::new(18.9220, 72.8347);
        let tip = source
            .create(&new_tip(), Some(coords), &signed_in("Asha"))
            .await
            .unwrap();

        assert_eq!(tip.rating, 0);
        assert_eq!(tip.user.username, "Asha");
        assert_eq!(tip.user.score, 1);
        assert_eq!(tip.user.badges, vec!["New Contributor"]);
        assert_eq!(tip.coordinates, Some(coords));
        assert!(tip.id > 3);
    }

    #[tokio::test]
    async fn test_create_blank_name_is_anonymous() {
        let source = MockTipSource::new();
        let tip = source
            .create(&new_tip(), None, &signed_in(""))
            .await
            .unwrap();
        assert_eq!(tip.user.username, "Anonymous");
    }

    #[tokio::test]
    async fn test_back_to_back_creates_get_distinct_ids() {
        let source = MockTipSource::new();
        let session = signed_in("Asha");
        let a = source.create(&new_tip(), None, &session).await.unwrap();
        let b = source.create(&new_tip(), None, &session).await.unwrap();
        assert_ne!(a.id, b.id);
    }

    #[tokio::test]
    async fn test_update_rating_and_failure_injection() {
        let source = MockTipSource::seeded();
        let session = SessionContext::anonymous();
        source.update_rating(1, 1, &session).await.unwrap();
        assert_eq!(source.rating_of(1), Some(33));

        source.set_fail_ratings(true);
        assert!(source.update_rating(1, 1, &session).await.is_err());
        assert_eq!(source.rating_of(1), Some(33));
    }

    #[tokio::test]
    async fn test_update_rating_unknown_tip() {
        let source = MockTipSource::seeded();
        assert!(source
            .update_rating(99, 1, &SessionContext::anonymous())
            .await
            .is_err());
    }
}
