//! Remote tip source
//!
//! The source of truth for tips: fetch everything, create a tip, and
//! update a tip's rating. There is no batching or pagination.
//!
//! - [`http::HttpTipSource`] talks to the FairFare REST API.
//! - [`mock::MockTipSource`] keeps tips in memory, seeded with community
//!   tips for Delhi; used for offline runs and tests.

pub mod http;
pub mod mock;

pub use http::HttpTipSource;
pub use mock::MockTipSource;

use async_trait::async_trait;

use crate::config::TipSourceConfig;
use crate::error::{FairfareError, Result};
use crate::models::{Coordinates, NewTip, Tip, TipId};
use crate::session::SessionContext;

/// Remote operations on the tip collection
#[async_trait]
pub trait TipSource: Send + Sync {
    /// Fetch the full tip collection
    async fn fetch_all(&self) -> Result<Vec<Tip>>;

    /// Create a tip authored by the signed-in user.
    ///
    /// # Errors
    ///
    /// Returns [`FairfareError::Authentication`] when `session` is signed
    /// out.
    async fn create(
        &self,
        new_tip: &NewTip,
        coordinates: Option<Coordinates>,
        session: &SessionContext,
    ) -> Result<Tip>;

    /// Apply a signed rating change to a tip
    async fn update_rating(
        &self,
        tip_id: TipId,
        delta: i64,
        session: &SessionContext,
    ) -> Result<()>;
}

/// Create a tip source based on configuration
///
/// # Errors
///
/// Returns error if the source kind is unknown or the HTTP client cannot be
/// built
pub fn create_tip_source(config: &TipSourceConfig) -> Result<Box<dyn TipSource>> {
    match config.kind.as_str() {
        "mock" => Ok(Box::new(MockTipSource::seeded().with_latency(
            std::time::Duration::from_millis(config.mock_latency_ms),
        ))),
        "http" => Ok(Box::new(HttpTipSource::new(config)?)),
        other => Err(FairfareError::Config(format!("Unknown tip source: {}", other)).into()),
    }
}
