//! Place suggestions from Nominatim
//!
//! `GET {base}/search?format=json&q=<query>&countrycodes=<codes>`. Results
//! carry latitude and longitude as strings; entries that do not parse are
//! dropped.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;

use crate::config::MapsConfig;
use crate::error::{FairfareError, Result};
use crate::models::Coordinates;

/// Queries shorter than this return no suggestions
pub const MIN_QUERY_LEN: usize = 3;

/// A named location that can start or end a route
#[derive(Debug, Clone, PartialEq)]
pub struct PlaceSuggestion {
    pub display_name: String,
    pub coordinates: Coordinates,
}

#[derive(Debug, Deserialize)]
struct NominatimResult {
    display_name: String,
    lat: String,
    lon: String,
}

impl NominatimResult {
    fn into_suggestion(self) -> Option<PlaceSuggestion> {
        let lat = self.lat.trim().parse().ok()?;
        let lng = self.lon.trim().parse().ok()?;
        Some(PlaceSuggestion {
            display_name: self.display_name,
            coordinates: Coordinates::new(lat, lng),
        })
    }
}

/// Nominatim search client
#[derive(Debug, Clone)]
pub struct PlaceSearch {
    client: Client,
    base: String,
    country_codes: String,
}

impl PlaceSearch {
    /// Create a new place search client
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails
    pub fn new(config: &MapsConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(concat!("fairfare/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FairfareError::Remote(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self {
            client,
            base: config.nominatim_base.trim_end_matches('/').to_string(),
            country_codes: config.country_codes.clone(),
        })
    }

    /// Suggestions for `query`; empty without a request when the query is
    /// shorter than [`MIN_QUERY_LEN`] characters.
    pub async fn suggest(&self, query: &str) -> Result<Vec<PlaceSuggestion>> {
        let query = query.trim();
        if query.chars().count() < MIN_QUERY_LEN {
            return Ok(Vec::new());
        }

        let url = format!("{}/search", self.base);
        tracing::debug!("Searching places for {:?}", query);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("format", "json"),
                ("q", query),
                ("countrycodes", self.country_codes.as_str()),
            ])
            .send()
            .await
            .map_err(|e| {
                tracing::warn!("Place search failed: {}", e);
                FairfareError::Remote(format!("Place search failed: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(
                FairfareError::Remote(format!("Place search returned {}", status)).into(),
            );
        }

        let results: Vec<NominatimResult> = response.json().await.map_err(|e| {
            FairfareError::NotFound(format!("malformed place search response: {}", e))
        })?;

        Ok(results
            .into_iter()
            .filter_map(NominatimResult::into_suggestion)
            .collect())
    }
}
