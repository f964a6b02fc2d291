//! Driving route summaries from OSRM
//!
//! `GET {base}/route/v1/driving/{lng},{lat};{lng},{lat}?overview=false`.
//! Only the first route's distance (metres) and duration (seconds) are used.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;

use crate::config::MapsConfig;
use crate::error::{FairfareError, Result};
use crate::models::Coordinates;

/// Distance and travel time of a route, ready for display
#[derive(Debug, Clone, PartialEq)]
pub struct RouteSummary {
    pub distance_meters: f64,
    pub duration_seconds: f64,
}

impl RouteSummary {
    /// Kilometres with two decimals, e.g. `"12.35 km"`
    pub fn distance(&self) -> String {
        format!("{:.2} km", self.distance_meters / 1000.0)
    }

    /// Whole minutes, e.g. `"18 minutes"`
    pub fn time(&self) -> String {
        format!("{} minutes", (self.duration_seconds / 60.0).round() as i64)
    }
}

#[derive(Debug, Deserialize)]
struct OsrmResponse {
    code: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    routes: Vec<OsrmRoute>,
}

#[derive(Debug, Deserialize)]
struct OsrmRoute {
    distance: f64,
    duration: f64,
}

/// OSRM client
#[derive(Debug, Clone)]
pub struct RoutePlanner {
    client: Client,
    base: String,
}

impl RoutePlanner {
    /// Create a new route planner
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
            base: config.osrm_base.trim_end_matches('/').to_string(),
        })
    }

    fn route_url(&self, from: Coordinates, to: Coordinates) -> String {
        format!(
            "{}/route/v1/driving/{},{};{},{}?overview=false",
            self.base, from.lng, from.lat, to.lng, to.lat
        )
    }

    /// Driving summary between two points
    ///
    /// # Errors
    ///
    /// Returns [`FairfareError::NotFound`] when no route exists and
    /// [`FairfareError::Remote`] when the service is unreachable.
    pub async fn route(&self, from: Coordinates, to: Coordinates) -> Result<RouteSummary> {
        let url = self.route_url(from, to);
        tracing::debug!("Requesting route: {}", url);

        let response = self.client.get(&url).send().await.map_err(|e| {
            tracing::warn!("Routing request failed: {}", e);
            FairfareError::Remote(format!("Routing request failed: {}", e))
        })?;

        // OSRM answers "no route" with a 400 and a JSON body.
        let status = response.status();
        let body: OsrmResponse = response.json().await.map_err(|e| {
            FairfareError::Remote(format!("Routing service returned {}: {}", status, e))
        })?;

        if body.code != "Ok" {
            let detail = body.message.unwrap_or(body.code);
            return Err(FairfareError::NotFound(format!("no route: {}", detail)).into());
        }

        body.routes
            .first()
            .map(|r| RouteSummary {
                distance_meters: r.distance,
                duration_seconds: r.duration,
            })
            .ok_or_else(|| FairfareError::NotFound("no route returned".to_string()).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_formatting() {
        let summary = RouteSummary {
            distance_meters: 12_345.6,
            duration_seconds: 1_080.0,
        };
        assert_eq!(summary.distance(), "12.35 km");
        assert_eq!(summary.time(), "18 minutes");
    }

    #[test]
    fn test_time_rounds_to_nearest_minute() {
        let summary = RouteSummary {
            distance_meters: 0.0,
            duration_seconds: 89.0,
        };
        assert_eq!(summary.time(), "1 minutes");
        assert_eq!(summary.distance(), "0.00 km");
    }

    #[test]
    fn test_route_url_is_lng_lat() {
        let planner = RoutePlanner::new(&MapsConfig::default()).unwrap();
        let url = planner.route_url(
            Coordinates::new(28.5562, 77.1),
            Coordinates::new(28.6304, 77.2177),
        );
        assert_eq!(
            url,
            "https://router.project-osrm.org/route/v1/driving/77.1,28.5562;77.2177,28.6304?overview=false"
        );
    }
}
