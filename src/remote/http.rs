//! REST tip source
//!
//! Endpoints, relative to the configured API base:
//!
//! - `GET  /api/tips` -- full collection
//! - `POST /api/tips` -- create (bearer session token required)
//! - `PUT  /api/tips/{id}/rating` -- `{"change": <delta>}`

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Serialize;

use crate::config::TipSourceConfig;
use crate::error::{FairfareError, Result};
use crate::models::{Coordinates, NewTip, Tip, TipId};
use crate::remote::TipSource;
use crate::session::SessionContext;

/// Tip source backed by the FairFare REST API
#[derive(Debug, Clone)]
pub struct HttpTipSource {
    client: Client,
    api_base: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateTipRequest<'a> {
    #[serde(flatten)]
    tip: &'a NewTip,
    #[serde(skip_serializing_if = "Option::is_none")]
    coordinates: Option<Coordinates>,
}

#[derive(Debug, Serialize)]
struct RatingRequest {
    change: i64,
}

impl HttpTipSource {
    /// Create a new REST tip source
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails
    pub fn new(config: &TipSourceConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(concat!("fairfare/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FairfareError::Remote(format!("Failed to create HTTP client: {}", e)))?;

        tracing::info!("Initialized HTTP tip source: base={}", config.api_base);

        Ok(Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_base, path)
    }

    fn authorize(request: RequestBuilder, session: &SessionContext) -> RequestBuilder {
        match session.token() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send(request: RequestBuilder, what: &str) -> Result<Response> {
        let response = request.send().await.map_err(|e| {
            tracing::warn!("Failed to reach tip API for {}: {}", what, e);
            FairfareError::Remote(format!("Failed to reach tip API: {}", e))
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        tracing::error!("Tip API returned {} for {}: {}", status, what, body);
        let err = match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                FairfareError::Authentication(format!("{} rejected: {}", what, status))
            }
            StatusCode::NOT_FOUND => FairfareError::NotFound(what.to_string()),
            _ => FairfareError::Remote(format!("{} failed with {}: {}", what, status, body)),
        };
        Err(err.into())
    }
}

#[async_trait]
impl TipSource for HttpTipSource {
    async fn fetch_all(&self) -> Result<Vec<Tip>> {
        let url = self.url("/api/tips");
        tracing::debug!("Fetching tips: {}", url);
        let response = Self::send(self.client.get(&url), "fetch tips").await?;
        let tips: Vec<Tip> = response.json().await.map_err(|e| {
            FairfareError::NotFound(format!("malformed tip list response: {}", e))
        })?;
        tracing::info!(count = tips.len(), "Fetched tips");
        Ok(tips)
    }

    async fn create(
        &self,
        new_tip: &NewTip,
        coordinates: Option<Coordinates>,
        session: &SessionContext,
    ) -> Result<Tip> {
        session.require()?;
        new_tip.validate()?;

        let url = self.url("/api/tips");
        tracing::debug!("Creating tip: {}", url);
        let body = CreateTipRequest {
            tip: new_tip,
            coordinates,
        };
        let request = Self::authorize(self.client.post(&url).json(&body), session);
        let response = Self::send(request, "create tip").await?;
        let tip: Tip = response.json().await.map_err(|e| {
            FairfareError::NotFound(format!("malformed created tip response: {}", e))
        })?;
        Ok(tip)
    }

    async fn update_rating(
        &self,
        tip_id: TipId,
        delta: i64,
        session: &SessionContext,
    ) -> Result<()> {
        let url = self.url(&format!("/api/tips/{}/rating", tip_id));
        tracing::debug!(tip_id, delta, "Updating rating: {}", url);
        let request = Self::authorize(
            self.client.put(&url).json(&RatingRequest { change: delta }),
            session,
        );
        Self::send(request, "update rating").await?;
        Ok(())
    }
}
