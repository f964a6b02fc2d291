//! Gemini provider implementation
//!
//! Talks to the Generative Language REST API:
//!
//! - `POST {base}/models/{model}:generateContent` with a JSON response
//!   schema for geocoding.
//! - `POST {base}/models/{model}:streamGenerateContent?alt=sse` for chat;
//!   each SSE `data:` payload is a partial `GenerateContentResponse`.

use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;

use crate::config::GeminiConfig;
use crate::error::{FairfareError, Result};
use crate::models::{Coordinates, Tip};
use crate::prompts::{build_chat_prompt, build_geocode_prompt, FAREGUIDE_SYSTEM_INSTRUCTION};
use crate::providers::sse::SseDecoder;
use crate::providers::{ChatProvider, Geocoder, TextStream, CHAT_APOLOGY};

/// Gemini API provider
#[derive(Debug, Clone)]
pub struct GeminiProvider {
    client: Client,
    config: GeminiConfig,
    api_key: String,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<serde_json::Value>,
}

impl<'a> GenerateRequest<'a> {
    fn user_turn(text: &'a str) -> Self {
        Self {
            contents: vec![Content {
                role: Some("user"),
                parts: vec![Part { text }],
            }],
            system_instruction: None,
            generation_config: None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(default)]
    message: String,
}

impl GenerateResponse {
    /// Concatenated text of the first candidate
    fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect::<String>()
            })
            .unwrap_or_default()
    }
}

fn coordinates_schema() -> serde_json::Value {
    json!({
        "responseMimeType": "application/json",
        "responseSchema": {
            "type": "OBJECT",
            "properties": {
                "lat": { "type": "NUMBER", "description": "Latitude" },
                "lng": { "type": "NUMBER", "description": "Longitude" }
            },
            "required": ["lat", "lng"]
        }
    })
}

/// Read a `{"lat": <number>, "lng": <number>}` answer
fn parse_coordinates(text: &str) -> Option<Coordinates> {
    let value: serde_json::Value = serde_json::from_str(text.trim()).ok()?;
    let lat = value.get("lat").filter(|v| v.is_number())?.as_f64()?;
    let lng = value.get("lng").filter(|v| v.is_number())?.as_f64()?;
    Some(Coordinates::new(lat, lng))
}

impl GeminiProvider {
    /// Create a new Gemini provider
    ///
    /// # Errors
    ///
    /// Returns error if no API key is configured or HTTP client
    /// initialization fails
    pub fn new(config: GeminiConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                FairfareError::Config(
                    "Gemini API key not set (GEMINI_API_KEY or API_KEY)".to_string(),
                )
            })?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(concat!("fairfare/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FairfareError::Provider(format!("Failed to create HTTP client: {}", e)))?;

        tracing::info!("Initialized Gemini provider: model={}", config.model);

        Ok(Self {
            client,
            config,
            api_key,
        })
    }

    /// Model used for every request
    pub fn model(&self) -> &str {
        &self.config.model
    }

    fn endpoint(&self, method: &str) -> String {
        format!(
            "{}/models/{}:{}",
            self.config.api_base.trim_end_matches('/'),
            self.config.model,
            method
        )
    }
}

#[async_trait]
impl Geocoder for GeminiProvider {
    async fn geocode(&self, address: &str) -> Result<Option<Coordinates>> {
        let prompt = build_geocode_prompt(address);
        let mut request = GenerateRequest::user_turn(&prompt);
        request.generation_config = Some(coordinates_schema());

        let url = self.endpoint("generateContent");
        tracing::debug!("Sending geocode request for {:?}", address);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Gemini geocode request failed: {}", e);
                FairfareError::Provider(format!("Gemini request failed: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!("Gemini returned error {}: {}", status, error_text);
            return Err(FairfareError::Provider(format!(
                "Gemini returned error {}: {}",
                status, error_text
            ))
            .into());
        }

        let body: GenerateResponse = response.json().await.map_err(|e| {
            tracing::error!("Failed to parse Gemini response: {}", e);
            FairfareError::Provider(format!("Failed to parse Gemini response: {}", e))
        })?;

        let text = body.text();
        let coordinates = parse_coordinates(&text);
        if coordinates.is_none() {
            tracing::warn!("Failed to parse coordinates from Gemini response: {}", text);
        }
        Ok(coordinates)
    }
}

#[async_trait]
impl ChatProvider for GeminiProvider {
    async fn stream_reply(&self, message: &str, context_tips: &[Tip]) -> TextStream {
        let prompt = build_chat_prompt(message, context_tips);
        let mut request = GenerateRequest::user_turn(&prompt);
        request.system_instruction = Some(Content {
            role: None,
            parts: vec![Part {
                text: FAREGUIDE_SYSTEM_INSTRUCTION,
            }],
        });

        let url = format!("{}?alt=sse", self.endpoint("streamGenerateContent"));
        tracing::debug!(
            tips = context_tips.len(),
            "Opening chat stream: {}",
            self.config.model
        );

        let pending = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .header("Accept", "text/event-stream")
            .json(&request);

        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(async move {
            if let Err(e) = forward_reply(pending, &tx).await {
                tracing::error!("Error streaming chat response from Gemini: {}", e);
                let _ = tx.send(CHAT_APOLOGY.to_string());
            }
        });

        Box::pin(UnboundedReceiverStream::new(rx))
    }
}

/// Send the request and push every text fragment into `tx`
async fn forward_reply(
    request: reqwest::RequestBuilder,
    tx: &mpsc::UnboundedSender<String>,
) -> Result<()> {
    let response = request
        .send()
        .await
        .map_err(|e| FairfareError::Provider(format!("Gemini request failed: {}", e)))?;

    let status = response.status();
    if !status.is_success() {
        let error_text = response.text().await.unwrap_or_default();
        return Err(FairfareError::Provider(format!(
            "Gemini returned error {}: {}",
            status, error_text
        ))
        .into());
    }

    let mut decoder = SseDecoder::new();
    let mut byte_stream = response.bytes_stream();

    while let Some(chunk) = byte_stream.next().await {
        let chunk = chunk.map_err(|e| FairfareError::Provider(format!("stream interrupted: {}", e)))?;
        for data in decoder.push(&chunk) {
            forward_chunk(&data, tx)?;
        }
    }

    if let Some(data) = decoder.finish() {
        forward_chunk(&data, tx)?;
    }

    Ok(())
}

fn forward_chunk(data: &str, tx: &mpsc::UnboundedSender<String>) -> Result<()> {
    let chunk: GenerateResponse = serde_json::from_str(data)
        .map_err(|e| FairfareError::Provider(format!("malformed stream chunk: {}", e)))?;

    if let Some(error) = chunk.error {
        return Err(FairfareError::Provider(error.message).into());
    }

    let text = chunk.text();
    if !text.is_empty() && tx.send(text).is_err() {
        // Receiver dropped; the reader lost interest.
        tracing::debug!("Chat stream receiver closed");
    }
    Ok(())
}
