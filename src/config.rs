//! Configuration management for FairFare
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.

use crate::error::{FairfareError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure for FairFare
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Where tips come from
    #[serde(default)]
    pub tips: TipSourceConfig,
    /// Identity verification settings
    #[serde(default)]
    pub auth: AuthConfig,
    /// Gemini settings for geocoding and chat
    #[serde(default)]
    pub gemini: GeminiConfig,
    /// Cross-instance broadcast settings
    #[serde(default)]
    pub broadcast: BroadcastConfig,
    /// Session persistence settings
    #[serde(default)]
    pub session: SessionConfig,
    /// Place search and routing services
    #[serde(default)]
    pub maps: MapsConfig,
}

/// Tip source configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TipSourceConfig {
    /// Source kind: "mock" or "http"
    #[serde(default = "default_tip_source")]
    pub kind: String,

    /// Base URL of the FairFare REST API
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Request timeout (seconds)
    #[serde(default = "default_request_timeout")]
    pub timeout_seconds: u64,

    /// Simulated latency of the mock source (milliseconds)
    #[serde(default = "default_mock_latency")]
    pub mock_latency_ms: u64,
}

fn default_tip_source() -> String {
    "mock".to_string()
}

fn default_api_base() -> String {
    "http://localhost:8080".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

fn default_mock_latency() -> u64 {
    200
}

impl Default for TipSourceConfig {
    fn default() -> Self {
        Self {
            kind: default_tip_source(),
            api_base: default_api_base(),
            timeout_seconds: default_request_timeout(),
            mock_latency_ms: default_mock_latency(),
        }
    }
}

/// Identity verification configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Verifier kind: "local" or "http"
    #[serde(default = "default_verifier")]
    pub verifier: String,

    /// Base URL of the auth API
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Request timeout (seconds)
    #[serde(default = "default_request_timeout")]
    pub timeout_seconds: u64,

    /// OAuth client id; when set, the local verifier requires the
    /// credential's `aud` claim to name it
    #[serde(default)]
    pub google_client_id: Option<String>,
}

fn default_verifier() -> String {
    "local".to_string()
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            verifier: default_verifier(),
            api_base: default_api_base(),
            timeout_seconds: default_request_timeout(),
            google_client_id: None,
        }
    }
}

/// Gemini provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    /// API key; usually supplied through `GEMINI_API_KEY`
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,

    /// Model used for geocoding and chat
    #[serde(default = "default_gemini_model")]
    pub model: String,

    /// API base URL (overridable for tests and proxies)
    #[serde(default = "default_gemini_api_base")]
    pub api_base: String,

    /// Request timeout (seconds)
    #[serde(default = "default_gemini_timeout")]
    pub timeout_seconds: u64,
}

fn default_gemini_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_gemini_api_base() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_gemini_timeout() -> u64 {
    60
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_gemini_model(),
            api_base: default_gemini_api_base(),
            timeout_seconds: default_gemini_timeout(),
        }
    }
}

/// Broadcast configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BroadcastConfig {
    /// Channel shared by every instance
    #[serde(default = "default_channel")]
    pub channel: String,
}

fn default_channel() -> String {
    crate::broadcast::DEFAULT_CHANNEL.to_string()
}

impl Default for BroadcastConfig {
    fn default() -> Self {
        Self {
            channel: default_channel(),
        }
    }
}

/// Session persistence configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Location of the session database (defaults to the user data dir)
    #[serde(default)]
    pub db_path: Option<PathBuf>,
}

/// Place search and routing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapsConfig {
    /// Nominatim base URL
    #[serde(default = "default_nominatim_base")]
    pub nominatim_base: String,

    /// OSRM base URL
    #[serde(default = "default_osrm_base")]
    pub osrm_base: String,

    /// Country filter for place search
    #[serde(default = "default_country_codes")]
    pub country_codes: String,

    /// Request timeout (seconds)
    #[serde(default = "default_request_timeout")]
    pub timeout_seconds: u64,
}

fn default_nominatim_base() -> String {
    "https://nominatim.openstreetmap.org".to_string()
}

fn default_osrm_base() -> String {
    "https://router.project-osrm.org".to_string()
}

fn default_country_codes() -> String {
    "in".to_string()
}

impl Default for MapsConfig {
    fn default() -> Self {
        Self {
            nominatim_base: default_nominatim_base(),
            osrm_base: default_osrm_base(),
            country_codes: default_country_codes(),
            timeout_seconds: default_request_timeout(),
        }
    }
}

impl Config {
    /// Load configuration from file with environment and CLI overrides
    ///
    /// # Arguments
    ///
    /// * `path` - Path to configuration file
    /// * `cli` - CLI arguments for overrides
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read or parsed
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::warn!("Config file not found at {}, using defaults", path);
            Self::default()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| FairfareError::Config(format!("Failed to read config file: {}", e)))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| FairfareError::Config(format!("Failed to parse config: {}", e)).into())
    }

    fn apply_env_vars(&mut self) {
        if let Ok(kind) = std::env::var("FAIRFARE_TIP_SOURCE") {
            self.tips.kind = kind;
        }

        if let Ok(api_base) = std::env::var("FAIRFARE_API_BASE") {
            tracing::debug!(api_base = %api_base, "Env override: FAIRFARE_API_BASE");
            self.tips.api_base = api_base.clone();
            self.auth.api_base = api_base;
        }

        if let Ok(verifier) = std::env::var("FAIRFARE_AUTH_VERIFIER") {
            self.auth.verifier = verifier;
        }

        if let Ok(client_id) = std::env::var("FAIRFARE_GOOGLE_CLIENT_ID") {
            self.auth.google_client_id = Some(client_id);
        }

        if let Ok(timeout) = std::env::var("FAIRFARE_REQUEST_TIMEOUT") {
            if let Ok(value) = timeout.parse() {
                self.tips.timeout_seconds = value;
                self.auth.timeout_seconds = value;
                self.maps.timeout_seconds = value;
            } else {
                tracing::warn!("Invalid FAIRFARE_REQUEST_TIMEOUT: {}", timeout);
            }
        }

        if let Ok(latency) = std::env::var("FAIRFARE_MOCK_LATENCY_MS") {
            if let Ok(value) = latency.parse() {
                self.tips.mock_latency_ms = value;
            } else {
                tracing::warn!("Invalid FAIRFARE_MOCK_LATENCY_MS: {}", latency);
            }
        }

        // GEMINI_API_KEY wins over the generic API_KEY.
        if let Ok(key) = std::env::var("GEMINI_API_KEY").or_else(|_| std::env::var("API_KEY")) {
            if !key.is_empty() {
                self.gemini.api_key = Some(key);
            }
        }

        if let Ok(model) = std::env::var("FAIRFARE_GEMINI_MODEL") {
            self.gemini.model = model;
        }

        if let Ok(api_base) = std::env::var("FAIRFARE_GEMINI_API_BASE") {
            self.gemini.api_base = api_base;
        }

        if let Ok(channel) = std::env::var("FAIRFARE_BROADCAST_CHANNEL") {
            self.broadcast.channel = channel;
        }

        if let Ok(db_path) = std::env::var("FAIRFARE_SESSION_DB") {
            self.session.db_path = Some(PathBuf::from(db_path));
        }

        if let Ok(base) = std::env::var("FAIRFARE_NOMINATIM_BASE") {
            self.maps.nominatim_base = base;
        }

        if let Ok(base) = std::env::var("FAIRFARE_OSRM_BASE") {
            self.maps.osrm_base = base;
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if let Some(source) = &cli.source {
            tracing::debug!("Tip source override from CLI: {}", source);
            self.tips.kind = source.clone();
        }
        if let Some(api_base) = &cli.api_base {
            self.tips.api_base = api_base.clone();
            self.auth.api_base = api_base.clone();
        }
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns error if any validation check fails
    pub fn validate(&self) -> Result<()> {
        let valid_sources = ["mock", "http"];
        if !valid_sources.contains(&self.tips.kind.as_str()) {
            return Err(FairfareError::Config(format!(
                "Invalid tip source: {}. Must be one of: {}",
                self.tips.kind,
                valid_sources.join(", ")
            ))
            .into());
        }

        let valid_verifiers = ["local", "http"];
        if !valid_verifiers.contains(&self.auth.verifier.as_str()) {
            return Err(FairfareError::Config(format!(
                "Invalid identity verifier: {}. Must be one of: {}",
                self.auth.verifier,
                valid_verifiers.join(", ")
            ))
            .into());
        }

        for (name, value) in [
            ("tips.timeout_seconds", self.tips.timeout_seconds),
            ("auth.timeout_seconds", self.auth.timeout_seconds),
            ("gemini.timeout_seconds", self.gemini.timeout_seconds),
            ("maps.timeout_seconds", self.maps.timeout_seconds),
        ] {
            if value == 0 {
                return Err(
                    FairfareError::Config(format!("{} must be greater than 0", name)).into(),
                );
            }
        }

        for (name, value) in [
            ("tips.api_base", &self.tips.api_base),
            ("auth.api_base", &self.auth.api_base),
            ("gemini.api_base", &self.gemini.api_base),
            ("maps.nominatim_base", &self.maps.nominatim_base),
            ("maps.osrm_base", &self.maps.osrm_base),
        ] {
            url::Url::parse(value).map_err(|e| {
                FairfareError::Config(format!("{} is not a valid URL ({}): {}", name, value, e))
            })?;
        }

        if self.broadcast.channel.trim().is_empty() {
            return Err(
                FairfareError::Config("broadcast.channel cannot be empty".to_string()).into(),
            );
        }

        if self.gemini.model.trim().is_empty() {
            return Err(FairfareError::Config("gemini.model cannot be empty".to_string()).into());
        }

        Ok(())
    }
}
