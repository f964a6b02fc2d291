//! Identity verification
//!
//! Exchanges an opaque sign-in credential (a Google ID token) for a profile
//! and a session token. [`HttpIdentityVerifier`] delegates to the backend's
//! `POST /api/auth/google`; [`LocalCredentialVerifier`] reads the profile
//! claims straight out of the token payload and issues a random session
//! token, for offline use.

use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::AuthConfig;
use crate::error::{FairfareError, Result};
use crate::models::GoogleUser;

/// Profile and session token returned by a successful verification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifiedIdentity {
    pub user: GoogleUser,
    pub token: String,
}

/// Credential → identity exchange
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    /// Verify `credential` and establish an identity.
    ///
    /// # Errors
    ///
    /// Returns [`FairfareError::Authentication`] when the credential is
    /// rejected or unreadable.
    async fn verify(&self, credential: &str) -> Result<VerifiedIdentity>;
}

/// Create a verifier based on configuration
pub fn create_verifier(config: &AuthConfig) -> Result<Box<dyn IdentityVerifier>> {
    match config.verifier.as_str() {
        "local" => Ok(Box::new(LocalCredentialVerifier::new(
            config.google_client_id.clone(),
        ))),
        "http" => Ok(Box::new(HttpIdentityVerifier::new(config)?)),
        other => Err(FairfareError::Config(format!("Unknown identity verifier: {}", other)).into()),
    }
}

#[derive(Debug, Deserialize)]
struct CredentialClaims {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    picture: Option<String>,
    /// A single client id or a list of them
    #[serde(default)]
    aud: Option<serde_json::Value>,
}

impl CredentialClaims {
    fn has_audience(&self, client_id: &str) -> bool {
        match &self.aud {
            Some(serde_json::Value::String(aud)) => aud == client_id,
            Some(serde_json::Value::Array(auds)) => {
                auds.iter().any(|a| a.as_str() == Some(client_id))
            }
            _ => false,
        }
    }

    fn into_profile(self) -> Result<GoogleUser> {
        match (self.name, self.email) {
            (Some(name), Some(email)) => Ok(GoogleUser {
                name,
                email,
                picture: self.picture.unwrap_or_default(),
            }),
            _ => Err(FairfareError::Authentication(
                "credential is missing name or email".to_string(),
            )
            .into()),
        }
    }
}

fn decode_claims(credential: &str) -> Result<CredentialClaims> {
    let payload = credential
        .split('.')
        .nth(1)
        .filter(|p| !p.is_empty())
        .ok_or_else(|| {
            FairfareError::Authentication("credential is not a JWT".to_string())
        })?;

    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|e| FairfareError::Authentication(format!("credential payload: {}", e)))?;
    let claims = serde_json::from_slice(&bytes)
        .map_err(|e| FairfareError::Authentication(format!("credential claims: {}", e)))?;
    Ok(claims)
}

/// Decode the profile claims carried in a JWT's payload segment.
///
/// The signature is not checked.
pub fn decode_credential_profile(credential: &str) -> Result<GoogleUser> {
    decode_claims(credential)?.into_profile()
}

/// Verifier that trusts the credential's own claims.
///
/// With a client id configured, the credential's `aud` claim must name it.
#[derive(Debug, Clone, Default)]
pub struct LocalCredentialVerifier {
    client_id: Option<String>,
}

impl LocalCredentialVerifier {
    pub fn new(client_id: Option<String>) -> Self {
        Self {
            client_id: client_id.filter(|id| !id.trim().is_empty()),
        }
    }
}

#[async_trait]
impl IdentityVerifier for LocalCredentialVerifier {
    async fn verify(&self, credential: &str) -> Result<VerifiedIdentity> {
        let claims = decode_claims(credential)?;
        if let Some(client_id) = &self.client_id {
            if !claims.has_audience(client_id) {
                tracing::warn!("Credential was issued for another client");
                return Err(FairfareError::Authentication(
                    "credential was issued for another client".to_string(),
                )
                .into());
            }
        }

        let user = claims.into_profile()?;
        tracing::info!(user = %user.name, "Verified credential locally");
        Ok(VerifiedIdentity {
            user,
            token: uuid::Uuid::new_v4().to_string(),
        })
    }
}

/// Verifier backed by the FairFare auth endpoint
#[derive(Debug, Clone)]
pub struct HttpIdentityVerifier {
    client: Client,
    endpoint: String,
}

#[derive(Debug, Serialize)]
struct CredentialRequest<'a> {
    credential: &'a str,
}

impl HttpIdentityVerifier {
    pub fn new(config: &AuthConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(concat!("fairfare/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FairfareError::Remote(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self {
            client,
            endpoint: format!("{}/api/auth/google", config.api_base.trim_end_matches('/')),
        })
    }
}

#[async_trait]
impl IdentityVerifier for HttpIdentityVerifier {
    async fn verify(&self, credential: &str) -> Result<VerifiedIdentity> {
        tracing::debug!("Sending credential for verification: {}", self.endpoint);
        let response = self
            .client
            .post(&self.endpoint)
            .json(&CredentialRequest { credential })
            .send()
            .await
            .map_err(|e| FairfareError::Remote(format!("Failed to reach auth API: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!("Auth API returned {}: {}", status, body);
            return Err(FairfareError::Authentication(format!(
                "credential rejected ({})",
                status
            ))
            .into());
        }

        let identity: VerifiedIdentity = response.json().await.map_err(|e| {
            FairfareError::Authentication(format!("malformed auth response: {}", e))
        })?;
        if identity.token.is_empty() {
            return Err(
                FairfareError::Authentication("auth response carried no token".to_string()).into(),
            );
        }
        Ok(identity)
    }
}
