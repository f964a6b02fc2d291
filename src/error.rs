//! Error types for FairFare
//!
//! This module defines all error types used throughout the application,
//! using `thiserror` for ergonomic error handling, together with the
//! user-visible banner messages that each failed action surfaces.

use thiserror::Error;

/// Main error type for FairFare operations
///
/// Covers configuration loading, remote tip source calls, identity
/// verification, session persistence, broadcast delivery and the AI
/// provider integrations.
#[derive(Error, Debug)]
pub enum FairfareError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Network or remote failure (non-fatal, retry the triggering action)
    #[error("Remote error: {0}")]
    Remote(String),

    /// Malformed or missing remote data
    #[error("Not found: {0}")]
    NotFound(String),

    /// Authentication errors (credential rejected, no session)
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// Invalid user input
    #[error("Validation error: {0}")]
    Validation(String),

    /// Broadcast channel errors
    #[error("Broadcast error: {0}")]
    Broadcast(String),

    /// AI provider errors (geocoding, chat)
    #[error("Provider error: {0}")]
    Provider(String),

    /// Session slot storage errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Embedded database errors
    #[error("Database error: {0}")]
    Database(#[from] sled::Error),
}

/// Result type alias for FairFare operations
///
/// Uses `anyhow::Error` so callers can attach context while still being
/// able to downcast to [`FairfareError`] at action boundaries.
pub type Result<T> = anyhow::Result<T>;

/// The action whose failure is being reported to the user.
///
/// Each action has its own banner text; authentication failures are
/// always reported distinctly from generic remote failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserAction {
    /// Initial load of the tip collection
    LoadTips,
    /// Submitting a new tip
    SubmitTip,
    /// Confirming a rating change
    Rate,
    /// Exchanging a sign-in credential
    Login,
    /// Sending a chat message
    Chat,
}

impl UserAction {
    /// Generic banner shown when this action fails
    pub fn banner(self) -> &'static str {
        match self {
            Self::LoadTips => {
                "Failed to fetch travel tips from the server. Please try again later."
            }
            Self::SubmitTip => "Sorry, we couldn't save your tip. Please try again.",
            Self::Rate => "Couldn't save your rating. Please try again.",
            Self::Login => "Login failed. Please try again.",
            Self::Chat => "Sorry, I'm having trouble connecting. Please try again later.",
        }
    }
}

/// Convert a failure into the human-readable message shown to the user.
///
/// Authentication failures keep their own wording for every action except
/// login (whose banner already says so); everything else maps to the
/// action's generic banner.
pub fn user_message(action: UserAction, error: &anyhow::Error) -> String {
    if action != UserAction::Login {
        if let Some(FairfareError::Authentication(reason)) = error.downcast_ref::<FairfareError>() {
            return format!("Please log in first: {}", reason);
        }
    }
    action.banner().to_string()
}
