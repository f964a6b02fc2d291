//! Domain types shared across FairFare
//!
//! Tips, authoring user snapshots, profiles and chat messages. JSON field
//! names follow the remote API (camelCase).

use serde::{Deserialize, Serialize};

use crate::error::{FairfareError, Result};

/// Identifier of a tip (epoch milliseconds for locally created tips)
pub type TipId = i64;

/// Closed set of transport modes a tip can describe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransportMode {
    Taxi,
    Bus,
    Metro,
    AutoRickshaw,
    Train,
    Ferry,
}

impl TransportMode {
    /// All modes in display order
    pub const ALL: [TransportMode; 6] = [
        TransportMode::Taxi,
        TransportMode::Bus,
        TransportMode::Metro,
        TransportMode::AutoRickshaw,
        TransportMode::Train,
        TransportMode::Ferry,
    ];

    /// Icon used for markers and tip listings
    pub fn icon(self) -> &'static str {
        match self {
            Self::Taxi => "🚕",
            Self::Bus => "🚌",
            Self::Metro => "🚇",
            Self::AutoRickshaw => "🛺",
            Self::Train => "🚆",
            Self::Ferry => "⛴️",
        }
    }
}

impl std::fmt::Display for TransportMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Taxi => write!(f, "Taxi"),
            Self::Bus => write!(f, "Bus"),
            Self::Metro => write!(f, "Metro"),
            Self::AutoRickshaw => write!(f, "AutoRickshaw"),
            Self::Train => write!(f, "Train"),
            Self::Ferry => write!(f, "Ferry"),
        }
    }
}

impl std::str::FromStr for TransportMode {
    type Err = FairfareError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['-', '_', ' '], "");
        match normalized.as_str() {
            "taxi" => Ok(Self::Taxi),
            "bus" => Ok(Self::Bus),
            "metro" => Ok(Self::Metro),
            "autorickshaw" | "auto" => Ok(Self::AutoRickshaw),
            "train" => Ok(Self::Train),
            "ferry" => Ok(Self::Ferry),
            _ => Err(FairfareError::Validation(format!(
                "Unknown transport mode: {}",
                s
            ))),
        }
    }
}

/// Geographic coordinate pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// Aggregate user entry (also used as the authoring snapshot on a tip)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    pub score: i64,
    #[serde(default)]
    pub badges: Vec<String>,
}

impl User {
    pub fn new(username: impl Into<String>, score: i64, badges: &[&str]) -> Self {
        Self {
            username: username.into(),
            score,
            badges: badges.iter().map(|b| b.to_string()).collect(),
        }
    }
}

/// A community-submitted transit recommendation between two points
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tip {
    pub id: TipId,
    pub origin: String,
    pub destination: String,
    pub transport_mode: TransportMode,
    pub estimated_cost: String,
    pub estimated_time: String,
    pub advice: String,
    pub user: User,
    pub rating: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,
}

impl Tip {
    /// Case-insensitive match against origin, destination and advice.
    ///
    /// `needle` must already be lowercase.
    pub(crate) fn matches_lowercase(&self, needle: &str) -> bool {
        self.origin.to_lowercase().contains(needle)
            || self.destination.to_lowercase().contains(needle)
            || self.advice.to_lowercase().contains(needle)
    }
}

/// Submission payload for a new tip
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTip {
    pub origin: String,
    pub destination: String,
    pub transport_mode: TransportMode,
    pub estimated_cost: String,
    pub estimated_time: String,
    pub advice: String,
}

impl NewTip {
    /// Reject submissions with blank required fields
    pub fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("origin", &self.origin),
            ("destination", &self.destination),
            ("advice", &self.advice),
        ] {
            if value.trim().is_empty() {
                return Err(FairfareError::Validation(format!("{} cannot be empty", field)).into());
            }
        }
        Ok(())
    }
}

/// Profile returned by the identity provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoogleUser {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub picture: String,
}

/// Author of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Model,
}

/// One entry of the append-only chat transcript
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn model(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Model,
            content: content.into(),
        }
    }
}
