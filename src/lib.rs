//! FairFare - community transit tips library
//!
//! This library provides the client-side core of FairFare: the tip store
//! with optimistic ratings, cross-instance tip broadcast, the derived
//! leaderboard, fail-closed session restoration, and the integrations
//! with the tip API, identity verification, Gemini, Nominatim and OSRM.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `app`: Application controller owning the store and the session
//! - `store`, `rating`, `leaderboard`: Tip state, optimistic ratings, ranking
//! - `broadcast`: Publish/subscribe of new tips between instances
//! - `session`, `auth`: Persisted sign-in and credential verification
//! - `remote`: Tip sources (REST API and in-memory mock)
//! - `providers`, `prompts`, `chat`: Gemini geocoding and FareGuide chat
//! - `places`, `routing`, `map`: Place search, route summaries, markers
//! - `config`: Configuration management and validation
//! - `error`: Error types and result aliases
//! - `cli`, `commands`: Command-line interface
//!
//! # Example
//!
//! ```no_run
//! use fairfare::Config;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config.yaml", &Default::default())?;
//!     config.validate()?;
//!
//!     let mut app = fairfare::commands::start_app(&config).await?;
//!     for tip in app.visible_tips() {
//!         println!("{} → {}", tip.origin, tip.destination);
//!     }
//!     app.dismiss_error();
//!     Ok(())
//! }
//! ```

pub mod app;
pub mod auth;
pub mod broadcast;
pub mod chat;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod leaderboard;
pub mod map;
pub mod models;
pub mod places;
pub mod prompts;
pub mod providers;
pub mod rating;
pub mod remote;
pub mod routing;
pub mod session;
pub mod store;

// Re-export commonly used types
pub use app::{App, AppEvent, AppServices, EventOutcome};
pub use config::Config;
pub use error::{FairfareError, Result};
pub use models::{Coordinates, NewTip, Tip, TransportMode, User};
pub use store::TipStore;

#[cfg(test)]
pub mod test_utils;
