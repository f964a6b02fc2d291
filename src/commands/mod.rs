/*!
Command handlers for the CLI

This module provides command handlers invoked by the CLI entrypoint.

- `tips`: list, add, rate, leaderboard and map markers
- `account`: login, logout, whoami
- `chat`: Interactive FareGuide chat
- `maps`: geocoding, place suggestions, route summaries

Every handler builds an [`App`] from the configuration, runs one action
and prints the result. Error banners set by the action are printed too.
*/

use std::sync::Arc;

use colored::Colorize;

use crate::app::{App, AppServices};
use crate::auth::create_verifier;
use crate::broadcast::BroadcastHub;
use crate::config::Config;
use crate::error::Result;
use crate::providers::{create_provider, Geocoder};
use crate::remote::create_tip_source;
use crate::session::SledSlotStore;

pub mod account;
pub mod chat;
pub mod maps;
pub mod special_commands;
pub mod tips;

/// Wire the configured collaborators into [`AppServices`]
///
/// The geocoder is left out (with a warning) when no Gemini key is set.
///
/// # Errors
///
/// Returns error if a tip source, verifier, channel or the session store
/// cannot be created
pub fn build_services(config: &Config, hub: &BroadcastHub) -> Result<AppServices> {
    let source = create_tip_source(&config.tips)?;
    let verifier = create_verifier(&config.auth)?;
    let broadcast = hub.channel(&config.broadcast.channel)?;
    let slots = match &config.session.db_path {
        Some(path) => SledSlotStore::open(path.clone())?,
        None => SledSlotStore::open_default()?,
    };

    let geocoder: Option<Arc<dyn Geocoder>> = match create_provider(&config.gemini) {
        Ok(provider) => Some(provider),
        Err(e) => {
            tracing::warn!("Geocoding disabled: {:#}", e);
            None
        }
    };

    Ok(AppServices {
        source: Arc::from(source),
        verifier: Arc::from(verifier),
        broadcast: Arc::new(broadcast),
        slots: Arc::new(slots),
        geocoder,
    })
}

/// Build and start an [`App`] for a one-shot command
pub async fn start_app(config: &Config) -> Result<App> {
    let hub = BroadcastHub::new();
    let mut app = App::new(build_services(config, &hub)?);
    app.start().await;
    Ok(app)
}

/// Print and dismiss the current error banner, if any
pub(crate) fn report_banner(app: &mut App) -> bool {
    match app.error() {
        Some(message) => {
            eprintln!("{}", message.red());
            app.dismiss_error();
            true
        }
        None => false,
    }
}
