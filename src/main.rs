//! FairFare - community transit tips CLI
//!
#![doc = "FairFare - community transit tips CLI"]
#![doc = "Main entry point for the FairFare application."]

use anyhow::Result;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use fairfare::cli::{Cli, Commands};
use fairfare::commands;
use fairfare::config::Config;
use fairfare::models::Coordinates;
use fairfare::rating::Vote;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    // Initialize tracing
    init_tracing(cli.verbose);

    // Load configuration
    let config_path = cli.config.as_deref().unwrap_or("config/config.yaml");
    let config = Config::load(config_path, &cli)?;

    // Validate configuration
    config.validate()?;

    // Execute command
    match cli.command {
        Commands::Tips { command } => {
            tracing::info!("Starting tips command");
            commands::tips::handle_tips(&config, command).await?;
        }
        Commands::Rate { id, up, down: _ } => {
            let vote = if up { Vote::Up } else { Vote::Down };
            tracing::info!(tip_id = id, ?vote, "Rating tip");
            commands::tips::handle_rate(&config, id, vote).await?;
        }
        Commands::Leaderboard { top } => {
            commands::tips::handle_leaderboard(&config, top).await?;
        }
        Commands::Login { credential } => {
            tracing::info!("Starting login");
            commands::account::handle_login(&config, &credential).await?;
        }
        Commands::Logout => {
            commands::account::handle_logout(&config).await?;
        }
        Commands::Whoami => {
            commands::account::handle_whoami(&config).await?;
        }
        Commands::Chat { search } => {
            tracing::info!("Starting interactive chat mode");
            if let Some(term) = &search {
                tracing::debug!("Using search filter: {}", term);
            }
            commands::chat::run_chat(&config, search).await?;
        }
        Commands::Geocode { address } => {
            commands::maps::handle_geocode(&config, &address).await?;
        }
        Commands::Places { query } => {
            commands::maps::handle_places(&config, &query).await?;
        }
        Commands::Route {
            from_lat,
            from_lng,
            to_lat,
            to_lng,
        } => {
            let from = Coordinates::new(from_lat, from_lng);
            let to = Coordinates::new(to_lat, to_lng);
            commands::maps::handle_route(&config, from, to).await?;
        }
        Commands::Markers { active } => {
            commands::tips::handle_markers(&config, active).await?;
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "fairfare=debug" } else { "fairfare=info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
