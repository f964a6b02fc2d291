//! Command-line interface definition for FairFare
//!
//! This module defines the CLI structure using clap's derive API,
//! providing commands for browsing and rating tips, signing in, chatting
//! with FareGuide, and the map helpers.

use clap::{ArgGroup, Parser, Subcommand};

use crate::models::{TipId, TransportMode};

/// FairFare - community transit tips for Indian cities
#[derive(Parser, Debug, Clone)]
#[command(name = "fairfare")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/config.yaml")]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Override the tip source from config (mock, http)
    #[arg(long, global = true)]
    pub source: Option<String>,

    /// Override the FairFare API base URL
    #[arg(long, global = true)]
    pub api_base: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for FairFare
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Browse and add tips
    Tips {
        #[command(subcommand)]
        command: TipsCommand,
    },

    /// Up- or downvote a tip
    #[command(group(ArgGroup::new("vote").required(true).args(["up", "down"])))]
    Rate {
        /// Tip id
        id: TipId,

        /// Upvote
        #[arg(long)]
        up: bool,

        /// Downvote
        #[arg(long)]
        down: bool,
    },

    /// Show the top contributors
    Leaderboard {
        /// Number of users to show
        #[arg(short = 'n', long, default_value_t = crate::leaderboard::PODIUM_SIZE)]
        top: usize,
    },

    /// Sign in with a Google ID token
    Login {
        /// The credential (JWT) issued by Google Sign-In
        credential: String,
    },

    /// Sign out and forget the stored session
    Logout,

    /// Show the signed-in user
    Whoami,

    /// Chat with the FareGuide assistant
    Chat {
        /// Only give the assistant tips matching this term as context
        #[arg(short, long)]
        search: Option<String>,
    },

    /// Resolve an address to coordinates
    Geocode {
        /// Address or place name
        address: String,
    },

    /// Suggest places matching a query
    Places {
        /// At least three characters
        query: String,
    },

    /// Driving distance and time between two points
    #[command(allow_negative_numbers = true)]
    Route {
        from_lat: f64,
        from_lng: f64,
        to_lat: f64,
        to_lng: f64,
    },

    /// List map markers for tips with coordinates
    Markers {
        /// Tip to highlight
        #[arg(long)]
        active: Option<TipId>,
    },
}

/// Tip subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum TipsCommand {
    /// List tips
    List {
        /// Only show tips whose origin, destination or advice contain this
        #[arg(short, long)]
        search: Option<String>,
    },

    /// Add a tip (requires login)
    Add {
        #[arg(long)]
        origin: String,

        #[arg(long)]
        destination: String,

        /// Taxi, Bus, Metro, AutoRickshaw, Train or Ferry
        #[arg(short, long)]
        mode: TransportMode,

        /// Estimated cost, e.g. "₹60"
        #[arg(long)]
        cost: String,

        /// Estimated time, e.g. "25 minutes"
        #[arg(long)]
        time: String,

        #[arg(long)]
        advice: String,
    },
}

impl Cli {
    /// Parse command line arguments
    ///
    /// # Returns
    ///
    /// Returns the parsed CLI structure
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            config: Some("config/config.yaml".to_string()),
            verbose: false,
            source: None,
            api_base: None,
            command: Commands::Tips {
                command: TipsCommand::List { search: None },
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_default() {
        let cli = Cli::default();
        assert_eq!(cli.config, Some("config/config.yaml".to_string()));
        assert!(!cli.verbose);
        assert!(matches!(
            cli.command,
            Commands::Tips {
                command: TipsCommand::List { search: None }
            }
        ));
    }

    #[test]
    fn test_cli_parse_tips_list_with_search() {
        let cli = Cli::try_parse_from(["fairfare", "tips", "list", "--search", "metro"]).unwrap();
        if let Commands::Tips {
            command: TipsCommand::List { search },
        } = cli.command
        {
            assert_eq!(search, Some("metro".to_string()));
        } else {
            panic!("Expected tips list");
        }
    }

    #[test]
    fn test_cli_parse_tips_add() {
        let cli = Cli::try_parse_from([
            "fairfare",
            "tips",
            "add",
            "--origin",
            "Churchgate",
            "--destination",
            "Andheri",
            "--mode",
            "train",
            "--cost",
            "₹10",
            "--time",
            "40 minutes",
            "--advice",
            "Avoid the 9 AM fast local unless you enjoy crowds.",
        ])
        .unwrap();
        if let Commands::Tips {
            command: TipsCommand::Add { mode, origin, .. },
        } = cli.command
        {
            assert_eq!(mode, TransportMode::Train);
            assert_eq!(origin, "Churchgate");
        } else {
            panic!("Expected tips add");
        }
    }

    #[test]
    fn test_cli_parse_tips_add_rejects_unknown_mode() {
        let cli = Cli::try_parse_from([
            "fairfare",
            "tips",
            "add",
            "--origin",
            "a",
            "--destination",
            "b",
            "--mode",
            "hovercraft",
            "--cost",
            "c",
            "--time",
            "d",
            "--advice",
            "e",
        ]);
        assert!(cli.is_err());
    }

    #[test]
    fn test_cli_parse_rate_requires_direction() {
        assert!(Cli::try_parse_from(["fairfare", "rate", "1"]).is_err());
        assert!(Cli::try_parse_from(["fairfare", "rate", "1", "--up", "--down"]).is_err());

        let cli = Cli::try_parse_from(["fairfare", "rate", "2", "--down"]).unwrap();
        if let Commands::Rate { id, up, down } = cli.command {
            assert_eq!(id, 2);
            assert!(!up);
            assert!(down);
        } else {
            panic!("Expected Rate command");
        }
    }

    #[test]
    fn test_cli_parse_leaderboard_default_top() {
        let cli = Cli::try_parse_from(["fairfare", "leaderboard"]).unwrap();
        if let Commands::Leaderboard { top } = cli.command {
            assert_eq!(top, 5);
        } else {
            panic!("Expected Leaderboard command");
        }
    }

    #[test]
    fn test_cli_parse_route() {
        let cli =
            Cli::try_parse_from(["fairfare", "route", "28.55", "77.10", "28.63", "77.21"]).unwrap();
        if let Commands::Route {
            from_lat, to_lng, ..
        } = cli.command
        {
            assert_eq!(from_lat, 28.55);
            assert_eq!(to_lng, 77.21);
        } else {
            panic!("Expected Route command");
        }
    }

    #[test]
    fn test_cli_parse_global_overrides() {
        let cli = Cli::try_parse_from([
            "fairfare",
            "-v",
            "whoami",
            "--source",
            "http",
            "--api-base",
            "http://localhost:3000",
        ])
        .unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.source, Some("http".to_string()));
        assert_eq!(cli.api_base, Some("http://localhost:3000".to_string()));
    }

    #[test]
    fn test_cli_parse_missing_command() {
        assert!(Cli::try_parse_from(["fairfare"]).is_err());
    }

    #[test]
    fn test_cli_parse_invalid_command() {
        assert!(Cli::try_parse_from(["fairfare", "invalid"]).is_err());
    }
}
