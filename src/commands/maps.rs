//! Geocoding, place search and routing commands

use colored::Colorize;
use prettytable::{format, Table};

use crate::config::Config;
use crate::error::Result;
use crate::models::Coordinates;
use crate::places::PlaceSearch;
use crate::providers::{create_provider, Geocoder};
use crate::routing::RoutePlanner;

/// Handle `geocode`
pub async fn handle_geocode(config: &Config, address: &str) -> Result<()> {
    let provider = create_provider(&config.gemini)?;
    match provider.geocode(address).await? {
        Some(coords) => println!("{:.6}, {:.6}", coords.lat, coords.lng),
        None => println!("{}", format!("Could not locate {:?}", address).yellow()),
    }
    Ok(())
}

/// Handle `places`
pub async fn handle_places(config: &Config, query: &str) -> Result<()> {
    let search = PlaceSearch::new(&config.maps)?;
    let suggestions = search.suggest(query).await?;
    if suggestions.is_empty() {
        println!("{}", "No places found.".yellow());
        return Ok(());
    }

    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BORDERS_ONLY);
    table.add_row(prettytable::row!["Place".bold(), "Lat".bold(), "Lng".bold()]);
    for place in suggestions {
        table.add_row(prettytable::row![
            place.display_name,
            format!("{:.5}", place.coordinates.lat),
            format!("{:.5}", place.coordinates.lng)
        ]);
    }
    table.printstd();
    Ok(())
}

/// Handle `route`
pub async fn handle_route(config: &Config, from: Coordinates, to: Coordinates) -> Result<()> {
    let planner = RoutePlanner::new(&config.maps)?;
    let summary = planner.route(from, to).await?;
    println!("{} {}", "Distance:".bold(), summary.distance());
    println!("{} {}", "Time:".bold(), summary.time());
    Ok(())
}
