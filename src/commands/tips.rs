//! Tip, rating, leaderboard and marker commands

use colored::Colorize;
use prettytable::{format, Table};

use crate::cli::TipsCommand;
use crate::commands::{report_banner, start_app};
use crate::config::Config;
use crate::error::Result;
use crate::leaderboard::podium;
use crate::map::markers;
use crate::models::{NewTip, Tip, TipId};
use crate::rating::{RatingOutcome, Vote};

const ADVICE_WIDTH: usize = 60;

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() > width {
        let head: String = text.chars().take(width.saturating_sub(3)).collect();
        format!("{}...", head)
    } else {
        text.to_string()
    }
}

fn print_tips(tips: &[&Tip]) {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BORDERS_ONLY);

    table.add_row(prettytable::row![
        "ID".bold(),
        "Route".bold(),
        "Mode".bold(),
        "Cost".bold(),
        "Time".bold(),
        "Rating".bold(),
        "By".bold(),
        "Advice".bold()
    ]);

    for tip in tips {
        table.add_row(prettytable::row![
            tip.id.to_string().cyan(),
            format!("{} → {}", tip.origin, tip.destination),
            format!("{} {}", tip.transport_mode.icon(), tip.transport_mode),
            tip.estimated_cost.green(),
            tip.estimated_time,
            tip.rating,
            tip.user.username,
            truncate(&tip.advice, ADVICE_WIDTH)
        ]);
    }

    table.printstd();
}

/// Handle `tips` subcommands
pub async fn handle_tips(config: &Config, command: TipsCommand) -> Result<()> {
    let mut app = start_app(config).await?;
    if report_banner(&mut app) {
        return Ok(());
    }

    match command {
        TipsCommand::List { search } => {
            if let Some(term) = search {
                app.set_search(term);
            }
            let visible = app.visible_tips();
            if visible.is_empty() {
                println!("{}", "No tips match your search.".yellow());
                return Ok(());
            }
            println!("\nCommunity Tips:");
            print_tips(&visible);
            println!();
        }
        TipsCommand::Add {
            origin,
            destination,
            mode,
            cost,
            time,
            advice,
        } => {
            let new_tip = NewTip {
                origin,
                destination,
                transport_mode: mode,
                estimated_cost: cost,
                estimated_time: time,
                advice,
            };
            if let Some(tip) = app.submit_tip(new_tip).await {
                println!("{}", format!("Added tip {}", tip.id).green());
                if tip.coordinates.is_none() {
                    println!("{}", "Location not found; the tip has no map marker.".yellow());
                }
                print_tips(&[&tip]);
            }
        }
    }

    report_banner(&mut app);
    Ok(())
}

/// Handle `rate`
pub async fn handle_rate(config: &Config, tip_id: TipId, vote: Vote) -> Result<()> {
    let mut app = start_app(config).await?;
    if report_banner(&mut app) {
        return Ok(());
    }

    match app.rate_and_confirm(tip_id, vote.delta()).await {
        Some(RatingOutcome::Confirmed { author, reward, .. }) => {
            let rating = app.store().get(tip_id).map(|t| t.rating).unwrap_or_default();
            println!(
                "{} Tip {} is now rated {}; {} {} {} points.",
                "✓".green(),
                tip_id,
                rating,
                author.cyan(),
                if reward >= 0 { "earns" } else { "loses" },
                reward.abs()
            );
        }
        Some(RatingOutcome::RolledBack { .. }) | None => {}
    }

    report_banner(&mut app);
    Ok(())
}

/// Handle `leaderboard`
pub async fn handle_leaderboard(config: &Config, top: usize) -> Result<()> {
    let mut app = start_app(config).await?;
    if report_banner(&mut app) {
        return Ok(());
    }

    let users = app.store().leaderboard().top(top);
    if users.is_empty() {
        println!("{}", "No contributors yet.".yellow());
        return Ok(());
    }

    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BORDERS_ONLY);
    table.add_row(prettytable::row![
        "Rank".bold(),
        "User".bold(),
        "Score".bold(),
        "Badges".bold()
    ]);
    for (index, user) in users.iter().enumerate() {
        table.add_row(prettytable::row![
            podium(index),
            user.username.cyan(),
            user.score,
            user.badges.join(", ")
        ]);
    }

    println!("\nTop Contributors:");
    table.printstd();
    println!();
    Ok(())
}

/// Handle `markers`
pub async fn handle_markers(config: &Config, active: Option<TipId>) -> Result<()> {
    let mut app = start_app(config).await?;
    if report_banner(&mut app) {
        return Ok(());
    }

    if let Some(tip_id) = active {
        if app.select(tip_id).is_none() {
            println!("{}", format!("No tip with id {}", tip_id).yellow());
        }
    }

    let markers = markers(app.store().tips(), app.store().active_tip());
    if markers.is_empty() {
        println!("{}", "No tips have a location yet.".yellow());
        return Ok(());
    }

    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BORDERS_ONLY);
    table.add_row(prettytable::row![
        "Tip".bold(),
        "Lat".bold(),
        "Lng".bold(),
        "Label".bold()
    ]);
    for marker in markers {
        let label = if marker.active {
            marker.label.bold().to_string()
        } else {
            marker.label
        };
        table.add_row(prettytable::row![
            marker.tip_id.to_string().cyan(),
            format!("{:.4}", marker.coordinates.lat),
            format!("{:.4}", marker.coordinates.lng),
            label
        ]);
    }
    table.printstd();
    Ok(())
}
