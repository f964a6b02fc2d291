//! Sign-in commands

use colored::Colorize;

use crate::app::check_credential;
use crate::commands::{report_banner, start_app};
use crate::config::Config;
use crate::error::Result;

/// Handle `login`
pub async fn handle_login(config: &Config, credential: &str) -> Result<()> {
    let credential = check_credential(credential)?;
    let mut app = start_app(config).await?;
    // A failed tip load does not block signing in.
    app.dismiss_error();

    if app.login(credential).await {
        if let Some(user) = app.current_user() {
            println!(
                "{} Signed in as {} <{}>",
                "✓".green(),
                user.name.cyan(),
                user.email
            );
        }
    }
    report_banner(&mut app);
    Ok(())
}

/// Handle `logout`
pub async fn handle_logout(config: &Config) -> Result<()> {
    let mut app = start_app(config).await?;
    app.dismiss_error();

    match app.current_user().map(|u| u.name.clone()) {
        Some(name) => {
            app.logout();
            println!("Signed out {}", name.cyan());
        }
        None => println!("{}", "Not signed in.".yellow()),
    }
    Ok(())
}

/// Handle `whoami`
pub async fn handle_whoami(config: &Config) -> Result<()> {
    let mut app = start_app(config).await?;
    app.dismiss_error();

    match app.current_user() {
        Some(user) => {
            println!("{} <{}>", user.name.cyan(), user.email);
            if !user.picture.is_empty() {
                println!("Picture: {}", user.picture);
            }
        }
        None => println!("{}", "Not signed in.".yellow()),
    }
    Ok(())
}
