//! Interactive FareGuide chat
//!
//! Loads the tips, then runs a readline loop. Each question is answered
//! by streaming fragments straight to stdout; the visible tips (optionally
//! narrowed with `/search`) are sent along as context.

use std::io::Write;

use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use crate::chat::ChatSession;
use crate::commands::special_commands::{parse_special_command, print_help, SpecialCommand};
use crate::commands::{report_banner, start_app};
use crate::config::Config;
use crate::error::Result;
use crate::models::{ChatRole, Tip};
use crate::providers::create_provider;

/// Start the chat loop
pub async fn run_chat(config: &Config, search: Option<String>) -> Result<()> {
    let provider = create_provider(&config.gemini)?;
    let mut app = start_app(config).await?;
    report_banner(&mut app);
    if let Some(term) = search {
        app.set_search(term);
    }

    let mut session = ChatSession::new();
    let mut rl = DefaultEditor::new()?;

    println!("{}", "FareGuide".bold());
    println!("{}\n", session.messages()[0].content);
    println!("Type {} for commands.\n", "/help".cyan());

    loop {
        let prompt = format!("{} ", "you>".green().bold());
        match rl.readline(&prompt) {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                rl.add_history_entry(trimmed)?;

                match parse_special_command(trimmed) {
                    Ok(SpecialCommand::Exit) => break,
                    Ok(SpecialCommand::Help) => {
                        print_help();
                        continue;
                    }
                    Ok(SpecialCommand::Search(term)) => {
                        app.set_search(term.unwrap_or_default());
                        println!(
                            "FareGuide now sees {} tip(s).\n",
                            app.visible_tips().len()
                        );
                        continue;
                    }
                    Ok(SpecialCommand::ShowTips) => {
                        print_context(&app.visible_tips());
                        continue;
                    }
                    Ok(SpecialCommand::History) => {
                        print_history(&session);
                        continue;
                    }
                    Ok(SpecialCommand::None) => {}
                    Err(e) => {
                        println!("{}\n", e.to_string().yellow());
                        continue;
                    }
                }

                let context: Vec<Tip> = app.visible_tips().into_iter().cloned().collect();
                print!("{} ", "fareguide>".cyan().bold());
                std::io::stdout().flush()?;
                let mut streamed = false;
                let reply = session
                    .send_with(provider.as_ref(), trimmed, &context, |fragment| {
                        streamed = true;
                        print!("{}", fragment);
                        let _ = std::io::stdout().flush();
                    })
                    .await;
                if !streamed {
                    if let Some(banner) = reply {
                        print!("{}", banner.yellow());
                    }
                }
                println!("\n");
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => {
                tracing::error!("Readline error: {}", e);
                break;
            }
        }
    }

    println!("Safe travels!");
    Ok(())
}

fn print_context(tips: &[&Tip]) {
    if tips.is_empty() {
        println!("{}\n", "FareGuide sees no tips.".yellow());
        return;
    }
    for tip in tips {
        println!(
            "  {} {} → {} ({})",
            tip.transport_mode.icon(),
            tip.origin,
            tip.destination,
            tip.estimated_cost
        );
    }
    println!();
}

fn print_history(session: &ChatSession) {
    for message in session.messages() {
        let speaker = match message.role {
            ChatRole::User => "you".green().bold(),
            ChatRole::Model => "fareguide".cyan().bold(),
        };
        println!("{}: {}", speaker, message.content);
    }
    println!();
}
