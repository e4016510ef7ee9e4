// SPDX-FileCopyrightText: 2026 Novyra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `novyra chat` command implementation.
//!
//! Interactive REPL that plays the customer side of a session: every line
//! is one turn through [`ChatEngine::process_turn`]. Agent replies posted
//! from another terminal with `novyra reply` are not shown live here; use
//! `/transcript` to see them.
//!
//! [`ChatEngine::process_turn`]: novyra_agent::ChatEngine::process_turn

use colored::Colorize;
use novyra_agent::{QuickAction, TurnResult};
use novyra_core::error::NovyraError;
use novyra_core::types::{ClientMeta, MessageType, SessionStatus};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing::debug;

use crate::runtime::Runtime;

/// Runs the customer REPL on `session_id`, or on a fresh session.
pub async fn run_chat(
    runtime: &Runtime,
    assistant_name: &str,
    session_id: Option<String>,
    meta: ClientMeta,
) -> Result<(), NovyraError> {
    let mut rl = DefaultEditor::new()
        .map_err(|e| NovyraError::Internal(format!("failed to initialize readline: {e}")))?;

    println!("{}", format!("{assistant_name} chat").bold().green());
    println!(
        "Hours: {}",
        runtime.engine.business_hours_summary().dimmed()
    );
    println!(
        "Type {} to leave, {} to rate, {} to close, {} for the full log.\n",
        "/quit".yellow(),
        "/rate <1-5> [feedback]".yellow(),
        "/close".yellow(),
        "/transcript".yellow()
    );

    let mut session_id = session_id;
    let prompt = format!("{}> ", "you".cyan());

    loop {
        let line = match rl.readline(&prompt) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("{}: {e}", "error".red());
                break;
            }
        };

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let _ = rl.add_history_entry(&line);

        if let Some(command) = trimmed.strip_prefix('/') {
            match run_slash_command(runtime, session_id.as_deref(), command).await {
                Ok(SlashOutcome::Continue) => continue,
                Ok(SlashOutcome::Quit) => break,
                Err(e) => {
                    eprintln!("{}: {e}", "error".red());
                    continue;
                }
            }
        }

        match runtime
            .engine
            .process_turn(session_id.as_deref(), trimmed, &meta)
            .await
        {
            Ok(result) => {
                if session_id.is_none() {
                    println!("{}", format!("session {}", result.session_id).dimmed());
                }
                session_id = Some(result.session_id.clone());
                render_turn(assistant_name, &result);
            }
            Err(e) => eprintln!("{}: {e}", "error".red()),
        }
    }

    if let Some(id) = session_id {
        println!(
            "{}",
            format!("resume with: novyra chat --session {id}").dimmed()
        );
    }
    Ok(())
}

enum SlashOutcome {
    Continue,
    Quit,
}

async fn run_slash_command(
    runtime: &Runtime,
    session_id: Option<&str>,
    command: &str,
) -> Result<SlashOutcome, NovyraError> {
    let mut parts = command.splitn(3, ' ');
    let name = parts.next().unwrap_or_default();

    if matches!(name, "quit" | "exit") {
        return Ok(SlashOutcome::Quit);
    }

    let Some(id) = session_id else {
        println!("{}", "send a message first to start a session".dimmed());
        return Ok(SlashOutcome::Continue);
    };

    match name {
        "rate" => {
            let rating = parts
                .next()
                .and_then(|r| r.parse::<u8>().ok())
                .ok_or_else(|| NovyraError::InvalidInput("usage: /rate <1-5> [feedback]".into()))?;
            let feedback = parts.next().map(str::trim).filter(|f| !f.is_empty());
            runtime.engine.rate_session(id, rating, feedback).await?;
            println!("{}", "thanks for the feedback!".green());
        }
        "close" => {
            runtime.engine.close_session(id).await?;
            println!("{}", "session closed".yellow());
            return Ok(SlashOutcome::Quit);
        }
        "transcript" => {
            for message in runtime.engine.session_messages(id).await? {
                let who = match message.message_type {
                    MessageType::User => "you".cyan(),
                    MessageType::Ai => "bot".green(),
                    MessageType::Agent => "agent".magenta(),
                    MessageType::System => "system".dimmed(),
                };
                println!("{} {who}: {}", message.created_at.dimmed(), message.content);
            }
        }
        other => {
            debug!(command = other, "unknown slash command");
            println!("{}", format!("unknown command /{other}").dimmed());
        }
    }
    Ok(SlashOutcome::Continue)
}

fn render_turn(assistant_name: &str, result: &TurnResult) {
    if !result.message.is_empty() {
        println!("{}: {}", assistant_name.green().bold(), result.message);
    }

    for package in &result.packages {
        println!("  {} {}", package.name.bold(), package.price.dimmed());
    }

    if !result.quick_actions.is_empty() {
        let labels: Vec<&str> = result
            .quick_actions
            .iter()
            .map(|a| match a {
                QuickAction::Pricing => "💰 Pricing",
                QuickAction::Faqs => "❓ FAQs",
                QuickAction::Contact => "📞 Contact",
            })
            .collect();
        println!("  {}", labels.join("  |  ").dimmed());
    }

    if let Some(number) = &result.ticket_number {
        println!("{}", format!("ticket {number} created").yellow());
    }

    if result.show_connection_message
        && let Some(name) = &result.assigned_agent_name
    {
        println!("{}", format!("{name} joined the chat").magenta());
    } else if result.status == SessionStatus::WaitingAgent {
        println!("{}", "waiting for an agent".yellow());
    }

    debug!(
        intent = %result.intent,
        confidence = result.ai_confidence,
        status = %result.status,
        "turn rendered"
    );
}
