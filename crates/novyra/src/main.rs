// SPDX-FileCopyrightText: 2026 Novyra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Novyra - customer chat routing with human escalation.
//!
//! This is the operator binary: a customer-side chat REPL plus commands for
//! seeding knowledge, managing staff and closing sessions.

mod chat;
mod runtime;
mod staff;
mod status;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use colored::Colorize;
use novyra_config::NovyraConfig;
use novyra_core::error::NovyraError;
use novyra_core::types::ClientMeta;

use crate::runtime::Runtime;

/// Novyra - customer chat routing with human escalation.
#[derive(Parser, Debug)]
#[command(name = "novyra", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the XDG hierarchy.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Chat as a customer in an interactive REPL.
    Chat {
        /// Resume an existing session.
        #[arg(long)]
        session: Option<String>,
        /// Customer name shown to agents.
        #[arg(long)]
        name: Option<String>,
        /// Customer email, used for ticket confirmations.
        #[arg(long)]
        email: Option<String>,
    },
    /// Insert the default FAQ entries into an empty knowledge base.
    Seed,
    /// Manage staff users and their agent profiles.
    Staff {
        #[command(subcommand)]
        action: StaffCommands,
    },
    /// Post a message into a session as a staff member.
    Reply {
        session: String,
        /// Staff user id of the sender.
        #[arg(long = "as", value_name = "STAFF_ID")]
        staff_id: i64,
        message: String,
    },
    /// Close a session and free its agent slot.
    Close { session: String },
    /// Check adapter health and show knowledge and staff counts.
    Status {
        /// Print machine-readable JSON.
        #[arg(long)]
        json: bool,
    },
    /// Print the effective configuration as TOML.
    Config,
}

#[derive(Subcommand, Debug)]
enum StaffCommands {
    /// Add a staff user.
    Add {
        username: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
    },
    /// List staff users with their current chat load.
    List,
    /// Put a staff user back into the assignment rotation.
    Available { staff_id: i64 },
    /// Take a staff user out of the assignment rotation.
    Away { staff_id: i64 },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => novyra_config::load_and_validate_path(path),
        None => novyra_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            novyra_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config.assistant.log_level);

    if let Err(e) = run(cli.command, &config).await {
        eprintln!("{}: {e}", "error".red());
        std::process::exit(1);
    }
}

async fn run(command: Option<Commands>, config: &NovyraConfig) -> Result<(), NovyraError> {
    let Some(command) = command else {
        println!("novyra: use --help for available commands");
        return Ok(());
    };

    if let Commands::Config = command {
        print!("{}", render_config(config)?);
        return Ok(());
    }

    let runtime = Runtime::open(config).await?;
    let outcome = dispatch(&runtime, command, config).await;
    runtime.shutdown().await?;
    outcome
}

async fn dispatch(
    runtime: &Runtime,
    command: Commands,
    config: &NovyraConfig,
) -> Result<(), NovyraError> {
    match command {
        Commands::Chat {
            session,
            name,
            email,
        } => {
            let meta = ClientMeta {
                customer_name: name,
                customer_email: email,
                user_agent: Some(format!("novyra-cli/{}", env!("CARGO_PKG_VERSION"))),
                ..Default::default()
            };
            chat::run_chat(runtime, &config.assistant.name, session, meta).await
        }
        Commands::Seed => {
            let added = runtime.engine.seed_default_knowledge().await?;
            if added == 0 {
                println!("knowledge base already populated, nothing added");
            } else {
                println!("{} {added} knowledge entries", "seeded".green());
            }
            Ok(())
        }
        Commands::Staff { action } => match action {
            StaffCommands::Add {
                username,
                name,
                email,
            } => staff::add(runtime, &username, name, email).await,
            StaffCommands::List => staff::list(runtime).await,
            StaffCommands::Available { staff_id } => {
                staff::set_availability(runtime, staff_id, true).await
            }
            StaffCommands::Away { staff_id } => {
                staff::set_availability(runtime, staff_id, false).await
            }
        },
        Commands::Reply {
            session,
            staff_id,
            message,
        } => {
            let posted = runtime
                .engine
                .agent_reply(&session, staff_id, &message)
                .await?;
            println!("posted message {} to session {session}", posted.id);
            Ok(())
        }
        Commands::Close { session } => {
            runtime.engine.close_session(&session).await?;
            println!("session {session} closed");
            Ok(())
        }
        Commands::Status { json } => status::run_status(runtime, json).await,
        Commands::Config => Ok(()),
    }
}

/// Effective configuration as TOML with secrets masked.
fn render_config(config: &NovyraConfig) -> Result<String, NovyraError> {
    let mut shown = config.clone();
    for secret in [&mut shown.responder.api_key, &mut shown.email.password] {
        if secret.is_some() {
            *secret = Some("********".to_string());
        }
    }
    shown
        .to_toml()
        .map_err(|e| NovyraError::Config(e.to_string()))
}

fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("novyra={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_staff_add() {
        let cli = Cli::try_parse_from([
            "novyra", "staff", "add", "ada", "--name", "Ada Obi", "--email", "ada@novyra.local",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Staff {
                action: StaffCommands::Add { username, name, email },
            }) => {
                assert_eq!(username, "ada");
                assert_eq!(name.as_deref(), Some("Ada Obi"));
                assert_eq!(email.as_deref(), Some("ada@novyra.local"));
            }
            other => panic!("unexpected parse: {other:?}"),
        }
    }

    #[test]
    fn cli_parses_reply_with_sender() {
        let cli =
            Cli::try_parse_from(["novyra", "reply", "s1", "--as", "3", "On it!"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Reply { ref session, staff_id: 3, ref message })
                if session == "s1" && message == "On it!"
        ));
    }

    #[test]
    fn cli_parses_status_json() {
        let cli = Cli::try_parse_from(["novyra", "status", "--json"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Status { json: true })));
    }

    #[test]
    fn global_config_flag_after_subcommand() {
        let cli = Cli::try_parse_from(["novyra", "seed", "--config", "/tmp/n.toml"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/n.toml")));
    }

    #[test]
    fn rendered_config_masks_secrets() {
        let mut config = NovyraConfig::default();
        config.responder.api_key = Some("sk-live-123".into());
        config.email.password = Some("hunter2".into());

        let rendered = render_config(&config).unwrap();
        assert!(rendered.contains("[assistant]"));
        assert!(!rendered.contains("sk-live-123"));
        assert!(!rendered.contains("hunter2"));
    }

    #[test]
    fn binary_loads_config_defaults() {
        let config = novyra_config::load_and_validate_str("").expect("default config should be valid");
        assert_eq!(config.assistant.log_level, "info");
    }
}
