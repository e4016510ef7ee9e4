// SPDX-FileCopyrightText: 2026 Novyra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `novyra staff` subcommands.

use colored::Colorize;
use novyra_core::error::NovyraError;
use novyra_core::traits::ChatStore;
use novyra_core::types::NewStaffUser;

use crate::runtime::Runtime;

/// Creates an active staff member and their agent profile.
pub async fn add(
    runtime: &Runtime,
    username: &str,
    full_name: Option<String>,
    email: Option<String>,
) -> Result<(), NovyraError> {
    let username = username.trim();
    if username.is_empty() {
        return Err(NovyraError::InvalidInput("username is required".into()));
    }

    let user = runtime
        .store
        .create_staff_user(&NewStaffUser {
            username: username.to_string(),
            full_name,
            email,
        })
        .await?;
    // Creates the agent profile with the configured default capacity.
    runtime.engine.agent_profiles().await?;

    println!(
        "{} staff user {} (id {})",
        "added".green(),
        user.display_name().bold(),
        user.id
    );
    Ok(())
}

/// Prints every active staff member with their current load.
pub async fn list(runtime: &Runtime) -> Result<(), NovyraError> {
    let profiles = runtime.engine.agent_profiles().await?;
    if profiles.is_empty() {
        println!("{}", "no staff users yet; add one with `novyra staff add`".dimmed());
        return Ok(());
    }

    println!(
        "{:<6} {:<16} {:<24} {:<10} {:>6} {:>8}",
        "ID".bold(),
        "USERNAME".bold(),
        "NAME".bold(),
        "STATUS".bold(),
        "LOAD".bold(),
        "HANDLED".bold()
    );
    for p in profiles {
        let status = if p.is_available {
            "available".green()
        } else {
            "away".yellow()
        };
        println!(
            "{:<6} {:<16} {:<24} {:<10} {:>6} {:>8}",
            p.staff_user_id,
            p.username,
            p.display_name,
            status,
            format!("{}/{}", p.current_chats, p.max_concurrent_chats),
            p.total_chats_handled
        );
    }
    Ok(())
}

/// Takes a staff member in or out of the assignment rotation.
pub async fn set_availability(
    runtime: &Runtime,
    staff_user_id: i64,
    available: bool,
) -> Result<(), NovyraError> {
    runtime
        .engine
        .set_agent_availability(staff_user_id, available)
        .await?;
    let label = if available { "available".green() } else { "away".yellow() };
    println!("staff user {staff_user_id} is now {label}");
    Ok(())
}
