// SPDX-FileCopyrightText: 2026 Novyra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `novyra status` command implementation.
//!
//! Runs each adapter's health check and summarizes what the engine has to
//! work with: knowledge entries, staff and their free slots.

use colored::Colorize;
use novyra_core::error::NovyraError;
use novyra_core::traits::ChatStore;
use novyra_core::types::HealthStatus;
use serde::Serialize;

use crate::runtime::{AdapterReport, Runtime};

/// Structured status output for `--json` mode.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub healthy: bool,
    pub adapters: Vec<AdapterStatus>,
    pub knowledge_entries: u64,
    pub staff: usize,
    pub agents_with_free_slots: usize,
    pub business_hours: String,
}

#[derive(Debug, Serialize)]
pub struct AdapterStatus {
    pub name: String,
    pub kind: String,
    pub version: String,
    pub health: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl From<AdapterReport> for AdapterStatus {
    fn from(report: AdapterReport) -> Self {
        let (health, detail) = match report.health {
            HealthStatus::Healthy => ("healthy", None),
            HealthStatus::Degraded(reason) => ("degraded", Some(reason)),
            HealthStatus::Unhealthy(reason) => ("unhealthy", Some(reason)),
        };
        Self {
            name: report.name,
            kind: report.kind.to_string(),
            version: report.version,
            health: health.to_string(),
            detail,
        }
    }
}

pub async fn collect(runtime: &Runtime) -> Result<StatusResponse, NovyraError> {
    let adapters: Vec<AdapterStatus> = runtime
        .adapter_reports()
        .await
        .into_iter()
        .map(AdapterStatus::from)
        .collect();
    let profiles = runtime.engine.agent_profiles().await?;

    Ok(StatusResponse {
        healthy: adapters.iter().all(|a| a.health != "unhealthy"),
        knowledge_entries: runtime.store.count_knowledge().await?,
        staff: profiles.len(),
        agents_with_free_slots: profiles
            .iter()
            .filter(|p| p.is_available && p.has_capacity())
            .count(),
        business_hours: runtime.engine.business_hours_summary(),
        adapters,
    })
}

/// Run the `novyra status` command.
pub async fn run_status(runtime: &Runtime, json: bool) -> Result<(), NovyraError> {
    let status = collect(runtime).await?;

    if json {
        let rendered = serde_json::to_string_pretty(&status)
            .map_err(|e| NovyraError::Internal(format!("failed to render status: {e}")))?;
        println!("{rendered}");
        return Ok(());
    }

    println!("  {}", "novyra status".bold());
    println!("  {}", "-".repeat(50));
    for adapter in &status.adapters {
        let health = match adapter.health.as_str() {
            "healthy" => adapter.health.green(),
            "degraded" => adapter.health.yellow(),
            _ => adapter.health.red(),
        };
        print!(
            "    {:<10} {:<10} {:<8} {health}",
            adapter.name, adapter.kind, adapter.version
        );
        match &adapter.detail {
            Some(detail) => println!(" ({detail})"),
            None => println!(),
        }
    }
    println!();
    println!("    knowledge entries  {}", status.knowledge_entries);
    println!(
        "    staff              {} ({} with free slots)",
        status.staff, status.agents_with_free_slots
    );
    println!("    business hours     {}", status.business_hours);
    Ok(())
}
