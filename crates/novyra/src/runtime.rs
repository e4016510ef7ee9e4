// SPDX-FileCopyrightText: 2026 Novyra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wires the engine's adapters together from configuration.

use std::sync::Arc;

use novyra_agent::{ChatEngine, EngineDeps};
use novyra_bus::SessionBus;
use novyra_config::NovyraConfig;
use novyra_core::error::NovyraError;
use novyra_core::traits::{EmailSender, PluginAdapter};
use novyra_core::types::{AdapterType, HealthStatus};
use novyra_deepseek::DeepSeekResponder;
use novyra_storage::SqliteStore;
use tracing::{debug, info, warn};

/// Everything a command needs: the engine plus a direct handle to the store.
/// The remaining adapters are kept for health checks and shutdown.
pub struct Runtime {
    pub engine: ChatEngine,
    pub store: Arc<SqliteStore>,
    mailer: Arc<dyn EmailSender>,
    responder: Option<Arc<DeepSeekResponder>>,
}

/// Identity and health of one adapter, as shown by `novyra status`.
#[derive(Debug)]
pub struct AdapterReport {
    pub name: String,
    pub kind: AdapterType,
    pub version: String,
    pub health: HealthStatus,
}

impl Runtime {
    /// Opens the database, picks the mailer and, when enabled, connects the
    /// external responder.
    ///
    /// The store must pass its health check. A responder that fails its
    /// check is left out and turns are answered by the rule-based matcher.
    pub async fn open(config: &NovyraConfig) -> Result<Self, NovyraError> {
        let store = Arc::new(SqliteStore::open(config.storage.clone()).await?);
        ensure_healthy(store.as_ref()).await?;

        let bus = Arc::new(SessionBus::new(config.bus.channel_capacity));
        let mailer = novyra_email::mailer_from_config(&config.email)?;

        let mut deps = EngineDeps::new(store.clone(), store.clone(), mailer.clone(), bus);

        let mut responder = None;
        if config.responder.enabled {
            match connect_responder(config).await {
                Ok(connected) => {
                    deps = deps.with_responder(connected.clone());
                    responder = Some(connected);
                }
                Err(e) => {
                    warn!(error = %e, "external responder unavailable, rule-based replies only");
                }
            }
        } else {
            info!("external responder disabled by configuration");
        }

        let engine = ChatEngine::new(config, deps)?;
        Ok(Self {
            engine,
            store,
            mailer,
            responder,
        })
    }

    /// Runs every adapter's health check. Failures are reported, not returned.
    pub async fn adapter_reports(&self) -> Vec<AdapterReport> {
        let mut reports = vec![
            report(self.store.as_ref()).await,
            report(self.mailer.as_ref()).await,
        ];
        if let Some(responder) = &self.responder {
            reports.push(report(responder.as_ref()).await);
        }
        reports
    }

    /// Shuts adapters down in reverse wiring order. The store goes last so
    /// its WAL checkpoint sees every write.
    pub async fn shutdown(self) -> Result<(), NovyraError> {
        if let Some(responder) = &self.responder
            && let Err(e) = responder.shutdown().await
        {
            warn!(adapter = responder.name(), error = %e, "adapter shutdown failed");
        }
        if let Err(e) = self.mailer.shutdown().await {
            warn!(adapter = self.mailer.name(), error = %e, "adapter shutdown failed");
        }
        self.store.shutdown().await?;
        debug!("runtime shut down");
        Ok(())
    }
}

async fn connect_responder(config: &NovyraConfig) -> Result<Arc<DeepSeekResponder>, NovyraError> {
    let responder = DeepSeekResponder::new(config).await?;
    ensure_healthy(&responder).await?;
    Ok(Arc::new(responder))
}

/// Fails on `Unhealthy`; `Degraded` is logged and tolerated.
async fn ensure_healthy<A>(adapter: &A) -> Result<(), NovyraError>
where
    A: PluginAdapter + ?Sized,
{
    match adapter.health_check().await? {
        HealthStatus::Healthy => {
            debug!(adapter = adapter.name(), "adapter healthy");
            Ok(())
        }
        HealthStatus::Degraded(reason) => {
            warn!(adapter = adapter.name(), %reason, "adapter degraded");
            Ok(())
        }
        HealthStatus::Unhealthy(reason) => Err(NovyraError::HealthCheckFailed {
            name: adapter.name().to_string(),
            source: reason.into(),
        }),
    }
}

async fn report<A>(adapter: &A) -> AdapterReport
where
    A: PluginAdapter + ?Sized,
{
    let health = adapter
        .health_check()
        .await
        .unwrap_or_else(|e| HealthStatus::Unhealthy(e.to_string()));
    AdapterReport {
        name: adapter.name().to_string(),
        kind: adapter.adapter_type(),
        version: adapter.version().to_string(),
        health,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use novyra_config::model::StorageConfig;

    fn config_in(dir: &tempfile::TempDir) -> NovyraConfig {
        let mut config = NovyraConfig::default();
        config.storage = StorageConfig {
            database_path: dir.path().join("runtime.db").to_string_lossy().to_string(),
            wal_mode: true,
        };
        config.responder.enabled = false;
        config
    }

    #[tokio::test]
    async fn open_reports_store_and_log_mailer() {
        let dir = tempfile::tempdir().unwrap();
        let runtime = Runtime::open(&config_in(&dir)).await.unwrap();

        let reports = runtime.adapter_reports().await;
        let names: Vec<_> = reports.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["sqlite", "log"]);
        assert!(reports.iter().all(|r| r.health == HealthStatus::Healthy));
        assert_eq!(reports[0].kind, AdapterType::Storage);

        runtime.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn data_survives_shutdown_and_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(&dir);

        let runtime = Runtime::open(&config).await.unwrap();
        assert_eq!(runtime.engine.seed_default_knowledge().await.unwrap(), 6);
        runtime.shutdown().await.unwrap();

        let reopened = Runtime::open(&config).await.unwrap();
        assert_eq!(reopened.engine.seed_default_knowledge().await.unwrap(), 0);
        reopened.shutdown().await.unwrap();
    }
}
