// SPDX-FileCopyrightText: 2026 Novyra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! DeepSeek chat-completion responder for the Novyra chat engine.
//!
//! This crate implements [`ExternalResponder`] over an OpenAI-compatible
//! chat-completion API. A successful reply is post-processed by
//! [`heuristics`] to decide escalation, failure and the intent label.

pub mod client;
pub mod heuristics;
pub mod prompt;
pub mod types;

use std::time::Duration;

use async_trait::async_trait;
use novyra_config::NovyraConfig;
use novyra_core::error::NovyraError;
use novyra_core::traits::{ExternalResponder, PluginAdapter};
use novyra_core::types::{
    AdapterType, HealthStatus, HistoryTurn, MessageType, ResponderReply, ResponderRequest,
};
use tracing::{debug, info};

use crate::client::DeepSeekClient;
use crate::types::{ApiMessage, ChatCompletionRequest};

const ESCALATING_CONFIDENCE: f32 = 0.9;
const ANSWERING_CONFIDENCE: f32 = 0.85;

/// External responder backed by the DeepSeek chat-completion API.
///
/// API key resolution order: config -> `DEEPSEEK_API_KEY` env var -> error.
pub struct DeepSeekResponder {
    client: DeepSeekClient,
    system_prompt: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
    history_turns: usize,
    call_timeout: Duration,
}

impl DeepSeekResponder {
    /// Creates a responder from the given configuration.
    ///
    /// # System Prompt Resolution
    /// 1. `config.assistant.system_prompt_file` if set and readable
    /// 2. `config.assistant.system_prompt` if set
    /// 3. The built-in persona with the service catalog
    pub async fn new(config: &NovyraConfig) -> Result<Self, NovyraError> {
        let api_key = resolve_api_key(&config.responder.api_key)?;
        let system_prompt = prompt::load_system_prompt(
            &config.assistant.name,
            &config.assistant.business_name,
            &config.assistant.system_prompt,
            &config.assistant.system_prompt_file,
        )
        .await;

        let responder = Self::with_prompt(config, &api_key, system_prompt)?;
        info!(model = %responder.model, "DeepSeek responder initialized");
        Ok(responder)
    }

    /// Creates a responder with an explicit key and prompt, skipping
    /// environment and file lookups.
    pub fn with_prompt(
        config: &NovyraConfig,
        api_key: &str,
        system_prompt: String,
    ) -> Result<Self, NovyraError> {
        let cfg = &config.responder;
        // One retry plus its one-second pause fit inside the call budget.
        let call_timeout = Duration::from_secs(cfg.timeout_secs.max(1));
        let attempt_timeout = Duration::from_secs((cfg.timeout_secs.saturating_sub(1) / 2).max(1));
        let client = DeepSeekClient::new(api_key, &cfg.api_base, attempt_timeout)?;

        Ok(Self {
            client,
            system_prompt,
            model: cfg.model.clone(),
            temperature: cfg.temperature,
            max_tokens: cfg.max_tokens,
            history_turns: cfg.history_turns,
            call_timeout,
        })
    }

    /// Builds the chat-completion request for one customer message.
    fn to_completion_request(&self, request: &ResponderRequest) -> ChatCompletionRequest {
        let system = prompt::with_context(
            &self.system_prompt,
            &request.context,
            request.business_hours,
        );

        let skip = request.history.len().saturating_sub(self.history_turns);
        let mut messages = Vec::with_capacity(request.history.len() - skip + 2);
        messages.push(ApiMessage::system(system));
        messages.extend(request.history[skip..].iter().map(history_message));
        messages.push(ApiMessage::user(request.message.clone()));

        ChatCompletionRequest {
            model: self.model.clone(),
            messages,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            stream: false,
        }
    }
}

/// Customer turns go up as `user`; AI, agent and system turns as `assistant`.
fn history_message(turn: &HistoryTurn) -> ApiMessage {
    match turn.message_type {
        MessageType::User => ApiMessage::user(turn.content.clone()),
        _ => ApiMessage::assistant(turn.content.clone()),
    }
}

#[async_trait]
impl PluginAdapter for DeepSeekResponder {
    fn name(&self) -> &str {
        "deepseek"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Responder
    }

    async fn health_check(&self) -> Result<HealthStatus, NovyraError> {
        // A test completion would spend tokens; configuration was checked in `new`.
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), NovyraError> {
        debug!("DeepSeek responder shutting down");
        Ok(())
    }
}

#[async_trait]
impl ExternalResponder for DeepSeekResponder {
    async fn respond(&self, request: &ResponderRequest) -> Result<ResponderReply, NovyraError> {
        let api_request = self.to_completion_request(request);

        let response = tokio::time::timeout(self.call_timeout, self.client.complete(&api_request))
            .await
            .map_err(|_| NovyraError::Timeout {
                duration: self.call_timeout,
            })??;

        let text = response
            .first_text()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| NovyraError::Responder {
                message: "completion contained no text".into(),
                source: None,
            })?;

        let failed = heuristics::detect_failure(&text);
        let should_escalate = heuristics::should_escalate(&request.message, &text) || failed;
        let intent = heuristics::detect_intent(&request.message).to_string();

        debug!(
            intent = %intent,
            should_escalate,
            failed,
            "external reply classified"
        );

        Ok(ResponderReply {
            text,
            confidence: if should_escalate {
                ESCALATING_CONFIDENCE
            } else {
                ANSWERING_CONFIDENCE
            },
            should_escalate,
            failed,
            intent,
        })
    }
}

/// Resolves the API key from config or environment.
fn resolve_api_key(config_key: &Option<String>) -> Result<String, NovyraError> {
    if let Some(key) = config_key
        && !key.is_empty()
    {
        return Ok(key.clone());
    }

    std::env::var("DEEPSEEK_API_KEY")
        .ok()
        .filter(|k| !k.is_empty())
        .ok_or_else(|| {
            NovyraError::Config(
                "DeepSeek API key not found. Set responder.api_key in config or DEEPSEEK_API_KEY environment variable.".into(),
            )
        })
}
