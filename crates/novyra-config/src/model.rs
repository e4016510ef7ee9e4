// SPDX-FileCopyrightText: 2026 Novyra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Novyra chat engine.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Weekday names accepted in `business_hours.closed_days` and overrides.
pub const WEEKDAYS: &[&str] = &[
    "monday",
    "tuesday",
    "wednesday",
    "thursday",
    "friday",
    "saturday",
    "sunday",
];

/// Top-level Novyra configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct NovyraConfig {
    /// Assistant identity and logging.
    #[serde(default)]
    pub assistant: AssistantConfig,

    /// Intent matching and escalation policy.
    #[serde(default)]
    pub engine: EngineConfig,

    /// External chat-completion responder.
    #[serde(default)]
    pub responder: ResponderConfig,

    /// Opening hours used for after-hours handling.
    #[serde(default)]
    pub business_hours: BusinessHoursConfig,

    /// Human agent routing.
    #[serde(default)]
    pub escalation: EscalationConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Live-update fan-out.
    #[serde(default)]
    pub bus: BusConfig,

    /// Outbound email.
    #[serde(default)]
    pub email: EmailConfig,
}

impl NovyraConfig {
    /// Serializes the effective configuration back to TOML.
    pub fn to_toml(&self) -> Result<String, crate::ConfigError> {
        toml::to_string_pretty(self).map_err(|e| crate::ConfigError::Other(e.to_string()))
    }
}

/// Assistant identity and behavior configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AssistantConfig {
    /// Display name of the assistant.
    #[serde(default = "default_assistant_name")]
    pub name: String,

    /// Business the assistant speaks for.
    #[serde(default = "default_business_name")]
    pub business_name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Inline system prompt string. Overridden by `system_prompt_file` if both set.
    #[serde(default)]
    pub system_prompt: Option<String>,

    /// Path to a markdown file containing the system prompt.
    /// Takes precedence over `system_prompt` if both are set.
    #[serde(default)]
    pub system_prompt_file: Option<String>,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            name: default_assistant_name(),
            business_name: default_business_name(),
            log_level: default_log_level(),
            system_prompt: None,
            system_prompt_file: None,
        }
    }
}

fn default_assistant_name() -> String {
    "novyra".to_string()
}

fn default_business_name() -> String {
    "Novyra Digital".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Intent matching and escalation policy.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    /// Matches below this confidence are treated as "not understood".
    #[serde(default = "default_confidence_threshold")]
    pub confidence_threshold: f32,

    /// Words that always count as a request for a human.
    #[serde(default = "default_escalation_keywords")]
    pub escalation_keywords: Vec<String>,

    /// Let a low-confidence rule-based reply trigger escalation by itself.
    /// Off by default: only an explicit request or an external responder
    /// failure hands a customer to an agent.
    #[serde(default)]
    pub escalate_on_rule_based_low_confidence: bool,

    /// How many helpful learned exchanges the matcher compares against.
    #[serde(default = "default_learning_sample_size")]
    pub learning_sample_size: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: default_confidence_threshold(),
            escalation_keywords: default_escalation_keywords(),
            escalate_on_rule_based_low_confidence: false,
            learning_sample_size: default_learning_sample_size(),
        }
    }
}

fn default_confidence_threshold() -> f32 {
    0.7
}

fn default_escalation_keywords() -> Vec<String> {
    ["help", "agent", "human", "support", "escalate"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_learning_sample_size() -> usize {
    50
}

/// External chat-completion responder configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ResponderConfig {
    /// Try the external responder before the rule-based matcher.
    #[serde(default = "default_responder_enabled")]
    pub enabled: bool,

    /// API key. `None` falls back to the `DEEPSEEK_API_KEY` environment variable.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Base URL of the OpenAI-compatible API.
    #[serde(default = "default_api_base")]
    pub api_base: String,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Upper bound for one call, including the retry.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Prior transcript entries sent with each request.
    #[serde(default = "default_history_turns")]
    pub history_turns: usize,
}

impl Default for ResponderConfig {
    fn default() -> Self {
        Self {
            enabled: default_responder_enabled(),
            api_key: None,
            api_base: default_api_base(),
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_timeout_secs(),
            history_turns: default_history_turns(),
        }
    }
}

fn default_responder_enabled() -> bool {
    true
}

fn default_api_base() -> String {
    "https://api.deepseek.com".to_string()
}

fn default_model() -> String {
    "deepseek-chat".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> u32 {
    1000
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_history_turns() -> usize {
    10
}

/// Weekly opening hours in a fixed UTC offset.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BusinessHoursConfig {
    /// Offset from UTC in minutes (60 = West Africa Time).
    #[serde(default = "default_utc_offset_minutes")]
    pub utc_offset_minutes: i32,

    /// Label shown to customers next to times.
    #[serde(default = "default_timezone_label")]
    pub timezone_label: String,

    /// Opening time, `HH:MM`.
    #[serde(default = "default_open_time")]
    pub open_time: String,

    /// Closing time, `HH:MM`. The closing minute itself still counts as open.
    #[serde(default = "default_close_time")]
    pub close_time: String,

    #[serde(default = "default_closed_days")]
    pub closed_days: Vec<String>,

    /// Days with non-standard hours.
    #[serde(default)]
    pub overrides: Vec<DayHoursOverride>,
}

impl Default for BusinessHoursConfig {
    fn default() -> Self {
        Self {
            utc_offset_minutes: default_utc_offset_minutes(),
            timezone_label: default_timezone_label(),
            open_time: default_open_time(),
            close_time: default_close_time(),
            closed_days: default_closed_days(),
            overrides: Vec::new(),
        }
    }
}

/// Replacement hours for one weekday.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DayHoursOverride {
    pub day: String,
    pub open_time: String,
    pub close_time: String,
}

fn default_utc_offset_minutes() -> i32 {
    60
}

fn default_timezone_label() -> String {
    "WAT".to_string()
}

fn default_open_time() -> String {
    "09:00".to_string()
}

fn default_close_time() -> String {
    "18:00".to_string()
}

fn default_closed_days() -> Vec<String> {
    vec!["sunday".to_string()]
}

/// Parses `HH:MM` into minutes after midnight.
pub fn parse_clock_time(value: &str) -> Option<u32> {
    let (h, m) = value.trim().split_once(':')?;
    let h: u32 = h.parse().ok()?;
    let m: u32 = m.parse().ok()?;
    (h < 24 && m < 60).then_some(h * 60 + m)
}

/// Human agent routing configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EscalationConfig {
    /// Chat slots given to an agent profile created on first use.
    #[serde(default = "default_max_concurrent_chats")]
    pub default_max_concurrent_chats: u32,
}

impl Default for EscalationConfig {
    fn default() -> Self {
        Self {
            default_max_concurrent_chats: default_max_concurrent_chats(),
        }
    }
}

fn default_max_concurrent_chats() -> u32 {
    5
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("novyra").join("novyra.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("novyra.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_wal_mode() -> bool {
    true
}

/// Live-update fan-out configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BusConfig {
    /// Buffered events per session topic before slow subscribers lag.
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            channel_capacity: default_channel_capacity(),
        }
    }
}

fn default_channel_capacity() -> usize {
    64
}

/// Outbound email configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EmailConfig {
    /// Deliver over SMTP. When off, emails are only logged.
    #[serde(default)]
    pub enabled: bool,

    #[serde(default)]
    pub smtp_host: Option<String>,

    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,

    #[serde(default)]
    pub username: Option<String>,

    #[serde(default)]
    pub password: Option<String>,

    #[serde(default = "default_from_address")]
    pub from_address: String,

    /// Recipient for staff alerts when no staff member has an email address.
    #[serde(default)]
    pub staff_fallback_address: Option<String>,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            smtp_host: None,
            smtp_port: default_smtp_port(),
            username: None,
            password: None,
            from_address: default_from_address(),
            staff_fallback_address: None,
        }
    }
}

fn default_smtp_port() -> u16 {
    587
}

fn default_from_address() -> String {
    "Novyra Support <support@novyra.local>".to_string()
}
