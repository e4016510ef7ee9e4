// SPDX-FileCopyrightText: 2026 Novyra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./novyra.toml` > `~/.config/novyra/novyra.toml` > `/etc/novyra/novyra.toml`
//! with environment variable overrides via `NOVYRA_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::NovyraConfig;

/// Top-level sections that environment keys may address. `business_hours`
/// comes first so its underscore is not mistaken for a section separator.
const ENV_SECTIONS: &[&str] = &[
    "business_hours",
    "assistant",
    "engine",
    "responder",
    "escalation",
    "storage",
    "bus",
    "email",
];

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/novyra/novyra.toml` (system-wide)
/// 3. `~/.config/novyra/novyra.toml` (user XDG config)
/// 4. `./novyra.toml` (local directory)
/// 5. `NOVYRA_*` environment variables
pub fn load_config() -> Result<NovyraConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string over the compiled defaults.
///
/// Used for testing and embedded configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<NovyraConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(NovyraConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<NovyraConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(NovyraConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used internally for config loading.
///
/// Returns the Figment before extraction so callers can inspect metadata.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(NovyraConfig::default()))
        .merge(Toml::file("/etc/novyra/novyra.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("novyra/novyra.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("novyra.toml"))
        .merge(env_provider())
}

/// Maps `NOVYRA_<SECTION>_<KEY>` onto `section.key`.
///
/// Only the section prefix is rewritten, so `NOVYRA_ENGINE_ESCALATION_KEYWORDS`
/// lands on `engine.escalation_keywords` and `NOVYRA_RESPONDER_API_KEY` on
/// `responder.api_key`.
fn env_provider() -> Env {
    Env::prefixed("NOVYRA_").map(|key| {
        let key_str = key.as_str();
        for section in ENV_SECTIONS {
            if let Some(rest) = key_str
                .strip_prefix(section)
                .and_then(|r| r.strip_prefix('_'))
            {
                return format!("{section}.{rest}").into();
            }
        }
        key_str.to_string().into()
    })
}
