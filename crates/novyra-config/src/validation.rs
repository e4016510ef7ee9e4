// SPDX-FileCopyrightText: 2026 Novyra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Checks semantic constraints serde cannot express: value ranges, clock
//! times, weekday names and cross-field requirements.

use std::collections::HashSet;

use crate::diagnostic::ConfigError;
use crate::model::{parse_clock_time, NovyraConfig, WEEKDAYS};

/// Largest real-world UTC offset, in minutes.
const MAX_UTC_OFFSET_MINUTES: i32 = 14 * 60;

/// Validate a deserialized configuration for semantic correctness.
///
/// Collects every problem instead of stopping at the first one.
pub fn validate_config(config: &NovyraConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    let threshold = config.engine.confidence_threshold;
    if !(0.0..=1.0).contains(&threshold) {
        errors.push(ConfigError::out_of_range(
            "engine.confidence_threshold",
            threshold,
            "0.0 to 1.0",
        ));
    }

    if config
        .engine
        .escalation_keywords
        .iter()
        .any(|k| k.trim().is_empty())
    {
        errors.push(ConfigError::validation(
            "engine.escalation_keywords must not contain empty entries",
        ));
    }

    validate_responder(config, &mut errors);
    validate_business_hours(config, &mut errors);

    if config.escalation.default_max_concurrent_chats == 0 {
        errors.push(ConfigError::out_of_range(
            "escalation.default_max_concurrent_chats",
            0,
            "1 or more",
        ));
    }

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::validation(
            "storage.database_path must not be empty",
        ));
    }

    if config.bus.channel_capacity == 0 {
        errors.push(ConfigError::out_of_range("bus.channel_capacity", 0, "1 or more"));
    }

    if config.email.enabled
        && config
            .email
            .smtp_host
            .as_deref()
            .is_none_or(|h| h.trim().is_empty())
    {
        errors.push(ConfigError::validation(
            "email.smtp_host is required when email.enabled = true",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_responder(config: &NovyraConfig, errors: &mut Vec<ConfigError>) {
    let responder = &config.responder;

    if !(0.0..=2.0).contains(&responder.temperature) {
        errors.push(ConfigError::out_of_range(
            "responder.temperature",
            responder.temperature,
            "0.0 to 2.0",
        ));
    }
    if responder.max_tokens == 0 {
        errors.push(ConfigError::out_of_range("responder.max_tokens", 0, "1 or more"));
    }
    if responder.timeout_secs == 0 {
        errors.push(ConfigError::out_of_range("responder.timeout_secs", 0, "1 or more"));
    }
    if responder.enabled && !responder.api_base.starts_with("http") {
        errors.push(ConfigError::validation(format!(
            "responder.api_base `{}` must be an http(s) URL",
            responder.api_base
        )));
    }
}

fn validate_business_hours(config: &NovyraConfig, errors: &mut Vec<ConfigError>) {
    let hours = &config.business_hours;

    if hours.utc_offset_minutes.abs() > MAX_UTC_OFFSET_MINUTES {
        errors.push(ConfigError::out_of_range(
            "business_hours.utc_offset_minutes",
            hours.utc_offset_minutes,
            format!("-{MAX_UTC_OFFSET_MINUTES} to {MAX_UTC_OFFSET_MINUTES}"),
        ));
    }

    check_window(
        "business_hours",
        &hours.open_time,
        &hours.close_time,
        errors,
    );

    for day in &hours.closed_days {
        if !is_weekday(day) {
            errors.push(ConfigError::schedule(
                "business_hours.closed_days",
                format!("unknown weekday `{day}`"),
            ));
        }
    }

    let mut seen = HashSet::new();
    for (i, ov) in hours.overrides.iter().enumerate() {
        let day = ov.day.trim().to_lowercase();
        if !is_weekday(&day) {
            errors.push(ConfigError::schedule(
                &format!("business_hours.overrides[{i}].day"),
                format!("`{}` is not a weekday", ov.day),
            ));
        } else if !seen.insert(day) {
            errors.push(ConfigError::schedule(
                "business_hours.overrides",
                format!("more than one entry for `{}`", ov.day),
            ));
        }
        check_window(
            &format!("business_hours.overrides[{i}]"),
            &ov.open_time,
            &ov.close_time,
            errors,
        );
    }
}

fn check_window(prefix: &str, open: &str, close: &str, errors: &mut Vec<ConfigError>) {
    match (parse_clock_time(open), parse_clock_time(close)) {
        (Some(o), Some(c)) if o >= c => errors.push(ConfigError::schedule(
            prefix,
            format!("open_time ({open}) must be earlier than close_time ({close})"),
        )),
        (Some(_), Some(_)) => {}
        (o, c) => {
            if o.is_none() {
                errors.push(ConfigError::schedule(
                    &format!("{prefix}.open_time"),
                    format!("`{open}` is not a valid HH:MM time"),
                ));
            }
            if c.is_none() {
                errors.push(ConfigError::schedule(
                    &format!("{prefix}.close_time"),
                    format!("`{close}` is not a valid HH:MM time"),
                ));
            }
        }
    }
}

fn is_weekday(day: &str) -> bool {
    WEEKDAYS.contains(&day.trim().to_lowercase().as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DayHoursOverride;

    fn has_error(errors: &[ConfigError], needle: &str) -> bool {
        errors.iter().any(|e| e.to_string().contains(needle))
    }

    #[test]
    fn default_config_validates() {
        assert!(validate_config(&NovyraConfig::default()).is_ok());
    }

    #[test]
    fn threshold_out_of_range_fails() {
        let mut config = NovyraConfig::default();
        config.engine.confidence_threshold = 1.5;
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "confidence_threshold"));
        assert!(matches!(
            &errors[0],
            ConfigError::OutOfRange { value, accepted, .. } if value == "1.5" && accepted == "0.0 to 1.0"
        ));
    }

    #[test]
    fn empty_database_path_fails_validation() {
        let mut config = NovyraConfig::default();
        config.storage.database_path = "  ".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "database_path"));
    }

    #[test]
    fn closing_before_opening_fails() {
        let mut config = NovyraConfig::default();
        config.business_hours.open_time = "18:00".into();
        config.business_hours.close_time = "09:00".into();
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "must be earlier"));
        assert!(matches!(
            &errors[0],
            ConfigError::InvalidSchedule { key, .. } if key == "business_hours"
        ));
    }

    #[test]
    fn unknown_weekday_fails() {
        let mut config = NovyraConfig::default();
        config.business_hours.closed_days = vec!["funday".into()];
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "funday"));
    }

    #[test]
    fn duplicate_override_fails() {
        let mut config = NovyraConfig::default();
        let ov = DayHoursOverride {
            day: "Saturday".into(),
            open_time: "10:00".into(),
            close_time: "14:00".into(),
        };
        config.business_hours.overrides = vec![ov.clone(), ov];
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "more than one entry"));
    }

    #[test]
    fn email_without_host_fails() {
        let mut config = NovyraConfig::default();
        config.email.enabled = true;
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "smtp_host"));
    }

    #[test]
    fn collects_every_error() {
        let mut config = NovyraConfig::default();
        config.escalation.default_max_concurrent_chats = 0;
        config.bus.channel_capacity = 0;
        config.responder.max_tokens = 0;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
    }
}
