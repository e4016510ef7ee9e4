// SPDX-FileCopyrightText: 2026 Novyra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Figment-to-miette error bridge with "did you mean?" suggestions.

#![allow(unused_assignments)] // miette's Diagnostic derive generates code triggering this lint

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Minimum Jaro-Winkler similarity before a key is offered as a correction.
const SUGGESTION_THRESHOLD: f64 = 0.75;

/// A configuration problem, renderable by miette.
///
/// Parse-time variants carry a source span when the offending key can be
/// located in a TOML file. Post-parse variants name the dotted key path.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    /// A key that no section of `novyra.toml` defines.
    #[error("unknown configuration key `{key}`")]
    #[diagnostic(
        code(novyra::config::unknown_key),
        help("{}", unknown_key_help(suggestion.as_deref(), valid_keys))
    )]
    UnknownKey {
        /// The unrecognized key as written.
        key: String,
        /// Closest valid key, if any is close enough.
        suggestion: Option<String>,
        /// Comma-separated keys accepted in the same section.
        valid_keys: String,
        /// Where the key appears in its file.
        #[label("not a recognized key")]
        span: Option<SourceSpan>,
        /// The file the key came from.
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    /// A value of the wrong TOML type, such as a quoted number.
    #[error("invalid type for key `{key}`: {detail}")]
    #[diagnostic(code(novyra::config::invalid_type), help("expected {expected}"))]
    InvalidType {
        /// Dotted path of the key.
        key: String,
        /// What was found against what was expected.
        detail: String,
        /// The expected type alone, for the help line.
        expected: String,
        /// Where the key appears in its file.
        #[label("wrong type here")]
        span: Option<SourceSpan>,
        /// The file the key came from.
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    /// A key with no default that was never set.
    #[error("missing required key `{key}`")]
    #[diagnostic(
        code(novyra::config::missing_key),
        help("add `{key} = <value>` to your novyra.toml")
    )]
    MissingKey {
        /// Name of the missing key.
        key: String,
    },

    /// A numeric setting outside the range the engine accepts.
    #[error("`{key}` is out of range: got {value}")]
    #[diagnostic(code(novyra::config::out_of_range), help("`{key}` accepts {accepted}"))]
    OutOfRange {
        /// Dotted path, e.g. `engine.confidence_threshold`.
        key: String,
        /// The configured value as written.
        value: String,
        /// Human description of the accepted range.
        accepted: String,
    },

    /// An opening-hours window or weekday that cannot form a weekly schedule.
    #[error("invalid business hours at `{key}`: {message}")]
    #[diagnostic(
        code(novyra::config::schedule),
        help("times are 24-hour `HH:MM` in the business's local time; weekdays are English names such as `saturday`")
    )]
    InvalidSchedule {
        /// Dotted path, e.g. `business_hours.overrides[1]`.
        key: String,
        /// What is wrong with the window or day.
        message: String,
    },

    /// Any other semantic problem: empty paths, missing SMTP host and so on.
    #[error("validation error: {message}")]
    #[diagnostic(code(novyra::config::validation))]
    Validation {
        /// Sentence naming the key and the constraint it broke.
        message: String,
    },

    /// A figment error with no more specific mapping.
    #[error("configuration error: {0}")]
    #[diagnostic(code(novyra::config::other))]
    Other(String),
}

impl ConfigError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub(crate) fn out_of_range(
        key: &str,
        value: impl ToString,
        accepted: impl Into<String>,
    ) -> Self {
        Self::OutOfRange {
            key: key.to_string(),
            value: value.to_string(),
            accepted: accepted.into(),
        }
    }

    pub(crate) fn schedule(key: &str, message: impl Into<String>) -> Self {
        Self::InvalidSchedule {
            key: key.to_string(),
            message: message.into(),
        }
    }
}

fn unknown_key_help(suggestion: Option<&str>, valid_keys: &str) -> String {
    match suggestion {
        Some(s) => format!("did you mean `{s}`? Valid keys: {valid_keys}"),
        None => format!("valid keys: {valid_keys}"),
    }
}

/// Convert every error carried by a `figment::Error` into a [`ConfigError`].
pub fn figment_to_config_errors(
    err: figment::Error,
    toml_sources: &[(String, String)],
) -> Vec<ConfigError> {
    use figment::error::Kind;

    err.into_iter()
        .map(|error| match &error.kind {
            Kind::UnknownField(field, expected) => {
                let valid_keys: Vec<&str> = expected.to_vec();
                let (span, src) = locate_key(&error, field, toml_sources);
                ConfigError::UnknownKey {
                    key: field.clone(),
                    suggestion: suggest_key(field, &valid_keys),
                    valid_keys: valid_keys.join(", "),
                    span,
                    src,
                }
            }
            Kind::MissingField(field) => ConfigError::MissingKey {
                key: field.clone().into_owned(),
            },
            Kind::InvalidType(actual, expected) => {
                let key = error.path.join(".");
                let (span, src) = match error.path.last() {
                    Some(last) => locate_key(&error, last, toml_sources),
                    None => (None, None),
                };
                ConfigError::InvalidType {
                    key,
                    detail: format!("found {actual}, expected {expected}"),
                    expected: expected.to_string(),
                    span,
                    src,
                }
            }
            _ => ConfigError::Other(error.to_string()),
        })
        .collect()
}

/// Source span of `field` in whichever TOML file produced the error.
fn locate_key(
    error: &figment::error::Error,
    field: &str,
    toml_sources: &[(String, String)],
) -> (Option<SourceSpan>, Option<NamedSource<String>>) {
    let origin = error
        .metadata
        .as_ref()
        .and_then(|m| m.source.as_ref())
        .and_then(|s| match s {
            figment::Source::File(path) => Some(path.display().to_string()),
            _ => None,
        });

    // Inline strings carry no file path; fall back to the only source given.
    let source = match origin {
        Some(path) => toml_sources.iter().find(|(p, _)| *p == path),
        None if toml_sources.len() == 1 => toml_sources.first(),
        None => None,
    };

    let Some((path, content)) = source else {
        return (None, None);
    };

    let section: Vec<String> = error
        .path
        .iter()
        .filter(|p| p.as_str() != field)
        .cloned()
        .collect();

    match find_key_offset(content, &section, field) {
        Some(offset) => (
            Some(SourceSpan::new(offset.into(), field.len())),
            Some(NamedSource::new(path, content.clone())),
        ),
        None => (None, None),
    }
}

/// Byte offset of `field` inside the `[section]` table named by `path[0]`,
/// or from the top of the file when `path` is empty.
pub fn find_key_offset(content: &str, path: &[String], field: &str) -> Option<usize> {
    let start = match path.first() {
        Some(section) => {
            let header = format!("[{section}]");
            content.find(&header)? + header.len()
        }
        None => 0,
    };

    let mut offset = start;
    for line in content[start..].split_inclusive('\n') {
        let trimmed = line.trim_start();
        if trimmed.starts_with('[') && !path.is_empty() {
            // Left the section without finding the key.
            return None;
        }
        if let Some(after) = trimmed.strip_prefix(field)
            && after.trim_start().starts_with('=')
        {
            return Some(offset + (line.len() - trimmed.len()));
        }
        offset += line.len();
    }

    None
}

/// Best Jaro-Winkler match for `unknown` above the suggestion threshold.
pub fn suggest_key(unknown: &str, valid_keys: &[&str]) -> Option<String> {
    valid_keys
        .iter()
        .map(|&key| (key, strsim::jaro_winkler(unknown, key)))
        .filter(|(_, score)| *score > SUGGESTION_THRESHOLD)
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(key, _)| key.to_string())
}

/// Render errors to stderr using miette's graphical handler.
pub fn render_errors(errors: &[ConfigError]) {
    use miette::GraphicalReportHandler;

    let handler = GraphicalReportHandler::new();
    for error in errors {
        let mut buf = String::new();
        if handler.render_report(&mut buf, error).is_ok() {
            eprint!("{buf}");
        } else {
            eprintln!("Error: {error}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suggests_threshold_for_thresold() {
        let valid = &["confidence_threshold", "escalation_keywords"];
        assert_eq!(
            suggest_key("confidence_thresold", valid),
            Some("confidence_threshold".to_string())
        );
    }

    #[test]
    fn suggests_closed_days_for_close_days() {
        let valid = &["open_time", "close_time", "closed_days"];
        assert_eq!(
            suggest_key("close_days", valid),
            Some("closed_days".to_string())
        );
    }

    #[test]
    fn no_suggestion_for_distant_typo() {
        let valid = &["name", "business_name", "log_level"];
        assert_eq!(suggest_key("zzzzzz", valid), None);
    }

    #[test]
    fn find_key_offset_in_section() {
        let content = "[assistant]\nname = \"x\"\n\n[engine]\nthresold = 0.5\n";
        let path = vec!["engine".to_string()];
        let o = find_key_offset(content, &path, "thresold").unwrap();
        assert_eq!(&content[o..o + 8], "thresold");
    }

    #[test]
    fn out_of_range_help_names_accepted_values() {
        use miette::Diagnostic;

        let error = ConfigError::out_of_range("engine.confidence_threshold", 1.5, "0.0 to 1.0");
        assert_eq!(
            error.to_string(),
            "`engine.confidence_threshold` is out of range: got 1.5"
        );
        let help = error.help().map(|h| h.to_string()).unwrap_or_default();
        assert!(help.contains("0.0 to 1.0"), "got: {help}");
    }

    #[test]
    fn find_key_offset_stays_inside_section() {
        let content = "[engine]\nx = 1\n\n[responder]\nmodel = \"m\"\n";
        let path = vec!["engine".to_string()];
        assert_eq!(find_key_offset(content, &path, "model"), None);
    }
}
