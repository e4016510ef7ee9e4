// SPDX-FileCopyrightText: 2026 Novyra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Novyra chat engine.
//!
//! This crate provides the trait definitions, error type, and domain types
//! shared across the Novyra workspace. Storage, responder and delivery
//! backends implement the traits defined here.

pub mod error;
pub mod traits;
pub mod types;

pub use error::NovyraError;
pub use types::{AdapterType, HealthStatus};

pub use traits::{
    Broadcaster, ChatStore, Clock, EmailSender, ExternalResponder, NotificationSink,
    PluginAdapter, SystemClock,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn novyra_error_messages() {
        let err = NovyraError::Config("bad".into());
        assert_eq!(err.to_string(), "configuration error: bad");

        let err = NovyraError::session_not_found("abc");
        assert_eq!(err.to_string(), "session not found: abc");

        let err = NovyraError::Timeout {
            duration: std::time::Duration::from_secs(30),
        };
        assert!(err.to_string().contains("30s"));

        let err = NovyraError::Responder {
            message: "status 503".into(),
            source: None,
        };
        assert_eq!(err.to_string(), "responder error: status 503");
    }

    #[test]
    fn adapter_type_round_trips() {
        use std::str::FromStr;

        for variant in [AdapterType::Storage, AdapterType::Responder, AdapterType::Email] {
            let s = variant.to_string();
            assert_eq!(AdapterType::from_str(&s).unwrap(), variant);
        }
    }

    #[test]
    fn system_clock_moves_forward() {
        let clock = SystemClock;
        let a = clock.now();
        let b = clock.now();
        assert!(b >= a);
    }

    #[test]
    fn all_traits_are_exported() {
        fn _assert_store<T: ChatStore>() {}
        fn _assert_responder<T: ExternalResponder>() {}
        fn _assert_mailer<T: EmailSender>() {}
        fn _assert_broadcaster<T: Broadcaster>() {}
        fn _assert_sink<T: NotificationSink>() {}
    }
}
