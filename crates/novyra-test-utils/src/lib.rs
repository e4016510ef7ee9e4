// SPDX-FileCopyrightText: 2026 Novyra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Novyra integration tests.
//!
//! Provides mock adapters and test harness infrastructure for fast,
//! deterministic, CI-runnable tests without external services.
//!
//! # Components
//!
//! - [`MockResponder`] - Scripted external responder that records requests
//! - [`RecordingMailer`] - Email sender that keeps what it was given
//! - [`FixedClock`] - Clock pinned to a chosen instant
//! - [`TestHarness`] - Complete engine over a temp SQLite database

pub mod harness;
pub mod mock_responder;
pub mod recording;

pub use harness::{TestHarness, after_hours_now, business_hours_now};
pub use mock_responder::{MockOutcome, MockResponder};
pub use recording::{FixedClock, RecordingMailer};
