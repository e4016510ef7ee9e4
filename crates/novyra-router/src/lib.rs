// SPDX-FileCopyrightText: 2026 Novyra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Rule-based intent matching for the Novyra chat engine.
//!
//! This crate provides:
//! - [`IntentMatcher`]: keyword and heuristic intent classification over a
//!   [`MatchCorpus`] snapshot (pure, no I/O)
//! - [`is_abusive`]: regex-based abusive-language detection
//! - [`search_pages`]: similarity search over stored website pages
//! - [`catalog`]: the built-in service catalog and default FAQ entries
//! - [`handoff`]: explicit agent and ticket request detection

pub mod abuse;
pub mod catalog;
pub mod handoff;
pub mod matcher;
pub mod text;
pub mod website;

pub use abuse::{is_abusive, ABUSE_REPLY};
pub use handoff::{explicit_agent_request, wants_ticket};
pub use matcher::{IntentMatch, IntentMatcher, MatchCorpus, MatchPayload};
pub use website::{search_pages, PageHit};
