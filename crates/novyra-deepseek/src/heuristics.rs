// SPDX-FileCopyrightText: 2026 Novyra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-processing of a successful external reply: should it escalate, did
//! the responder actually fail, and what was the customer asking about.
//!
//! All checks run on normalized text (see [`novyra_router::text`]).

use novyra_router::handoff::explicit_agent_request;
use novyra_router::text::{contains_any, contains_phrase, normalize};

const PURCHASE_PHRASES: &[&str] = &[
    "i want to purchase",
    "i want to buy",
    "i'm ready to buy",
    "i'm ready to purchase",
    "sign me up",
    "i want to sign up",
    "i'm ready to start",
    "let's start the project",
    "i want to proceed",
];

const COMPLAINT_PHRASES: &[&str] = &[
    "complaint",
    "refund",
    "cancel",
    "dissatisfied",
    "not happy",
    "very frustrated",
    "very angry",
    "terrible service",
    "bad experience",
];

const ACCOUNT_PHRASES: &[&str] = &[
    "my account status",
    "my project status",
    "my order status",
    "check my account",
    "my subscription status",
    "my package status",
];

const CONNECT_PHRASES: &[&str] = &[
    "connect you with",
    "speak with an agent",
    "connect to an agent",
    "let me connect you",
    "i'll connect you",
    "transfer you to",
    "connect you to one of our team",
    "connect you to a team member",
];

const STRONG_CONNECT_MARKERS: &[&str] = &["i'd be happy to connect", "let me connect"];

const NO_ACCESS_PHRASES: &[&str] = &[
    "i don't have access to your account",
    "i cannot access your account",
    "i don't have access to your order",
    "i cannot access your order",
    "i don't have access to your project",
    "i cannot access your project",
    "i don't have access to your subscription",
    "i cannot access your subscription",
    "i'm unable to access your account",
    "i am unable to access your account",
];

const SHORT_REPLY_CONNECT_PHRASES: &[&str] =
    &["connect you with", "speak with an agent", "let me connect you"];

const HELPFUL_WORDS: &[&str] = &["help", "assist", "answer", "information", "service"];

const SHORT_REPLY_CHARS: usize = 20;

const INTENT_RULES: &[(&str, &[&str])] = &[
    (
        "pricing",
        &["price", "prices", "cost", "costs", "pricing", "how much", "package", "packages", "plan", "plans"],
    ),
    (
        "service_inquiry",
        &["service", "services", "what do you", "offer", "provide", "do you do"],
    ),
    ("social_media", &["social media", "instagram", "facebook", "tiktok"]),
    ("branding", &["branding", "logo", "brand identity"]),
    (
        "campaigns",
        &["campaign", "campaigns", "advertising", "ads", "paid media"],
    ),
    ("content", &["content", "blog", "seo", "copywriting"]),
    (
        "greeting",
        &["hi", "hello", "hey", "good morning", "good afternoon"],
    ),
    ("escalation", &["agent", "human", "speak with", "talk to"]),
];

/// Whether the exchange calls for a human: an explicit request, purchase
/// readiness, a serious complaint, an account-specific question, or a reply
/// that firmly offers to connect.
///
/// A reply that merely mentions an agent does not count.
pub fn should_escalate(user_message: &str, reply: &str) -> bool {
    if explicit_agent_request(user_message) {
        return true;
    }

    let user = normalize(user_message);
    if contains_any(&user, PURCHASE_PHRASES)
        || contains_any(&user, COMPLAINT_PHRASES)
        || contains_any(&user, ACCOUNT_PHRASES)
    {
        return true;
    }

    let reply = normalize(reply);
    contains_any(&reply, CONNECT_PHRASES) && contains_any(&reply, STRONG_CONNECT_MARKERS)
}

/// The reply admits it cannot help: it states it has no access to the
/// customer's records, or it is a bare hand-off with no substance.
pub fn detect_failure(reply: &str) -> bool {
    let normalized = normalize(reply);
    if contains_any(&normalized, NO_ACCESS_PHRASES) {
        return true;
    }

    reply.trim().chars().count() < SHORT_REPLY_CHARS
        && contains_any(&normalized, SHORT_REPLY_CONNECT_PHRASES)
        && !contains_any(&normalized, HELPFUL_WORDS)
}

/// Coarse topic label for the customer's message.
pub fn detect_intent(user_message: &str) -> &'static str {
    let text = normalize(user_message);
    INTENT_RULES
        .iter()
        .find(|(_, patterns)| patterns.iter().any(|p| contains_phrase(&text, p)))
        .map(|(intent, _)| *intent)
        .unwrap_or("general")
}
