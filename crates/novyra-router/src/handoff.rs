// SPDX-FileCopyrightText: 2026 Novyra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Phrases by which a customer asks for a human or a support ticket.

use crate::text::{contains_any, normalize};

pub const EXPLICIT_AGENT_PHRASES: &[&str] = &[
    "i want to speak with an agent",
    "i want to talk to an agent",
    "connect me to an agent",
    "connect me to a human",
    "i need to speak with an agent",
    "i need to talk to an agent",
    "let me speak with an agent",
    "let me talk to an agent",
    "speak with an agent",
    "talk to an agent",
    "get an agent",
    "i want a human",
    "i need a human",
    "real person",
    "real human agent",
];

const CONTACT_VERBS: &[&str] = &["speak with", "talk to"];
const CONTACT_TARGETS: &[&str] = &["agent", "human", "representative"];

pub const TICKET_REQUEST_PHRASES: &[&str] = &[
    "create ticket",
    "yes create",
    "create a ticket",
    "make a ticket",
    "support ticket",
];

/// The customer explicitly asked for a human: a fixed phrase, or "speak
/// with"/"talk to" together with agent, human or representative.
pub fn explicit_agent_request(message: &str) -> bool {
    let text = normalize(message);
    contains_any(&text, EXPLICIT_AGENT_PHRASES)
        || (contains_any(&text, CONTACT_VERBS) && contains_any(&text, CONTACT_TARGETS))
}

pub fn wants_ticket(message: &str) -> bool {
    contains_any(&normalize(message), TICKET_REQUEST_PHRASES)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_requests_are_recognized() {
        assert!(explicit_agent_request("I want to speak with an agent please"));
        assert!(explicit_agent_request("Can I talk to a real person?"));
        assert!(explicit_agent_request("let me talk to your representative"));
        assert!(explicit_agent_request("I'd like to speak with a human"));
        assert!(!explicit_agent_request("What does an agent do here?"));
        assert!(!explicit_agent_request("how much is the premium plan"));
        assert!(!explicit_agent_request("I'd like to talk to you about SEO"));
    }

    #[test]
    fn ticket_requests() {
        assert!(wants_ticket("Yes, create a ticket please"));
        assert!(wants_ticket("I need a SUPPORT TICKET"));
        assert!(!wants_ticket("what is a ticket?"));
    }
}
