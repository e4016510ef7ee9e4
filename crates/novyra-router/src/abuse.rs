// SPDX-FileCopyrightText: 2026 Novyra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Abusive-language detection.
//!
//! Patterns run against normalized text, so punctuation and case are gone.

use std::sync::LazyLock;

use regex::Regex;

use crate::text::normalize;

static ABUSE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        Regex::new(r"\b(fuck|f\*\*k|f\*\*\*)\w*\b").unwrap(),
        Regex::new(r"\b(shut\s*up|shut\s*your|stupid|idiot|dumb|moron)\b").unwrap(),
        // "hell" only as a whole word; "hello" must stay clean.
        Regex::new(r"\b(asshole\w*|bastard\w*|bitch\w*|damn\w*|hell)\b").unwrap(),
        Regex::new(r"\b(you\s*suck|you\s*are\s*stupid|you\s*are\s*dumb)\b").unwrap(),
    ]
});

/// De-escalating reply sent instead of a normal answer.
pub const ABUSE_REPLY: &str = "I understand you might be frustrated, and I'm here to help in a respectful way. Could you please rephrase your question so I can assist you better? I want to make sure I give you the best possible support.";

/// Returns true when the message contains abusive language.
pub fn is_abusive(message: &str) -> bool {
    let normalized = normalize(message);
    ABUSE_PATTERNS.iter().any(|p| p.is_match(&normalized))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_insults() {
        assert!(is_abusive("you are so stupid"));
        assert!(is_abusive("Shut up!"));
        assert!(is_abusive("what the hell"));
        assert!(is_abusive("DAMNIT"));
    }

    #[test]
    fn clean_messages_pass() {
        assert!(!is_abusive("hello"));
        assert!(!is_abusive("Hello there, shell scripting help?"));
        assert!(!is_abusive("how much does it cost?"));
        assert!(!is_abusive(""));
    }
}
