// SPDX-FileCopyrightText: 2026 Novyra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Text normalization, keyword extraction and phrase matching.

use std::collections::HashSet;

const STOPWORDS: &[&str] = &[
    "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "is",
    "are", "was", "were",
];

/// Lowercase, trim, replace punctuation with spaces and collapse whitespace.
///
/// Word characters are alphanumerics and `_`, so accented letters survive.
pub fn normalize(text: &str) -> String {
    let lowered = text.trim().to_lowercase();
    let replaced: String = lowered
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '_' || c.is_whitespace() {
                c
            } else {
                ' '
            }
        })
        .collect();
    replaced.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Content words of `text`: normalized tokens longer than two characters
/// that are not stopwords.
pub fn extract_keywords(text: &str) -> Vec<String> {
    normalize(text)
        .split(' ')
        .filter(|w| w.chars().count() > 2 && !STOPWORDS.contains(w))
        .map(str::to_string)
        .collect()
}

/// Jaccard similarity of the keyword sets of two texts. Zero when either
/// side has no keywords.
pub fn jaccard(a: &str, b: &str) -> f32 {
    let left: HashSet<String> = extract_keywords(a).into_iter().collect();
    let right: HashSet<String> = extract_keywords(b).into_iter().collect();
    if left.is_empty() || right.is_empty() {
        return 0.0;
    }
    let shared = left.intersection(&right).count();
    let total = left.union(&right).count();
    shared as f32 / total as f32
}

/// Whether `pattern` occurs in already-normalized `text`.
///
/// Single-word patterns must equal a whole token; multi-word patterns match
/// as substrings. The pattern itself is normalized first.
pub fn contains_phrase(text: &str, pattern: &str) -> bool {
    let pattern = normalize(pattern);
    if pattern.is_empty() {
        return false;
    }
    if pattern.contains(' ') {
        text.contains(&pattern)
    } else {
        text.split(' ').any(|token| token == pattern)
    }
}

/// Number of `patterns` present in already-normalized `text`.
pub fn count_hits<S: AsRef<str>>(text: &str, patterns: &[S]) -> usize {
    patterns
        .iter()
        .filter(|p| contains_phrase(text, p.as_ref()))
        .count()
}

pub fn contains_any<S: AsRef<str>>(text: &str, patterns: &[S]) -> bool {
    patterns.iter().any(|p| contains_phrase(text, p.as_ref()))
}

/// Token count of already-normalized text.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn normalize_strips_punctuation() {
        assert_eq!(normalize("  How much does it COST?!  "), "how much does it cost");
        assert_eq!(normalize("e-mail,  me"), "e mail me");
        assert_eq!(normalize("???"), "");
    }

    #[test]
    fn keywords_drop_stopwords_and_short_tokens() {
        assert_eq!(
            extract_keywords("What is the price of an SEO plan?"),
            vec!["what", "price", "seo", "plan"]
        );
        assert!(extract_keywords("is a to of").is_empty());
    }

    #[test]
    fn jaccard_edge_cases() {
        assert_eq!(jaccard("", "pricing plans"), 0.0);
        assert_eq!(jaccard("pricing plans", "pricing plans"), 1.0);
        let sim = jaccard("social media pricing", "pricing for branding");
        assert!((sim - 0.25).abs() < 1e-6);
    }

    #[test]
    fn single_words_match_whole_tokens() {
        let text = normalize("Which plan is best?");
        assert!(!contains_phrase(&text, "hi"));
        assert!(contains_phrase(&text, "plan"));

        let text = normalize("hello there");
        assert!(!contains_phrase(&text, "hell"));
        assert!(contains_phrase(&text, "hello"));
    }

    #[test]
    fn multi_word_patterns_match_substrings() {
        let text = normalize("Good morning, team");
        assert!(contains_phrase(&text, "good morning"));
        assert!(contains_phrase(&text, "Good Morning!"));
        assert!(!contains_phrase(&text, "good evening"));
        assert_eq!(count_hits(&text, &["good morning", "team", "x"]), 2);
    }

    proptest! {
        #[test]
        fn jaccard_is_symmetric(a in "[a-z ]{0,40}", b in "[a-z ]{0,40}") {
            prop_assert_eq!(jaccard(&a, &b), jaccard(&b, &a));
        }

        #[test]
        fn jaccard_is_bounded(a in "\\PC{0,60}", b in "\\PC{0,60}") {
            let sim = jaccard(&a, &b);
            prop_assert!((0.0..=1.0).contains(&sim));
        }
    }
}
