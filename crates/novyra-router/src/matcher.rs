// SPDX-FileCopyrightText: 2026 Novyra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Rule-based intent matching.
//!
//! Precedence, first hit wins: pricing follow-up, learned exchanges, fixed
//! conversational patterns, domain keyword sets, escalation keywords, then a
//! knowledge-base scan with a generic fallback. The matcher never touches
//! storage; callers hand it a [`MatchCorpus`] snapshot.

use std::collections::HashSet;

use novyra_config::model::EngineConfig;
use novyra_core::types::{KnowledgeEntry, LearningRecord, Package, SessionContext};
use tracing::debug;

use crate::catalog;
use crate::text::{contains_any, contains_phrase, count_hits, jaccard, normalize, word_count};

/// Learned exchanges must be at least this similar to be considered.
const LEARNED_SIMILARITY_FLOOR: f32 = 0.6;
/// Weighted confidence a learned exchange needs to be reused.
const LEARNED_CONFIDENCE_FLOOR: f32 = 0.7;
/// Service categories qualify at this keyword coverage.
const SERVICE_COVERAGE_FLOOR: f32 = 0.5;
const FALLBACK_CONFIDENCE: f32 = 0.5;

/// Reply material attached to a match.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchPayload {
    pub content: String,
    pub title: String,
    pub packages: Vec<Package>,
    pub url: Option<String>,
}

impl MatchPayload {
    fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            title: title.into(),
            packages: Vec::new(),
            url: None,
        }
    }

    fn with_packages(mut self) -> Self {
        self.packages = catalog::packages();
        self
    }
}

/// Outcome of [`IntentMatcher::match_intent`].
#[derive(Debug, Clone, PartialEq)]
pub struct IntentMatch {
    pub intent: Option<String>,
    /// Always within `[0, 1]`.
    pub confidence: f32,
    pub payload: Option<MatchPayload>,
}

impl IntentMatch {
    fn hit(intent: impl Into<String>, confidence: f32, payload: MatchPayload) -> Self {
        Self {
            intent: Some(intent.into()),
            confidence,
            payload: Some(payload),
        }
    }

    pub fn intent_or_general(&self) -> &str {
        self.intent.as_deref().unwrap_or("general")
    }
}

/// Read-only view of the learning log and knowledge base for one match.
#[derive(Debug, Clone, Default)]
pub struct MatchCorpus {
    /// Helpful, non-escalated exchanges, most confident first.
    pub learned: Vec<LearningRecord>,
    /// Active entries, highest priority first.
    pub knowledge: Vec<KnowledgeEntry>,
    /// Intents that have previously been marked helpful.
    pub succeeded_intents: HashSet<String>,
}

/// Keyword and heuristic intent matcher.
#[derive(Debug, Clone)]
pub struct IntentMatcher {
    confidence_threshold: f32,
    escalation_keywords: Vec<String>,
}

impl IntentMatcher {
    pub fn new(confidence_threshold: f32, escalation_keywords: Vec<String>) -> Self {
        Self {
            confidence_threshold,
            escalation_keywords,
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(
            config.confidence_threshold,
            config.escalation_keywords.clone(),
        )
    }

    pub fn confidence_threshold(&self) -> f32 {
        self.confidence_threshold
    }

    /// Whether the message contains one of the configured escalation keywords.
    pub fn has_escalation_keyword(&self, message: &str) -> bool {
        contains_any(&normalize(message), &self.escalation_keywords)
    }

    /// Classify a customer message.
    pub fn match_intent(
        &self,
        message: &str,
        context: &SessionContext,
        corpus: &MatchCorpus,
    ) -> IntentMatch {
        let text = normalize(message);

        if context.last_intent.as_deref() == Some("pricing")
            && contains_any(&text, catalog::PACKAGE_CHOICE_PATTERNS)
        {
            return IntentMatch::hit(
                "package_selection",
                0.95,
                MatchPayload::new("Package Selection", catalog::PACKAGE_SELECTION_REPLY)
                    .with_packages(),
            );
        }

        if let Some(found) = best_learned(&text, &corpus.learned) {
            return found;
        }

        if let Some(found) = conversational(&text) {
            return found;
        }

        if let Some(found) = domain_keywords(&text) {
            return found;
        }

        if contains_any(&text, &self.escalation_keywords) {
            return IntentMatch {
                intent: Some("escalation".into()),
                confidence: 0.9,
                payload: None,
            };
        }

        if let Some((entry, confidence)) = best_knowledge(&text, corpus)
            && confidence >= self.confidence_threshold
        {
            debug!(entry_id = entry.id, confidence, "knowledge base match");
            let mut payload = MatchPayload::new(entry.title.clone(), entry.content.clone());
            if entry.effective_intent() == "pricing" {
                payload = payload.with_packages();
            }
            return IntentMatch::hit(entry.effective_intent(), confidence, payload);
        }

        IntentMatch::hit(
            "general",
            FALLBACK_CONFIDENCE,
            MatchPayload::new("General Response", catalog::GENERAL_REPLY),
        )
    }
}

fn best_learned(text: &str, learned: &[LearningRecord]) -> Option<IntentMatch> {
    let mut best: Option<(&LearningRecord, f32)> = None;
    for record in learned {
        let similarity = jaccard(text, &normalize(&record.user_message));
        let beats = best.is_none_or(|(_, s)| similarity > s);
        if similarity > LEARNED_SIMILARITY_FLOOR && beats {
            best = Some((record, similarity));
        }
    }

    let (record, similarity) = best?;
    let confidence = (record.confidence * similarity).clamp(0.0, 1.0);
    if confidence <= LEARNED_CONFIDENCE_FLOOR {
        return None;
    }
    debug!(learning_id = record.id, similarity, confidence, "learned response reused");
    Some(IntentMatch {
        intent: record.intent.clone(),
        confidence,
        payload: Some(MatchPayload::new("Learned Response", record.ai_response.clone())),
    })
}

fn conversational(text: &str) -> Option<IntentMatch> {
    if contains_any(text, catalog::GREETING_PATTERNS) && word_count(text) < 5 {
        return Some(IntentMatch::hit(
            "greeting",
            0.95,
            MatchPayload::new("Greeting", catalog::GREETING_REPLY),
        ));
    }
    if contains_any(text, catalog::APPRECIATION_PATTERNS) {
        return Some(IntentMatch::hit(
            "appreciation",
            0.9,
            MatchPayload::new("Appreciation", catalog::APPRECIATION_REPLY),
        ));
    }
    if contains_any(text, catalog::GOODBYE_PATTERNS) {
        return Some(IntentMatch::hit(
            "goodbye",
            0.95,
            MatchPayload::new("Goodbye", catalog::GOODBYE_REPLY),
        ));
    }
    None
}

fn domain_keywords(text: &str) -> Option<IntentMatch> {
    if contains_any(text, catalog::PRICING_KEYWORDS) {
        return Some(IntentMatch::hit(
            "pricing",
            0.9,
            MatchPayload::new("Pricing Information", catalog::PRICING_CONTENT).with_packages(),
        ));
    }
    if contains_any(text, catalog::HOURS_KEYWORDS) {
        return Some(IntentMatch::hit(
            "business_hours",
            0.9,
            MatchPayload::new("Business Hours", catalog::HOURS_CONTENT),
        ));
    }
    for service in catalog::SERVICES {
        let hits = count_hits(text, service.keywords);
        if hits == 0 {
            continue;
        }
        let coverage = (hits as f32 / service.keywords.len().max(1) as f32).min(1.0);
        if coverage >= SERVICE_COVERAGE_FLOOR {
            return Some(IntentMatch::hit(
                service.intent(),
                coverage,
                MatchPayload::new(service.title(), service.content),
            ));
        }
    }
    None
}

/// Highest-confidence knowledge entry. Entries arrive in priority order and
/// only a strictly better score replaces the current best.
fn best_knowledge<'a>(text: &str, corpus: &'a MatchCorpus) -> Option<(&'a KnowledgeEntry, f32)> {
    let mut best: Option<(&KnowledgeEntry, f32)> = None;
    for entry in &corpus.knowledge {
        let keywords = entry.keyword_list();
        let hits = count_hits(text, &keywords);
        if hits == 0 {
            continue;
        }

        let mut confidence = (hits as f32 / keywords.len().max(1) as f32).min(1.0);
        if let Some(intent) = &entry.intent
            && contains_phrase(text, &intent.to_lowercase())
        {
            confidence = (confidence + 0.2).min(1.0);
        }
        confidence = confidence.max(jaccard(text, &entry.content.to_lowercase()) * 0.8);
        if corpus.succeeded_intents.contains(&entry.effective_intent()) {
            confidence = (confidence + 0.1).min(1.0);
        }

        if best.is_none_or(|(_, c)| confidence > c) {
            best = Some((entry, confidence));
        }
    }
    best
}
