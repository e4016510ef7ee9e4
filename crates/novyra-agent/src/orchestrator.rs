// SPDX-FileCopyrightText: 2026 Novyra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Produces the automated reply for one customer message.
//!
//! Abusive input short-circuits. Otherwise the external responder is tried
//! first (when configured) and any failure of it falls back to the rule-based
//! matcher, then to the website search.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use novyra_core::error::NovyraError;
use novyra_core::traits::{ChatStore, ExternalResponder};
use novyra_core::types::{HistoryTurn, Package, ResponderReply, ResponderRequest, SessionContext};
use novyra_router::{
    explicit_agent_request, is_abusive, search_pages, IntentMatcher, MatchCorpus, ABUSE_REPLY,
};
use tracing::{debug, warn};

pub const ESCALATION_REPLY: &str = "I understand you'd like to speak with an agent. Let me connect you to one of our team members who can provide you with more clarity and assistance.";

pub const LOW_CONFIDENCE_REPLY: &str = "I'm sorry, I can't answer that question with complete confidence. Let me connect you to an agent to get more clarity and ensure you receive the best possible assistance.";

const NO_MATCH_REPLY: &str = "Thank you for your question! I'd be happy to help you with that. Could you provide a bit more detail so I can give you the most accurate and helpful response?";

const CLOSING_LINE: &str =
    "\n\nFeel free to ask if you need any clarification or have additional questions. I'm here to help!";

/// A reply already containing one of these needs no closing line.
const CLOSING_MARKERS: &[&str] = &["feel free", "happy to help", "glad to", "pleasure", "contact us"];

const ABUSE_CONFIDENCE: f32 = 0.5;

/// Where an [`OrchestratedReply`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplySource {
    Abuse,
    External,
    RuleBased,
    Website,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrchestratedReply {
    pub text: String,
    pub confidence: f32,
    pub intent: String,
    pub escalation_needed: bool,
    /// The external responder answered but admitted it could not help.
    pub failed: bool,
    pub source: ReplySource,
    pub packages: Vec<Package>,
}

pub struct Orchestrator {
    store: Arc<dyn ChatStore>,
    responder: Option<Arc<dyn ExternalResponder>>,
    matcher: IntentMatcher,
    learning_sample_size: usize,
    history_turns: usize,
    timeout: Duration,
}

impl Orchestrator {
    pub fn new(store: Arc<dyn ChatStore>, matcher: IntentMatcher) -> Self {
        Self {
            store,
            responder: None,
            matcher,
            learning_sample_size: 50,
            history_turns: 10,
            timeout: Duration::from_secs(30),
        }
    }

    /// Tries `responder` before the rule-based matcher, giving up after `timeout`.
    pub fn with_responder(
        mut self,
        responder: Arc<dyn ExternalResponder>,
        history_turns: usize,
        timeout: Duration,
    ) -> Self {
        self.responder = Some(responder);
        self.history_turns = history_turns;
        self.timeout = timeout;
        self
    }

    pub fn with_learning_sample_size(mut self, size: usize) -> Self {
        self.learning_sample_size = size;
        self
    }

    pub fn matcher(&self) -> &IntentMatcher {
        &self.matcher
    }

    pub async fn generate(
        &self,
        message: &str,
        session_id: &str,
        business_hours: bool,
        context: &SessionContext,
    ) -> Result<OrchestratedReply, NovyraError> {
        if is_abusive(message) {
            debug!(session_id, "abusive message, replying with de-escalation");
            return Ok(OrchestratedReply {
                text: ABUSE_REPLY.to_string(),
                confidence: ABUSE_CONFIDENCE,
                intent: "abusive_language".into(),
                escalation_needed: false,
                failed: false,
                source: ReplySource::Abuse,
                packages: Vec::new(),
            });
        }

        if let Some(responder) = &self.responder {
            match self
                .ask_external(responder.as_ref(), message, session_id, business_hours, context)
                .await
            {
                Ok(reply) if !reply.text.trim().is_empty() => {
                    debug!(
                        session_id,
                        intent = %reply.intent,
                        confidence = reply.confidence,
                        escalate = reply.should_escalate,
                        failed = reply.failed,
                        "external reply"
                    );
                    return Ok(OrchestratedReply {
                        escalation_needed: reply.should_escalate
                            || explicit_agent_request(message),
                        text: reply.text,
                        confidence: reply.confidence,
                        intent: reply.intent,
                        failed: reply.failed,
                        source: ReplySource::External,
                        packages: Vec::new(),
                    });
                }
                Ok(_) => {
                    warn!(session_id, "external responder returned empty text, using rule-based reply");
                }
                Err(e) => {
                    warn!(session_id, error = %e, "external responder unavailable, using rule-based reply");
                }
            }
        }

        self.rule_based(message, context).await
    }

    async fn ask_external(
        &self,
        responder: &dyn ExternalResponder,
        message: &str,
        session_id: &str,
        business_hours: bool,
        context: &SessionContext,
    ) -> Result<ResponderReply, NovyraError> {
        let mut history: Vec<HistoryTurn> = self
            .store
            .recent_messages(session_id, self.history_turns + 1)
            .await?
            .iter()
            .map(HistoryTurn::from)
            .collect();

        // The inbound message is already persisted; it goes up once, as the request itself.
        if history
            .last()
            .is_some_and(|turn| turn.content.trim() == message.trim())
        {
            history.pop();
        }
        if history.len() > self.history_turns {
            history.drain(..history.len() - self.history_turns);
        }

        let request = ResponderRequest {
            message: message.to_string(),
            history,
            context: context.clone(),
            business_hours,
        };

        tokio::time::timeout(self.timeout, responder.respond(&request))
            .await
            .map_err(|_| NovyraError::Timeout {
                duration: self.timeout,
            })?
    }

    async fn rule_based(
        &self,
        message: &str,
        context: &SessionContext,
    ) -> Result<OrchestratedReply, NovyraError> {
        let corpus = self.load_corpus().await?;
        let threshold = self.matcher.confidence_threshold();

        let matched = self.matcher.match_intent(message, context, &corpus);
        let mut intent = matched.intent_or_general().to_string();
        let mut confidence = matched.confidence;
        let mut payload = matched.payload;
        let mut source = ReplySource::RuleBased;

        if payload.is_none() || confidence < threshold {
            let pages = self.store.active_pages().await?;
            if let Some(hit) = search_pages(message, &pages)
                && hit.confidence > confidence
            {
                debug!(confidence = hit.confidence, "website content beats matcher");
                intent = "website_content".into();
                confidence = hit.confidence;
                payload = Some(hit.payload);
                source = ReplySource::Website;
            }
        }

        let keyword_hit = self.matcher.has_escalation_keyword(message);
        let explicit_escalation = intent == "escalation" || keyword_hit;
        let escalation_needed =
            confidence < threshold || explicit_escalation || explicit_agent_request(message);

        let (text, packages) = if explicit_escalation {
            (ESCALATION_REPLY.to_string(), Vec::new())
        } else if confidence < threshold {
            (LOW_CONFIDENCE_REPLY.to_string(), Vec::new())
        } else if let Some(payload) = payload {
            (with_closing_line(payload.content), payload.packages)
        } else {
            (NO_MATCH_REPLY.to_string(), Vec::new())
        };

        debug!(%intent, confidence, escalation_needed, ?source, "rule-based reply");

        Ok(OrchestratedReply {
            text,
            confidence,
            intent,
            escalation_needed,
            failed: false,
            source,
            packages,
        })
    }

    async fn load_corpus(&self) -> Result<MatchCorpus, NovyraError> {
        let learned = self.store.helpful_learning(self.learning_sample_size).await?;
        let knowledge = self.store.active_knowledge().await?;
        let succeeded_intents: HashSet<String> =
            self.store.helpful_intents().await?.into_iter().collect();
        Ok(MatchCorpus {
            learned,
            knowledge,
            succeeded_intents,
        })
    }
}

fn with_closing_line(mut content: String) -> String {
    if content.is_empty() {
        return content;
    }
    let lower = content.to_lowercase();
    if !CLOSING_MARKERS.iter().any(|m| lower.contains(m)) {
        content.push_str(CLOSING_LINE);
    }
    content
}

#[cfg(test)]
mod tests {
    use super::*;
    use novyra_config::model::StorageConfig;
    use novyra_core::types::ClientMeta;
    use novyra_storage::SqliteStore;
    use novyra_test_utils::MockResponder;
    use tracing_test::traced_test;

    struct Fixture {
        store: Arc<SqliteStore>,
        _dir: tempfile::TempDir,
    }

    async fn fixture() -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteStore::open(StorageConfig {
            database_path: dir.path().join("test.db").to_string_lossy().to_string(),
            wal_mode: true,
        })
        .await
        .unwrap();
        store
            .get_or_create_session("s1", &ClientMeta::default())
            .await
            .unwrap();
        Fixture {
            store: Arc::new(store),
            _dir: dir,
        }
    }

    fn matcher() -> IntentMatcher {
        IntentMatcher::new(
            0.7,
            ["help", "agent", "human", "support", "escalate"]
                .map(String::from)
                .to_vec(),
        )
    }

    fn orchestrator(f: &Fixture, responder: Option<Arc<MockResponder>>) -> Orchestrator {
        let base = Orchestrator::new(f.store.clone(), matcher());
        match responder {
            Some(r) => base.with_responder(r, 10, Duration::from_secs(5)),
            None => base,
        }
    }

    #[tokio::test]
    async fn abuse_short_circuits_before_responder() {
        let f = fixture().await;
        let responder = Arc::new(MockResponder::new());
        let reply = orchestrator(&f, Some(responder.clone()))
            .generate("you idiot", "s1", true, &SessionContext::default())
            .await
            .unwrap();

        assert_eq!(reply.source, ReplySource::Abuse);
        assert_eq!(reply.intent, "abusive_language");
        assert!(responder.requests().await.is_empty());
    }

    #[tokio::test]
    async fn responder_sees_full_history_window() {
        let f = fixture().await;
        for i in 0..14 {
            f.store
                .append_message(&novyra_core::types::NewMessage::user("s1", format!("m{i}")))
                .await
                .unwrap();
        }
        f.store
            .append_message(&novyra_core::types::NewMessage::user("s1", "do you print flyers?"))
            .await
            .unwrap();

        let responder = Arc::new(MockResponder::new());
        orchestrator(&f, Some(responder.clone()))
            .generate("do you print flyers?", "s1", true, &SessionContext::default())
            .await
            .unwrap();

        let requests = responder.requests().await;
        let history: Vec<_> = requests[0].history.iter().map(|t| t.content.as_str()).collect();
        assert_eq!(history.len(), 10);
        assert_eq!(history.first(), Some(&"m4"));
        assert_eq!(history.last(), Some(&"m13"));
    }

    #[tokio::test]
    async fn explicit_request_overrides_external_opinion() {
        let f = fixture().await;
        let responder = Arc::new(MockResponder::new());
        responder.push_reply(MockResponder::answer("Sure, what can I do?")).await;

        let reply = orchestrator(&f, Some(responder))
            .generate("I want to speak with an agent", "s1", true, &SessionContext::default())
            .await
            .unwrap();

        assert_eq!(reply.source, ReplySource::External);
        assert!(reply.escalation_needed);
        assert!(!reply.failed);
    }

    #[tokio::test]
    #[traced_test]
    async fn responder_failure_is_logged_and_rules_answer() {
        let f = fixture().await;
        let responder = Arc::new(MockResponder::new());
        responder.push_failure("connection refused").await;

        let reply = orchestrator(&f, Some(responder))
            .generate("how much does it cost?", "s1", true, &SessionContext::default())
            .await
            .unwrap();

        assert_eq!(reply.source, ReplySource::RuleBased);
        assert_eq!(reply.intent, "pricing");
        assert_eq!(reply.packages.len(), 3);
        assert!(logs_contain("external responder unavailable"));
    }

    #[tokio::test]
    async fn empty_external_text_falls_through() {
        let f = fixture().await;
        let responder = Arc::new(MockResponder::new());
        responder.push_reply(MockResponder::answer("   ")).await;

        let reply = orchestrator(&f, Some(responder))
            .generate("hello", "s1", true, &SessionContext::default())
            .await
            .unwrap();
        assert_eq!(reply.intent, "greeting");
    }

    #[tokio::test]
    async fn keyword_escalation_uses_escalation_wording() {
        let f = fixture().await;
        let reply = orchestrator(&f, None)
            .generate("I need support with my account", "s1", true, &SessionContext::default())
            .await
            .unwrap();

        assert!(reply.escalation_needed);
        assert_eq!(reply.text, ESCALATION_REPLY);
    }

    #[tokio::test]
    async fn low_confidence_asks_for_agent() {
        let f = fixture().await;
        let reply = orchestrator(&f, None)
            .generate("quantum flux capacitor warranty", "s1", true, &SessionContext::default())
            .await
            .unwrap();

        assert_eq!(reply.intent, "general");
        assert!(reply.escalation_needed);
        assert_eq!(reply.text, LOW_CONFIDENCE_REPLY);
    }

    #[tokio::test]
    async fn website_page_beats_weak_match() {
        let f = fixture().await;
        f.store
            .upsert_page(
                "https://novyra.local/drone",
                "Aerial shoots",
                "Drone footage for weddings",
            )
            .await
            .unwrap();

        let reply = orchestrator(&f, None)
            .generate("drone footage weddings", "s1", true, &SessionContext::default())
            .await
            .unwrap();

        assert_eq!(reply.source, ReplySource::Website);
        assert_eq!(reply.intent, "website_content");
        assert!(!reply.escalation_needed);
        assert!(reply.text.starts_with("Drone footage for weddings"));
    }

    #[test]
    fn closing_line_is_added_once() {
        let text = with_closing_line("We design logos.".into());
        assert!(text.ends_with("I'm here to help!"));

        let polite = with_closing_line("Please contact us any time.".into());
        assert_eq!(polite, "Please contact us any time.");

        assert_eq!(with_closing_line(String::new()), "");
    }
}
