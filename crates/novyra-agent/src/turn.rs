// SPDX-FileCopyrightText: 2026 Novyra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! One customer message in, one engine reply out.
//!
//! [`TurnController`] gathers the facts of a turn (session state, business
//! hours, the orchestrated reply, an agent assignment attempt) and hands them
//! to [`decide_turn`], which is pure. The controller then applies the
//! resulting [`TurnPlan`] to the store, the notification sink and the bus.
//!
//! Turns of the same session run one at a time under [`SessionLocks`].

use std::sync::Arc;

use novyra_config::NovyraConfig;
use novyra_core::error::NovyraError;
use novyra_core::types::{
    ChatEvent, ChatSession, ClientMeta, MessageType, NewLearningRecord, NewMessage, Package,
    SessionPatch, SessionStatus, TicketPriority,
};
use novyra_router::{explicit_agent_request, wants_ticket};
use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::escalation::{AssignOutcome, EscalationManager};
use crate::hours::BusinessSchedule;
use crate::locks::SessionLocks;
use crate::notices;
use crate::orchestrator::{OrchestratedReply, ReplySource};
use crate::tickets::{self, TicketDesk};
use crate::EngineDeps;

const AGENT_CHAT_INTENT: &str = "agent_chat";
const TICKET_TITLE: &str = "Support Request";
const FALLBACK_CLOSED_HEADLINE: &str =
    "⏰ We're currently closed. Our business hours are Monday to Saturday, 9:00 AM to 6:00 PM (WAT).";

/// Shortcut buttons offered alongside a reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QuickAction {
    Pricing,
    Faqs,
    Contact,
}

/// The agent attached to the session during this turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectedAgent {
    pub name: String,
    pub username: String,
}

/// Everything [`decide_turn`] needs to know about a turn.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnFacts {
    /// `None` when an agent was already attached and the orchestrator was skipped.
    pub reply: Option<OrchestratedReply>,
    pub explicit_request: bool,
    pub escalate_on_rule_based_low_confidence: bool,
    /// An agent was attached before this message arrived.
    pub had_agent: bool,
    pub new_agent: Option<ConnectedAgent>,
    pub business_hours: bool,
    pub closed_headline: Option<String>,
    pub closed_message: Option<String>,
    pub has_left_message: bool,
    pub ticket_suggested: bool,
    pub wants_ticket: bool,
    pub customer_name: Option<String>,
}

/// What the controller must do to finish a turn.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnPlan {
    pub text: String,
    pub confidence: f32,
    pub intent: String,
    /// Store `text` as an `ai` message.
    pub persist_ai: bool,
    pub status: Option<SessionStatus>,
    pub set_left_message: bool,
    /// Open a ticket and replace `text` with its confirmation.
    pub open_ticket: bool,
    pub quick_actions: Vec<QuickAction>,
    pub packages: Vec<Package>,
    pub escalation_triggered: bool,
    pub agent_connected: bool,
    pub show_connection_message: bool,
    pub business_hours_message: Option<String>,
}

/// Whether this turn should try to bring in a human.
///
/// An explicit request always counts. Otherwise only an external reply that
/// both failed and asked to escalate does, unless rule-based low confidence
/// is configured to count too.
pub fn should_escalate(
    explicit_request: bool,
    reply: Option<&OrchestratedReply>,
    escalate_on_rule_based_low_confidence: bool,
) -> bool {
    explicit_request
        || reply.is_some_and(|r| {
            (r.failed && r.escalation_needed)
                || (escalate_on_rule_based_low_confidence
                    && r.escalation_needed
                    && matches!(r.source, ReplySource::RuleBased | ReplySource::Website))
        })
}

pub fn decide_turn(facts: TurnFacts) -> TurnPlan {
    let escalate = should_escalate(
        facts.explicit_request,
        facts.reply.as_ref(),
        facts.escalate_on_rule_based_low_confidence,
    );

    let mut plan = match &facts.reply {
        Some(reply) => TurnPlan {
            text: reply.text.clone(),
            confidence: reply.confidence,
            intent: reply.intent.clone(),
            persist_ai: false,
            status: None,
            set_left_message: false,
            open_ticket: false,
            quick_actions: Vec::new(),
            packages: if matches!(reply.intent.as_str(), "pricing" | "package_selection") {
                reply.packages.clone()
            } else {
                Vec::new()
            },
            escalation_triggered: false,
            agent_connected: false,
            show_connection_message: false,
            business_hours_message: None,
        },
        None => TurnPlan {
            text: String::new(),
            confidence: 0.0,
            intent: AGENT_CHAT_INTENT.into(),
            persist_ai: false,
            status: None,
            set_left_message: false,
            open_ticket: false,
            quick_actions: Vec::new(),
            packages: Vec::new(),
            escalation_triggered: false,
            agent_connected: true,
            show_connection_message: false,
            business_hours_message: None,
        },
    };

    if let Some(agent) = &facts.new_agent {
        plan.text = if facts.explicit_request {
            format!(
                "✅ Great! I've connected you with {}. They'll be with you shortly.\n\n💬 You can start chatting now - your agent will see your messages!",
                agent.name
            )
        } else {
            format!(
                "I've connected you with {} who can better assist you. You can start chatting now!",
                agent.name
            )
        };
        plan.escalation_triggered = true;
        plan.agent_connected = true;
        plan.show_connection_message = true;
    } else if escalate && !facts.had_agent && facts.explicit_request {
        if facts.business_hours {
            plan.status = Some(SessionStatus::WaitingAgent);
            if facts.has_left_message {
                plan.text = format!(
                    "Thank you, {}! I've received your request to speak with an agent. All agents are currently busy, but we'll connect you as soon as one becomes available.\n\nWhile you wait:\n• 💰 Pricing Information\n• ❓ Frequently Asked Questions",
                    facts.customer_name.as_deref().unwrap_or("there")
                );
                plan.quick_actions = vec![QuickAction::Pricing, QuickAction::Faqs, QuickAction::Contact];
            } else {
                plan.set_left_message = true;
                plan.text = "Thank you for reaching out! I understand you'd like to speak with an agent. All our agents are currently busy, but your chat is in queue and an agent will be with you shortly. Please leave your message below.".into();
                plan.quick_actions = vec![QuickAction::Pricing, QuickAction::Faqs];
            }
        } else {
            let headline = facts
                .closed_headline
                .as_deref()
                .unwrap_or(FALLBACK_CLOSED_HEADLINE);
            if facts.has_left_message {
                plan.text = format!(
                    "{headline}\n\n✅ I've received your request to speak with an agent. Our agents will reach out to you via email as soon as we're open.\n\nWhile you wait, feel free to explore:\n• 💰 Pricing Information\n• ❓ Frequently Asked Questions"
                );
            } else {
                plan.set_left_message = true;
                plan.text = format!(
                    "{headline}\n\n📧 I've noted your request to speak with an agent. Our agents will reach out to you via email as soon as we're open. Please leave your message and we'll get back to you during business hours!"
                );
            }
            plan.quick_actions = vec![QuickAction::Pricing, QuickAction::Faqs];
        }
    }

    if facts.wants_ticket && !facts.ticket_suggested {
        plan.open_ticket = true;
    }

    if facts.explicit_request {
        plan.business_hours_message = facts.closed_message.clone();
    }

    plan.persist_ai = !facts.had_agent && !plan.text.trim().is_empty();
    plan
}

/// Outcome of one processed message, as shown to the customer's widget.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TurnResult {
    pub session_id: String,
    pub message: String,
    pub message_type: MessageType,
    pub ai_confidence: f32,
    pub intent: String,
    pub status: SessionStatus,
    pub escalation_triggered: bool,
    pub agent_available: bool,
    pub business_hours: bool,
    pub business_hours_message: Option<String>,
    pub assigned_agent: Option<String>,
    pub assigned_agent_name: Option<String>,
    pub quick_actions: Vec<QuickAction>,
    pub packages: Vec<Package>,
    pub ticket_created: bool,
    pub ticket_number: Option<String>,
    pub agent_connected: bool,
    pub show_connection_message: bool,
}

pub struct TurnController {
    deps: EngineDeps,
    orchestrator: crate::orchestrator::Orchestrator,
    escalation: EscalationManager,
    tickets: TicketDesk,
    schedule: BusinessSchedule,
    locks: Arc<SessionLocks>,
    assistant_name: String,
    staff_fallback_address: Option<String>,
    escalate_on_rule_based_low_confidence: bool,
}

impl TurnController {
    pub fn new(
        config: &NovyraConfig,
        deps: EngineDeps,
        locks: Arc<SessionLocks>,
    ) -> Result<Self, NovyraError> {
        let matcher = novyra_router::IntentMatcher::from_config(&config.engine);
        let mut orchestrator = crate::orchestrator::Orchestrator::new(deps.store.clone(), matcher)
            .with_learning_sample_size(config.engine.learning_sample_size);
        if let Some(responder) = &deps.responder {
            orchestrator = orchestrator.with_responder(
                responder.clone(),
                config.responder.history_turns,
                std::time::Duration::from_secs(config.responder.timeout_secs),
            );
        }

        Ok(Self {
            orchestrator,
            escalation: EscalationManager::new(
                deps.store.clone(),
                config.escalation.default_max_concurrent_chats,
            ),
            tickets: TicketDesk::new(
                deps.store.clone(),
                deps.notifier.clone(),
                deps.mailer.clone(),
                config.assistant.business_name.clone(),
            ),
            schedule: BusinessSchedule::from_config(&config.business_hours)?,
            locks,
            assistant_name: config.assistant.name.clone(),
            staff_fallback_address: config.email.staff_fallback_address.clone(),
            escalate_on_rule_based_low_confidence: config
                .engine
                .escalate_on_rule_based_low_confidence,
            deps,
        })
    }

    pub fn schedule(&self) -> &BusinessSchedule {
        &self.schedule
    }

    pub async fn process_turn(
        &self,
        session_id: Option<&str>,
        user_message: &str,
        meta: &ClientMeta,
    ) -> Result<TurnResult, NovyraError> {
        let message = user_message.trim();
        if message.is_empty() {
            return Err(NovyraError::InvalidInput("message cannot be empty".into()));
        }

        let session_id = session_id
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map_or_else(|| Uuid::new_v4().to_string(), str::to_string);

        let _turn = self.locks.lock(&session_id).await;
        let store = &self.deps.store;

        let (session, created) = store.get_or_create_session(&session_id, meta).await?;
        if created {
            info!(session_id = %session_id, "new chat session");
        }
        let previous_agent = session.assigned_agent_id;
        store
            .append_message(&NewMessage::user(&session_id, message))
            .await?;

        let now = self.deps.clock.now();
        let business_hours = self.schedule.is_open(now);
        if !business_hours {
            self.spawn_after_hours_alert(&session, message);
        }

        let reply = match previous_agent {
            Some(agent_id) => {
                debug!(session_id = %session_id, agent_id, "agent attached, skipping automated reply");
                None
            }
            None => Some(
                self.orchestrator
                    .generate(message, &session_id, business_hours, &session.context())
                    .await?,
            ),
        };

        let explicit_request = explicit_agent_request(message);
        let escalate = should_escalate(
            explicit_request,
            reply.as_ref(),
            self.escalate_on_rule_based_low_confidence,
        );

        let mut new_agent = None;
        if escalate && previous_agent.is_none() {
            info!(session_id = %session_id, explicit_request, "escalation requested");
            if self.escalation.agents_available().await? {
                new_agent = self.connect_agent(&session).await?;
            } else {
                warn!(session_id = %session_id, "no agents available for escalation");
            }
        }

        let plan = decide_turn(TurnFacts {
            reply,
            explicit_request,
            escalate_on_rule_based_low_confidence: self.escalate_on_rule_based_low_confidence,
            had_agent: previous_agent.is_some(),
            new_agent: new_agent.clone(),
            business_hours,
            closed_headline: self.schedule.closed_headline(now),
            closed_message: self.schedule.closed_message(now),
            has_left_message: session.has_left_message,
            ticket_suggested: session.ticket_suggested,
            wants_ticket: wants_ticket(message),
            customer_name: session.customer_label().map(str::to_string),
        });

        self.apply(&session, message, plan, new_agent, business_hours, now)
            .await
    }

    /// Tries to attach an agent. A new connection is announced on the bus and
    /// to the agent.
    async fn connect_agent(
        &self,
        session: &ChatSession,
    ) -> Result<Option<ConnectedAgent>, NovyraError> {
        let agent = match self.escalation.assign_agent(session).await? {
            AssignOutcome::Assigned(agent) => agent,
            AssignOutcome::AlreadyAssigned { agent_id } => {
                debug!(session_id = %session.id, agent_id, "session already has an agent");
                return Ok(None);
            }
            AssignOutcome::Queued => {
                warn!(session_id = %session.id, "agent assignment failed despite availability");
                return Ok(None);
            }
        };

        let notice = notices::agent_assigned(agent.staff_user_id, session);
        if let Err(e) = self.deps.notifier.notify(&notice).await {
            warn!(session_id = %session.id, error = %e, "agent assignment notification failed");
        }

        Ok(Some(ConnectedAgent {
            name: agent.display_name,
            username: agent.username,
        }))
    }

    async fn apply(
        &self,
        session: &ChatSession,
        user_message: &str,
        mut plan: TurnPlan,
        new_agent: Option<ConnectedAgent>,
        business_hours: bool,
        now: chrono::DateTime<chrono::Utc>,
    ) -> Result<TurnResult, NovyraError> {
        let store = &self.deps.store;
        let session_id = session.id.as_str();

        if let Some(agent) = &new_agent {
            self.publish(
                session_id,
                ChatEvent::AgentConnected {
                    agent_name: agent.name.clone(),
                    agent_username: agent.username.clone(),
                    message: plan.text.clone(),
                },
            )
            .await;
        }

        let mut patch = SessionPatch {
            status: plan.status,
            last_intent: Some(plan.intent.clone()),
            ..Default::default()
        };
        if plan.set_left_message {
            patch.has_left_message = Some(true);
        }

        let mut ticket_number = None;
        if plan.open_ticket {
            let description = store
                .latest_user_message(session_id)
                .await?
                .map_or_else(|| user_message.to_string(), |m| m.content);
            let ticket = self
                .tickets
                .open(
                    session,
                    TICKET_TITLE,
                    &description,
                    TicketPriority::Medium,
                    &self.schedule.summary(),
                    now,
                )
                .await?;
            plan.text = tickets::confirmation_text(&ticket);
            plan.persist_ai = session.assigned_agent_id.is_none();
            patch.ticket_suggested = Some(true);
            ticket_number = Some(ticket.ticket_number);
        }

        store.update_session(session_id, &patch).await?;
        if let Some(status) = plan.status {
            self.publish(session_id, ChatEvent::StatusChanged { status })
                .await;
        }

        if plan.persist_ai {
            let stored = store
                .append_message(&NewMessage::ai(
                    session_id,
                    plan.text.clone(),
                    plan.confidence,
                    Some(plan.intent.clone()),
                ))
                .await?;
            self.publish(
                session_id,
                ChatEvent::ChatMessage {
                    message_id: stored.id,
                    message: stored.content,
                    message_type: MessageType::Ai,
                    sender_name: None,
                },
            )
            .await;
        }

        store
            .record_learning(&NewLearningRecord {
                session_id: Some(session_id.to_string()),
                user_message: user_message.to_string(),
                ai_response: if plan.persist_ai {
                    plan.text.clone()
                } else {
                    String::new()
                },
                intent: Some(plan.intent.clone()),
                confidence: plan.confidence,
                escalated: plan.escalation_triggered,
            })
            .await?;

        let current = store
            .get_session(session_id)
            .await?
            .ok_or_else(|| NovyraError::session_not_found(session_id))?;
        let agent = match current.assigned_agent_id {
            Some(id) => store.get_agent(id).await?,
            None => None,
        };

        self.notify_other_party(&current, agent.as_ref().map(|a| a.staff_user_id), user_message)
            .await;

        let agent_available = self.escalation.agents_available().await?;

        info!(
            session_id,
            intent = %plan.intent,
            confidence = plan.confidence,
            status = %current.status,
            escalated = plan.escalation_triggered,
            "turn processed"
        );

        Ok(TurnResult {
            session_id: session_id.to_string(),
            message: plan.text,
            message_type: MessageType::Ai,
            ai_confidence: plan.confidence,
            intent: plan.intent,
            status: current.status,
            escalation_triggered: plan.escalation_triggered,
            agent_available,
            business_hours,
            business_hours_message: plan.business_hours_message,
            assigned_agent: agent.as_ref().map(|a| a.username.clone()),
            assigned_agent_name: new_agent
                .map(|a| a.name)
                .or_else(|| agent.as_ref().map(|a| a.display_name.clone())),
            quick_actions: plan.quick_actions,
            packages: plan.packages,
            ticket_created: ticket_number.is_some(),
            ticket_number,
            agent_connected: plan.agent_connected,
            show_connection_message: plan.show_connection_message,
        })
    }

    /// The assigned agent hears about the message, or every active staff
    /// member when nobody is assigned.
    async fn notify_other_party(
        &self,
        session: &ChatSession,
        agent_staff_id: Option<i64>,
        message: &str,
    ) {
        let notices = match agent_staff_id {
            Some(staff_id) => vec![notices::message_for_agent(staff_id, &session.id, message)],
            None => match self.deps.store.list_active_staff().await {
                Ok(staff) => staff
                    .iter()
                    .map(|user| notices::message_for_staff(user.id, session, message))
                    .collect(),
                Err(e) => {
                    warn!(session_id = %session.id, error = %e, "could not list staff for notification");
                    return;
                }
            },
        };

        for notice in notices {
            if let Err(e) = self.deps.notifier.notify(&notice).await {
                warn!(session_id = %session.id, user_id = notice.user_id, error = %e, "message notification failed");
            }
        }
    }

    async fn publish(&self, session_id: &str, event: ChatEvent) {
        if let Err(e) = self.deps.broadcaster.publish(session_id, event).await {
            warn!(session_id, error = %e, "broadcast failed");
        }
    }

    /// Emails staff about an after-hours message without holding up the turn.
    fn spawn_after_hours_alert(&self, session: &ChatSession, message: &str) {
        let store = self.deps.store.clone();
        let mailer = self.deps.mailer.clone();
        let fallback = self.staff_fallback_address.clone();
        let summary = self.schedule.summary();
        let assistant_name = self.assistant_name.clone();
        let session = session.clone();
        let message = message.to_string();

        tokio::spawn(async move {
            let mut recipients: Vec<String> = match store.list_active_staff().await {
                Ok(staff) => staff.into_iter().filter_map(|u| u.email).collect(),
                Err(e) => {
                    warn!(session_id = %session.id, error = %e, "could not list staff for after-hours alert");
                    Vec::new()
                }
            };
            if recipients.is_empty() {
                recipients.extend(fallback);
            }
            if recipients.is_empty() {
                warn!(session_id = %session.id, "no staff email configured for after-hours alert");
                return;
            }

            let email =
                notices::after_hours_email(recipients, &session, &message, &summary, &assistant_name);
            match mailer.send(&email).await {
                Ok(()) => debug!(session_id = %session.id, "after-hours alert sent"),
                Err(e) => warn!(session_id = %session.id, error = %e, "after-hours alert failed"),
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reply(intent: &str, escalation_needed: bool, failed: bool, source: ReplySource) -> OrchestratedReply {
        OrchestratedReply {
            text: format!("about {intent}"),
            confidence: 0.85,
            intent: intent.into(),
            escalation_needed,
            failed,
            source,
            packages: Vec::new(),
        }
    }

    fn facts(reply: Option<OrchestratedReply>) -> TurnFacts {
        TurnFacts {
            reply,
            explicit_request: false,
            escalate_on_rule_based_low_confidence: false,
            had_agent: false,
            new_agent: None,
            business_hours: true,
            closed_headline: None,
            closed_message: None,
            has_left_message: false,
            ticket_suggested: false,
            wants_ticket: false,
            customer_name: None,
        }
    }

    fn ada() -> ConnectedAgent {
        ConnectedAgent {
            name: "Ada Obi".into(),
            username: "ada".into(),
        }
    }

    #[test]
    fn escalation_policy() {
        let soft = reply("general", true, false, ReplySource::External);
        let failed = reply("general", true, true, ReplySource::External);
        let rule = reply("general", true, false, ReplySource::RuleBased);

        assert!(should_escalate(true, None, false));
        assert!(!should_escalate(false, Some(&soft), false));
        assert!(should_escalate(false, Some(&failed), false));
        assert!(!should_escalate(false, Some(&rule), false));
        assert!(should_escalate(false, Some(&rule), true));
        // The switch only concerns rule-based replies.
        assert!(!should_escalate(false, Some(&soft), true));
    }

    #[test]
    fn ordinary_reply_is_persisted() {
        let plan = decide_turn(facts(Some(reply("greeting", false, false, ReplySource::RuleBased))));
        assert_eq!(plan.text, "about greeting");
        assert!(plan.persist_ai);
        assert!(!plan.escalation_triggered);
        assert_eq!(plan.status, None);
    }

    #[test]
    fn attached_agent_suppresses_reply() {
        let mut f = facts(None);
        f.had_agent = true;
        let plan = decide_turn(f);
        assert_eq!(plan.intent, "agent_chat");
        assert!(plan.text.is_empty());
        assert!(!plan.persist_ai);
        assert!(plan.agent_connected);
        assert!(!plan.show_connection_message);
    }

    #[test]
    fn explicit_connection_message() {
        let mut f = facts(Some(reply("escalation", true, false, ReplySource::RuleBased)));
        f.explicit_request = true;
        f.new_agent = Some(ada());
        let plan = decide_turn(f);
        assert!(plan.text.starts_with("✅ Great! I've connected you with Ada Obi."));
        assert!(plan.show_connection_message);
        assert!(plan.escalation_triggered);
        assert!(plan.persist_ai);
    }

    #[test]
    fn failure_connection_message_is_subtle() {
        let mut f = facts(Some(reply("general", true, true, ReplySource::External)));
        f.new_agent = Some(ada());
        let plan = decide_turn(f);
        assert_eq!(
            plan.text,
            "I've connected you with Ada Obi who can better assist you. You can start chatting now!"
        );
    }

    #[test]
    fn queued_latch_long_then_short() {
        let mut f = facts(Some(reply("escalation", true, false, ReplySource::RuleBased)));
        f.explicit_request = true;
        f.customer_name = Some("Tolu".into());

        let first = decide_turn(f.clone());
        assert!(first.set_left_message);
        assert_eq!(first.status, Some(SessionStatus::WaitingAgent));
        assert!(first.text.contains("your chat is in queue"));
        assert_eq!(first.quick_actions, vec![QuickAction::Pricing, QuickAction::Faqs]);

        f.has_left_message = true;
        let second = decide_turn(f);
        assert!(!second.set_left_message);
        assert!(second.text.starts_with("Thank you, Tolu!"));
        assert_eq!(second.quick_actions.len(), 3);
    }

    #[test]
    fn after_hours_latch_long_then_short() {
        let mut f = facts(Some(reply("escalation", true, false, ReplySource::RuleBased)));
        f.explicit_request = true;
        f.business_hours = false;
        f.closed_headline = Some("⏰ We're currently closed.".into());
        f.closed_message = Some("⏰ We're currently closed.\n\n📧 later".into());

        let first = decide_turn(f.clone());
        assert!(first.set_left_message);
        assert_eq!(first.status, None);
        assert!(first.text.contains("I've noted your request"));
        assert_eq!(first.business_hours_message.as_deref(), Some("⏰ We're currently closed.\n\n📧 later"));

        f.has_left_message = true;
        let second = decide_turn(f);
        assert!(!second.set_left_message);
        assert!(second.text.contains("I've received your request"));
    }

    #[test]
    fn failure_without_agent_keeps_reply() {
        let plan = decide_turn(facts(Some(reply("general", true, true, ReplySource::External))));
        assert_eq!(plan.text, "about general");
        assert!(!plan.set_left_message);
        assert_eq!(plan.status, None);
    }

    #[test]
    fn ticket_only_once() {
        let mut f = facts(Some(reply("general", false, false, ReplySource::RuleBased)));
        f.wants_ticket = true;
        assert!(decide_turn(f.clone()).open_ticket);
        f.ticket_suggested = true;
        assert!(!decide_turn(f).open_ticket);
    }

    #[test]
    fn packages_only_for_pricing() {
        let package = Package {
            name: "Basic".into(),
            price: "₦30,000/month".into(),
            features: Vec::new(),
        };
        let mut pricing = reply("pricing", false, false, ReplySource::RuleBased);
        pricing.packages = vec![package.clone()];
        assert_eq!(decide_turn(facts(Some(pricing))).packages, vec![package.clone()]);

        let mut other = reply("branding", false, false, ReplySource::RuleBased);
        other.packages = vec![package];
        assert!(decide_turn(facts(Some(other))).packages.is_empty());
    }

    #[test]
    fn turn_result_wire_shape() {
        let result = TurnResult {
            session_id: "s1".into(),
            message: "queued".into(),
            message_type: MessageType::Ai,
            ai_confidence: 0.5,
            intent: "escalation".into(),
            status: SessionStatus::WaitingAgent,
            escalation_triggered: false,
            agent_available: false,
            business_hours: true,
            business_hours_message: None,
            assigned_agent: None,
            assigned_agent_name: None,
            quick_actions: vec![QuickAction::Pricing, QuickAction::Faqs],
            packages: Vec::new(),
            ticket_created: false,
            ticket_number: None,
            agent_connected: false,
            show_connection_message: false,
        };

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["status"], "waiting_agent");
        assert_eq!(json["message_type"], "ai");
        assert_eq!(json["quick_actions"], serde_json::json!(["pricing", "faqs"]));
        assert!(json["assigned_agent"].is_null());
    }
}
