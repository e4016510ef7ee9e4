// SPDX-FileCopyrightText: 2026 Novyra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared by the matcher, the responders, the store and the
//! turn controller.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the kind of adapter behind a trait object.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Storage,
    Responder,
    Email,
}

// --- Enumerations persisted as text ---

/// Lifecycle state of a chat session.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumString,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    #[default]
    Active,
    WaitingAgent,
    AgentAssigned,
    Resolved,
    Closed,
}

impl SessionStatus {
    /// Resolved and closed sessions accept no further lifecycle transitions.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Resolved | Self::Closed)
    }
}

/// Who authored a message.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    User,
    Ai,
    Agent,
    System,
}

/// Knowledge-base grouping.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum KnowledgeCategory {
    Faq,
    Service,
    Campaign,
    General,
    Escalation,
}

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumString,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    #[default]
    Open,
    InProgress,
    Resolved,
    Closed,
}

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumString,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TicketPriority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

/// Category of a staff-facing notification.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Message,
    Session,
    Escalation,
    Ticket,
    System,
}

// --- Sessions ---

/// A single customer conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatSession {
    pub id: String,
    pub user_ip: Option<String>,
    pub user_agent: Option<String>,
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
    pub customer_phone: Option<String>,
    pub status: SessionStatus,
    /// Agent profile currently attached. Only the escalation path writes it.
    pub assigned_agent_id: Option<i64>,
    pub last_intent: Option<String>,
    pub package_selected: Option<String>,
    pub ticket_suggested: bool,
    /// Set once the customer has been told their message will be followed up.
    pub has_left_message: bool,
    pub rating: Option<u8>,
    pub feedback: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    pub resolved_at: Option<String>,
}

impl ChatSession {
    /// Snapshot of the fields the responders are allowed to see.
    pub fn context(&self) -> SessionContext {
        SessionContext {
            last_intent: self.last_intent.clone(),
            package_selected: self.package_selected.clone(),
            ticket_suggested: self.ticket_suggested,
            has_left_message: self.has_left_message,
        }
    }

    /// Name used when addressing the customer, if they gave one.
    pub fn customer_label(&self) -> Option<&str> {
        self.customer_name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
    }
}

/// Partial update applied to a session row. `None` leaves a column untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionPatch {
    pub status: Option<SessionStatus>,
    pub last_intent: Option<String>,
    pub package_selected: Option<String>,
    pub ticket_suggested: Option<bool>,
    pub has_left_message: Option<bool>,
}

impl SessionPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Per-session state that influences intent matching and prompting.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionContext {
    pub last_intent: Option<String>,
    pub package_selected: Option<String>,
    pub ticket_suggested: bool,
    pub has_left_message: bool,
}

/// Client-side metadata supplied alongside an inbound message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientMeta {
    pub user_ip: Option<String>,
    pub user_agent: Option<String>,
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
    pub customer_phone: Option<String>,
}

// --- Messages ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: i64,
    pub session_id: String,
    pub message_type: MessageType,
    pub content: String,
    /// Staff user that wrote an agent message.
    pub sender_id: Option<i64>,
    pub ai_confidence: Option<f32>,
    pub intent_detected: Option<String>,
    pub is_read: bool,
    pub created_at: String,
}

/// A message waiting to be appended to a session transcript.
#[derive(Debug, Clone, PartialEq)]
pub struct NewMessage {
    pub session_id: String,
    pub message_type: MessageType,
    pub content: String,
    pub sender_id: Option<i64>,
    pub ai_confidence: Option<f32>,
    pub intent_detected: Option<String>,
}

impl NewMessage {
    pub fn user(session_id: &str, content: impl Into<String>) -> Self {
        Self::plain(session_id, MessageType::User, content)
    }

    pub fn system(session_id: &str, content: impl Into<String>) -> Self {
        Self::plain(session_id, MessageType::System, content)
    }

    pub fn ai(
        session_id: &str,
        content: impl Into<String>,
        confidence: f32,
        intent: Option<String>,
    ) -> Self {
        Self {
            ai_confidence: Some(confidence),
            intent_detected: intent,
            ..Self::plain(session_id, MessageType::Ai, content)
        }
    }

    pub fn agent(session_id: &str, staff_user_id: i64, content: impl Into<String>) -> Self {
        Self {
            sender_id: Some(staff_user_id),
            ..Self::plain(session_id, MessageType::Agent, content)
        }
    }

    fn plain(session_id: &str, message_type: MessageType, content: impl Into<String>) -> Self {
        Self {
            session_id: session_id.to_string(),
            message_type,
            content: content.into(),
            sender_id: None,
            ai_confidence: None,
            intent_detected: None,
        }
    }
}

/// One prior transcript entry handed to an external responder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryTurn {
    pub message_type: MessageType,
    pub content: String,
}

impl From<&ChatMessage> for HistoryTurn {
    fn from(msg: &ChatMessage) -> Self {
        Self {
            message_type: msg.message_type,
            content: msg.content.clone(),
        }
    }
}

// --- Staff and agents ---

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaffUser {
    pub id: i64,
    pub username: String,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub is_staff: bool,
    pub is_active: bool,
}

impl StaffUser {
    /// Full name when set, otherwise the username.
    pub fn display_name(&self) -> &str {
        self.full_name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(&self.username)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStaffUser {
    pub username: String,
    pub full_name: Option<String>,
    pub email: Option<String>,
}

/// Routing profile wrapping a staff user.
///
/// `current_chats` never leaves `0..=max_concurrent_chats`; the store only
/// changes it through conditional updates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentProfile {
    pub id: i64,
    pub staff_user_id: i64,
    pub username: String,
    pub display_name: String,
    pub email: Option<String>,
    pub is_available: bool,
    pub max_concurrent_chats: u32,
    pub current_chats: u32,
    pub total_chats_handled: u32,
    pub average_rating: f32,
}

impl AgentProfile {
    pub fn has_capacity(&self) -> bool {
        self.current_chats < self.max_concurrent_chats
    }
}

// --- Knowledge and learning ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeEntry {
    pub id: i64,
    pub title: String,
    pub category: KnowledgeCategory,
    /// Comma-separated keyword list.
    pub keywords: String,
    pub content: String,
    pub intent: Option<String>,
    pub is_active: bool,
    pub priority: i32,
}

impl KnowledgeEntry {
    /// Lowercased, trimmed, non-empty keywords.
    pub fn keyword_list(&self) -> Vec<String> {
        self.keywords
            .split(',')
            .map(|k| k.trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect()
    }

    /// The intent reported when this entry wins a match.
    pub fn effective_intent(&self) -> String {
        self.intent
            .clone()
            .unwrap_or_else(|| self.category.to_string())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewKnowledgeEntry {
    pub title: String,
    pub category: KnowledgeCategory,
    pub keywords: String,
    pub content: String,
    pub intent: Option<String>,
    pub priority: i32,
}

/// A logged exchange used as feedback for later matching.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearningRecord {
    pub id: i64,
    pub session_id: Option<String>,
    pub user_message: String,
    pub ai_response: String,
    pub intent: Option<String>,
    pub confidence: f32,
    pub was_helpful: Option<bool>,
    pub escalated: bool,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewLearningRecord {
    pub session_id: Option<String>,
    pub user_message: String,
    pub ai_response: String,
    pub intent: Option<String>,
    pub confidence: f32,
    pub escalated: bool,
}

// --- Tickets, pages, notifications ---

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    pub id: i64,
    pub ticket_number: String,
    pub session_id: Option<String>,
    pub title: String,
    pub description: String,
    pub status: TicketStatus,
    pub priority: TicketPriority,
    pub customer_notified: bool,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTicket {
    pub ticket_number: String,
    pub session_id: Option<String>,
    pub title: String,
    pub description: String,
    pub priority: TicketPriority,
}

/// Scraped website content searched when nothing else matches well.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebsitePage {
    pub id: i64,
    pub url: String,
    pub title: String,
    pub content: String,
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: i64,
    pub user_id: i64,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub session_id: Option<String>,
    pub is_read: bool,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNotification {
    pub user_id: i64,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub session_id: Option<String>,
}

/// Outbound email handed to an [`EmailSender`](crate::traits::EmailSender).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub to: Vec<String>,
    pub subject: String,
    pub body: String,
}

/// A subscription package offered to customers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Package {
    pub name: String,
    pub price: String,
    pub features: Vec<String>,
}

// --- External responder ---

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponderRequest {
    pub message: String,
    pub history: Vec<HistoryTurn>,
    pub context: SessionContext,
    pub business_hours: bool,
}

/// A successful external reply. Unavailability is reported as `Err`, never here.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponderReply {
    pub text: String,
    pub confidence: f32,
    pub should_escalate: bool,
    /// The responder could not actually help with the request.
    pub failed: bool,
    pub intent: String,
}

// --- Live updates ---

/// Event pushed to everyone watching a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChatEvent {
    ChatMessage {
        message_id: i64,
        message: String,
        message_type: MessageType,
        sender_name: Option<String>,
    },
    AgentConnected {
        agent_name: String,
        agent_username: String,
        message: String,
    },
    StatusChanged {
        status: SessionStatus,
    },
}
