// SPDX-FileCopyrightText: 2026 Novyra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Staff notifications and outbound emails.

use novyra_core::types::{
    ChatSession, EmailMessage, NewNotification, NotificationKind, Ticket,
};

/// Longest message excerpt copied into a notification.
const EXCERPT_CHARS: usize = 100;

fn excerpt(text: &str) -> String {
    text.chars().take(EXCERPT_CHARS).collect()
}

fn short_id(session_id: &str) -> &str {
    session_id.get(..8).unwrap_or(session_id)
}

pub fn agent_assigned(staff_user_id: i64, session: &ChatSession) -> NewNotification {
    NewNotification {
        user_id: staff_user_id,
        kind: NotificationKind::Escalation,
        title: "🔔 New Customer Session".into(),
        message: format!(
            "Customer {} needs assistance. Session: {}",
            session.customer_label().unwrap_or("Guest"),
            short_id(&session.id)
        ),
        session_id: Some(session.id.clone()),
    }
}

/// Tells the assigned agent the customer wrote again.
pub fn message_for_agent(staff_user_id: i64, session_id: &str, message: &str) -> NewNotification {
    NewNotification {
        user_id: staff_user_id,
        kind: NotificationKind::Message,
        title: "New message from customer".into(),
        message: excerpt(message),
        session_id: Some(session_id.to_string()),
    }
}

/// Tells an unassigned staff member about an incoming message.
pub fn message_for_staff(staff_user_id: i64, session: &ChatSession, message: &str) -> NewNotification {
    NewNotification {
        user_id: staff_user_id,
        kind: NotificationKind::Message,
        title: format!(
            "New message from {}",
            session.customer_label().unwrap_or("Customer")
        ),
        message: excerpt(message),
        session_id: Some(session.id.clone()),
    }
}

pub fn ticket_created(staff_user_id: i64, ticket: &Ticket) -> NewNotification {
    NewNotification {
        user_id: staff_user_id,
        kind: NotificationKind::Ticket,
        title: format!("New Ticket: {}", ticket.ticket_number),
        message: format!("{} - {}...", ticket.title, excerpt(&ticket.description)),
        session_id: ticket.session_id.clone(),
    }
}

/// Alert to staff about a customer writing outside business hours.
pub fn after_hours_email(
    recipients: Vec<String>,
    session: &ChatSession,
    message: &str,
    hours_summary: &str,
    assistant_name: &str,
) -> EmailMessage {
    let body = format!(
        "Hello,

You have received a new customer message outside business hours.

Session ID: {session_id}
Customer Name: {name}
Customer Email: {email}
Customer Phone: {phone}

Message:
{message}

Business Hours: {hours_summary}

Please respond to this customer during business hours.

Best regards,
{assistant_name}
",
        session_id = session.id,
        name = session.customer_label().unwrap_or("Customer"),
        email = session.customer_email.as_deref().unwrap_or("Not provided"),
        phone = session.customer_phone.as_deref().unwrap_or("Not provided"),
    );

    EmailMessage {
        to: recipients,
        subject: format!(
            "After-Hours Customer Message - Session {}",
            short_id(&session.id)
        ),
        body,
    }
}

/// Confirmation to the customer. `None` when no address is known.
pub fn ticket_confirmation_email(
    ticket: &Ticket,
    session: &ChatSession,
    hours_summary: &str,
    business_name: &str,
) -> Option<EmailMessage> {
    let to = session
        .customer_email
        .as_deref()
        .map(str::trim)
        .filter(|e| !e.is_empty())?;

    let body = format!(
        "Hello {name},

Thank you for contacting {business_name}. We have created a support ticket for your inquiry.

Ticket Number: {number}
Title: {title}
Priority: {priority}
Status: {status}

Description:
{description}

Our team will review your ticket and respond as soon as possible. You will receive an email notification once your ticket is updated.

If you have any questions or need to provide additional information, please reply to this email or contact us during business hours:
{hours_summary}

Best regards,
{business_name} Support Team
",
        name = session.customer_label().unwrap_or("Customer"),
        number = ticket.ticket_number,
        title = ticket.title,
        priority = ticket.priority.to_string().to_uppercase(),
        status = ticket.status.to_string().to_uppercase(),
        description = ticket.description,
    );

    Some(EmailMessage {
        to: vec![to.to_string()],
        subject: format!("Support Ticket Created - {}", ticket.ticket_number),
        body,
    })
}
