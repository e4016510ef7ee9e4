// SPDX-FileCopyrightText: 2026 Novyra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Support tickets opened from a chat.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use novyra_core::error::NovyraError;
use novyra_core::traits::{ChatStore, EmailSender, NotificationSink};
use novyra_core::types::{ChatSession, NewTicket, Ticket, TicketPriority};
use rand::Rng;
use tracing::{info, warn};

use crate::notices;

const NUMBER_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const NUMBER_SUFFIX_LEN: usize = 6;

/// `TKT-YYYYMMDD-XXXXXX` with six random uppercase alphanumerics.
pub fn ticket_number(now: DateTime<Utc>) -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..NUMBER_SUFFIX_LEN)
        .map(|_| NUMBER_ALPHABET[rng.gen_range(0..NUMBER_ALPHABET.len())] as char)
        .collect();
    format!("TKT-{}-{suffix}", now.format("%Y%m%d"))
}

/// Reply shown to the customer once their ticket exists.
pub fn confirmation_text(ticket: &Ticket) -> String {
    format!(
        "✅ Perfect! I've created support ticket #{} for you.\n\nOur team will review your ticket and get back to you via email. You'll receive updates on the progress.\n\nIs there anything else I can help you with?",
        ticket.ticket_number
    )
}

pub struct TicketDesk {
    store: Arc<dyn ChatStore>,
    notifier: Arc<dyn NotificationSink>,
    mailer: Arc<dyn EmailSender>,
    business_name: String,
}

impl TicketDesk {
    pub fn new(
        store: Arc<dyn ChatStore>,
        notifier: Arc<dyn NotificationSink>,
        mailer: Arc<dyn EmailSender>,
        business_name: impl Into<String>,
    ) -> Self {
        Self {
            store,
            notifier,
            mailer,
            business_name: business_name.into(),
        }
    }

    /// Stores the ticket, tells every active staff member and emails the
    /// customer when an address is known. Only the insert can fail the call.
    pub async fn open(
        &self,
        session: &ChatSession,
        title: &str,
        description: &str,
        priority: TicketPriority,
        hours_summary: &str,
        now: DateTime<Utc>,
    ) -> Result<Ticket, NovyraError> {
        let mut ticket = self
            .store
            .create_ticket(&NewTicket {
                ticket_number: ticket_number(now),
                session_id: Some(session.id.clone()),
                title: title.to_string(),
                description: description.to_string(),
                priority,
            })
            .await?;
        info!(
            session_id = %session.id,
            ticket_number = %ticket.ticket_number,
            "ticket created"
        );

        match self.store.list_active_staff().await {
            Ok(staff) => {
                for user in staff {
                    if let Err(e) = self
                        .notifier
                        .notify(&notices::ticket_created(user.id, &ticket))
                        .await
                    {
                        warn!(user_id = user.id, error = %e, "ticket notification failed");
                    }
                }
            }
            Err(e) => warn!(error = %e, "could not list staff for ticket notification"),
        }

        let Some(email) =
            notices::ticket_confirmation_email(&ticket, session, hours_summary, &self.business_name)
        else {
            warn!(session_id = %session.id, "no customer email, ticket confirmation not sent");
            return Ok(ticket);
        };

        match self.mailer.send(&email).await {
            Ok(()) => {
                self.store.mark_ticket_notified(ticket.id).await?;
                ticket.customer_notified = true;
            }
            Err(e) => {
                warn!(ticket_number = %ticket.ticket_number, error = %e, "ticket confirmation email failed");
            }
        }

        Ok(ticket)
    }
}
