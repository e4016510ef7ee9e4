// SPDX-FileCopyrightText: 2026 Novyra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Live event fan-out for chat sessions.
//!
//! Each session id is a topic backed by a `tokio::sync::broadcast` channel.
//! The customer widget and the agent console subscribe to the same topic and
//! receive every [`ChatEvent`] wrapped in an [`Envelope`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use novyra_core::error::NovyraError;
use novyra_core::traits::Broadcaster;
use novyra_core::types::ChatEvent;
use serde::Serialize;
use tokio::sync::broadcast;
use tracing::{debug, trace};
use uuid::Uuid;

/// An event as delivered to subscribers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Envelope {
    pub id: Uuid,
    pub session_id: String,
    pub published_at: DateTime<Utc>,
    #[serde(flatten)]
    pub event: ChatEvent,
}

/// Topic-per-session broadcaster.
pub struct SessionBus {
    topics: DashMap<String, broadcast::Sender<Envelope>>,
    capacity: usize,
}

impl SessionBus {
    /// Creates a bus whose topics buffer `capacity` events for slow receivers.
    pub fn new(capacity: usize) -> Self {
        Self {
            topics: DashMap::new(),
            capacity: capacity.max(1),
        }
    }

    /// Subscribes to a session, creating its topic on first use.
    pub fn subscribe(&self, session_id: &str) -> broadcast::Receiver<Envelope> {
        self.topics
            .entry(session_id.to_string())
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .subscribe()
    }

    /// Number of live subscribers on a session topic.
    pub fn subscriber_count(&self, session_id: &str) -> usize {
        self.topics
            .get(session_id)
            .map(|tx| tx.receiver_count())
            .unwrap_or(0)
    }

    /// Number of topics currently held.
    pub fn topic_count(&self) -> usize {
        self.topics.len()
    }

    /// Delivers an event to every subscriber of `session_id`.
    ///
    /// Returns how many receivers got it. Zero is not an error; a topic
    /// whose receivers have all gone away is dropped.
    pub fn send(&self, session_id: &str, event: ChatEvent) -> usize {
        let Some(tx) = self.topics.get(session_id).map(|t| t.clone()) else {
            trace!(session_id, "no subscribers, event dropped");
            return 0;
        };

        let envelope = Envelope {
            id: Uuid::new_v4(),
            session_id: session_id.to_string(),
            published_at: Utc::now(),
            event,
        };

        match tx.send(envelope) {
            Ok(delivered) => {
                debug!(session_id, delivered, "event published");
                delivered
            }
            Err(_) => {
                self.topics
                    .remove_if(session_id, |_, tx| tx.receiver_count() == 0);
                trace!(session_id, "all subscribers gone, topic removed");
                0
            }
        }
    }
}

impl Default for SessionBus {
    fn default() -> Self {
        Self::new(64)
    }
}

#[async_trait]
impl Broadcaster for SessionBus {
    async fn publish(&self, session_id: &str, event: ChatEvent) -> Result<(), NovyraError> {
        self.send(session_id, event);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use novyra_core::types::SessionStatus;

    fn status_event() -> ChatEvent {
        ChatEvent::StatusChanged {
            status: SessionStatus::WaitingAgent,
        }
    }

    #[tokio::test]
    async fn publish_without_subscribers_is_ok() {
        let bus = SessionBus::new(8);
        bus.publish("nobody", status_event()).await.unwrap();
        assert_eq!(bus.topic_count(), 0);
    }

    #[tokio::test]
    async fn every_subscriber_receives_the_event() {
        let bus = SessionBus::new(8);
        let mut widget = bus.subscribe("s1");
        let mut console = bus.subscribe("s1");
        assert_eq!(bus.subscriber_count("s1"), 2);

        bus.publish("s1", status_event()).await.unwrap();

        let a = widget.recv().await.unwrap();
        let b = console.recv().await.unwrap();
        assert_eq!(a.id, b.id);
        assert_eq!(a.session_id, "s1");
        assert_eq!(a.event, status_event());
    }

    #[tokio::test]
    async fn topics_are_isolated() {
        let bus = SessionBus::new(8);
        let mut other = bus.subscribe("s2");
        assert_eq!(bus.send("s1", status_event()), 0);
        assert!(other.try_recv().is_err());
    }

    #[tokio::test]
    async fn dead_topic_is_removed_on_send() {
        let bus = SessionBus::new(8);
        let rx = bus.subscribe("s1");
        drop(rx);
        assert_eq!(bus.topic_count(), 1);
        assert_eq!(bus.send("s1", status_event()), 0);
        assert_eq!(bus.topic_count(), 0);
    }

    #[test]
    fn envelope_serializes_flat() {
        let envelope = Envelope {
            id: Uuid::nil(),
            session_id: "s1".into(),
            published_at: Utc::now(),
            event: status_event(),
        };
        let json = serde_json::to_value(&envelope).unwrap();
        assert_eq!(json["type"], "status_changed");
        assert_eq!(json["status"], "waiting_agent");
        assert_eq!(json["session_id"], "s1");
    }
}
