// SPDX-FileCopyrightText: 2026 Novyra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Session operations outside the customer turn: closing, rating, staff
//! replies, learning feedback and knowledge seeding.

use novyra_core::NovyraError;
use novyra_core::traits::ChatStore;
use novyra_core::types::{ChatEvent, ClientMeta, MessageType, NewLearningRecord, SessionStatus};
use novyra_test_utils::TestHarness;

#[tokio::test]
async fn closing_twice_releases_agent_once() {
    let h = TestHarness::new().await.unwrap();
    let staff = h.add_staff("ada", "Ada Obi", None).await.unwrap();
    h.send("s1", "I want to speak with an agent").await.unwrap();
    let mut events = h.bus.subscribe("s1");

    h.engine.close_session("s1").await.unwrap();
    h.engine.close_session("s1").await.unwrap();

    let agent = h.store.ensure_agent_profile(staff.id, 5).await.unwrap();
    assert_eq!(agent.current_chats, 0);
    assert_eq!(agent.total_chats_handled, 1);

    let session = h.store.get_session("s1").await.unwrap().unwrap();
    assert_eq!(session.status, SessionStatus::Closed);
    assert!(session.resolved_at.is_some());

    let event = events.recv().await.unwrap();
    assert_eq!(
        event.event,
        ChatEvent::StatusChanged {
            status: SessionStatus::Closed
        }
    );
    assert!(events.try_recv().is_err());
}

#[tokio::test]
async fn finished_turns_release_their_session_locks() {
    let h = TestHarness::new().await.unwrap();
    let staff = h.add_staff("ada", "Ada Obi", None).await.unwrap();

    for i in 0..40 {
        h.send(&format!("s{i}"), "hello").await.unwrap();
    }
    for _ in 0..10 {
        h.engine
            .process_turn(None, "how much is a logo?", &ClientMeta::default())
            .await
            .unwrap();
    }
    h.engine.agent_reply("s0", staff.id, "Hi, Ada here").await.unwrap();
    h.engine.close_session("s1").await.unwrap();
    h.engine.close_session("s1").await.unwrap();
    assert!(h.engine.close_session("missing").await.is_err());
    assert!(h.engine.process_turn(Some("s2"), "   ", &ClientMeta::default()).await.is_err());

    assert_eq!(h.engine.sessions_in_flight(), 0);
}

#[tokio::test]
async fn resolving_a_closed_session_is_a_no_op() {
    let h = TestHarness::new().await.unwrap();
    h.send("s1", "hello").await.unwrap();

    h.engine.close_session("s1").await.unwrap();
    h.engine.resolve_session("s1").await.unwrap();

    let session = h.store.get_session("s1").await.unwrap().unwrap();
    assert_eq!(session.status, SessionStatus::Closed);
}

#[tokio::test]
async fn finishing_unknown_session_is_not_found() {
    let h = TestHarness::new().await.unwrap();
    let err = h.engine.close_session("nope").await.unwrap_err();
    assert!(matches!(err, NovyraError::NotFound { .. }));
}

#[tokio::test]
async fn rating_is_validated_and_stored() {
    let h = TestHarness::new().await.unwrap();
    h.send("s1", "hello").await.unwrap();

    for bad in [0, 6] {
        let err = h.engine.rate_session("s1", bad, None).await.unwrap_err();
        assert!(matches!(err, NovyraError::InvalidInput(_)));
    }
    let err = h.engine.rate_session("nope", 4, None).await.unwrap_err();
    assert!(matches!(err, NovyraError::NotFound { .. }));

    h.engine
        .rate_session("s1", 5, Some("Quick and clear"))
        .await
        .unwrap();
    let session = h.store.get_session("s1").await.unwrap().unwrap();
    assert_eq!(session.rating, Some(5));
    assert_eq!(session.feedback.as_deref(), Some("Quick and clear"));
}

#[tokio::test]
async fn staff_reply_takes_over_unattended_session() {
    let h = TestHarness::new().await.unwrap();
    let staff = h.add_staff("ada", "Ada Obi", None).await.unwrap();
    h.send("s1", "hello").await.unwrap();
    let mut events = h.bus.subscribe("s1");

    let message = h
        .engine
        .agent_reply("s1", staff.id, "Hi, Ada here. How can I help?")
        .await
        .unwrap();
    assert_eq!(message.message_type, MessageType::Agent);
    assert_eq!(message.sender_id, Some(staff.id));

    let session = h.store.get_session("s1").await.unwrap().unwrap();
    assert_eq!(session.status, SessionStatus::AgentAssigned);
    let agent = h.store.ensure_agent_profile(staff.id, 5).await.unwrap();
    assert_eq!(session.assigned_agent_id, Some(agent.id));
    assert_eq!(agent.current_chats, 1);

    let event = events.recv().await.unwrap();
    assert!(matches!(
        event.event,
        ChatEvent::ChatMessage { ref sender_name, message_type: MessageType::Agent, .. }
            if sender_name.as_deref() == Some("Ada Obi")
    ));

    // A second reply does not take another slot.
    h.engine.agent_reply("s1", staff.id, "Still there?").await.unwrap();
    let agent = h.store.get_agent(agent.id).await.unwrap().unwrap();
    assert_eq!(agent.current_chats, 1);

    // The customer's next message gets no automated reply.
    let turn = h.send("s1", "yes").await.unwrap();
    assert!(turn.message.is_empty());
    let ai = h
        .store
        .list_messages("s1")
        .await
        .unwrap()
        .iter()
        .filter(|m| m.message_type == MessageType::Ai)
        .count();
    assert_eq!(ai, 1);
}

#[tokio::test]
async fn staff_reply_rejects_bad_input() {
    let h = TestHarness::new().await.unwrap();
    let staff = h.add_staff("ada", "Ada Obi", None).await.unwrap();
    h.send("s1", "hello").await.unwrap();

    let err = h.engine.agent_reply("s1", staff.id, "  ").await.unwrap_err();
    assert!(matches!(err, NovyraError::InvalidInput(_)));

    let err = h.engine.agent_reply("nope", staff.id, "hi").await.unwrap_err();
    assert!(matches!(err, NovyraError::NotFound { .. }));

    let err = h.engine.agent_reply("s1", 9999, "hi").await.unwrap_err();
    assert!(matches!(err, NovyraError::NotFound { entity: "staff user", .. }));
}

#[tokio::test]
async fn staff_reply_respects_capacity() {
    let h = TestHarness::builder()
        .configure(|c| c.escalation.default_max_concurrent_chats = 1)
        .build()
        .await
        .unwrap();
    let staff = h.add_staff("ada", "Ada Obi", None).await.unwrap();
    h.send("s1", "I want to speak with an agent").await.unwrap();
    h.send("s2", "hello").await.unwrap();

    let err = h.engine.agent_reply("s2", staff.id, "hi").await.unwrap_err();
    assert!(matches!(err, NovyraError::Capacity { .. }));
    assert!(h.store.get_session("s2").await.unwrap().unwrap().assigned_agent_id.is_none());
}

#[tokio::test]
async fn transcript_lists_all_messages_in_order() {
    let h = TestHarness::new().await.unwrap();
    h.send("s1", "hello").await.unwrap();
    h.send("s1", "how much does it cost?").await.unwrap();

    let messages = h.engine.session_messages("s1").await.unwrap();
    let kinds: Vec<_> = messages.iter().map(|m| m.message_type).collect();
    assert_eq!(
        kinds,
        vec![MessageType::User, MessageType::Ai, MessageType::User, MessageType::Ai]
    );
    assert!(matches!(
        h.engine.session_messages("nope").await,
        Err(NovyraError::NotFound { .. })
    ));
}

#[tokio::test]
async fn helpful_feedback_is_reused_for_similar_questions() {
    let h = TestHarness::new().await.unwrap();
    let id = h
        .store
        .record_learning(&NewLearningRecord {
            session_id: None,
            user_message: "do you design logos for restaurants".into(),
            ai_response: "Yes! Logo design is part of our branding work.".into(),
            intent: Some("branding".into()),
            confidence: 0.95,
            escalated: false,
        })
        .await
        .unwrap();

    h.engine.mark_helpful(id, true).await.unwrap();
    assert_eq!(h.store.helpful_learning(50).await.unwrap().len(), 1);

    let result = h
        .send("s1", "do you design logos for restaurants")
        .await
        .unwrap();
    assert_eq!(result.intent, "branding");
    assert!(result.message.starts_with("Yes! Logo design is part of our branding work."));

    let err = h.engine.mark_helpful(id + 100, true).await.unwrap_err();
    assert!(matches!(err, NovyraError::NotFound { entity: "learning record", .. }));
}

#[tokio::test]
async fn seeding_runs_once() {
    let h = TestHarness::new().await.unwrap();

    assert_eq!(h.engine.seed_default_knowledge().await.unwrap(), 6);
    assert_eq!(h.engine.seed_default_knowledge().await.unwrap(), 0);
    assert_eq!(h.store.count_knowledge().await.unwrap(), 6);
}

#[tokio::test]
async fn agent_profiles_are_created_for_staff() {
    let h = TestHarness::new().await.unwrap();
    h.add_staff("ada", "Ada Obi", None).await.unwrap();
    h.add_staff("bayo", "Bayo Ade", None).await.unwrap();

    let profiles = h.engine.agent_profiles().await.unwrap();
    assert_eq!(profiles.len(), 2);
    assert!(profiles.iter().all(|p| p.is_available && p.current_chats == 0));
    assert!(h.engine.business_hours_summary().contains("9:00 AM"));
}
