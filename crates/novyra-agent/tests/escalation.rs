// SPDX-FileCopyrightText: 2026 Novyra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Agent capacity accounting across assignment, queueing and release.

use std::sync::Arc;

use novyra_agent::AssignOutcome;
use novyra_agent::escalation::{EscalationManager, QUEUED_NOTICE};
use novyra_core::traits::ChatStore;
use novyra_core::types::{ClientMeta, MessageType, SessionStatus};
use novyra_test_utils::TestHarness;
use proptest::prelude::*;

async fn harness_with_capacity(max: u32) -> TestHarness {
    TestHarness::builder()
        .configure(|c| c.escalation.default_max_concurrent_chats = max)
        .build()
        .await
        .unwrap()
}

#[tokio::test]
async fn full_agent_is_never_overloaded() {
    let h = harness_with_capacity(1).await;
    let staff = h.add_staff("ada", "Ada Obi", None).await.unwrap();

    let first = h.send("s1", "I want to speak with an agent").await.unwrap();
    assert!(first.agent_connected);

    let second = h.send("s2", "I want to speak with an agent").await.unwrap();
    assert!(!second.agent_connected);
    assert_eq!(second.status, SessionStatus::WaitingAgent);

    let agent = h.store.ensure_agent_profile(staff.id, 1).await.unwrap();
    assert_eq!(agent.current_chats, 1);
    assert_eq!(agent.max_concurrent_chats, 1);
}

#[tokio::test]
async fn released_slot_is_reused_by_waiting_session() {
    let h = harness_with_capacity(1).await;
    let staff = h.add_staff("ada", "Ada Obi", None).await.unwrap();

    h.send("s1", "I want to speak with an agent").await.unwrap();
    h.send("s2", "I want to speak with an agent").await.unwrap();

    h.engine.close_session("s1").await.unwrap();
    let agent = h.store.ensure_agent_profile(staff.id, 1).await.unwrap();
    assert_eq!(agent.current_chats, 0);
    assert_eq!(agent.total_chats_handled, 1);

    let retry = h.send("s2", "I want to speak with an agent").await.unwrap();
    assert!(retry.agent_connected);
    assert_eq!(retry.status, SessionStatus::AgentAssigned);
    let agent = h.store.get_agent(agent.id).await.unwrap().unwrap();
    assert_eq!(agent.current_chats, 1);
}

#[tokio::test]
async fn least_loaded_agent_is_chosen() {
    let h = harness_with_capacity(3).await;
    h.add_staff("ada", "Ada Obi", None).await.unwrap();
    h.add_staff("bayo", "Bayo Ade", None).await.unwrap();

    let a = h.send("s1", "connect me to an agent").await.unwrap();
    let b = h.send("s2", "connect me to an agent").await.unwrap();

    assert!(a.agent_connected && b.agent_connected);
    assert_ne!(a.assigned_agent, b.assigned_agent);
}

#[tokio::test]
async fn unavailable_agent_is_skipped() {
    let h = harness_with_capacity(3).await;
    let ada = h.add_staff("ada", "Ada Obi", None).await.unwrap();
    h.add_staff("bayo", "Bayo Ade", None).await.unwrap();
    h.engine.set_agent_availability(ada.id, false).await.unwrap();

    for session in ["s1", "s2"] {
        let result = h.send(session, "connect me to an agent").await.unwrap();
        assert_eq!(result.assigned_agent.as_deref(), Some("bayo"));
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_requests_respect_capacity() {
    let h = Arc::new(harness_with_capacity(2).await);
    let ada = h.add_staff("ada", "Ada Obi", None).await.unwrap();
    let bayo = h.add_staff("bayo", "Bayo Ade", None).await.unwrap();

    let mut handles = Vec::new();
    for i in 0..10 {
        let h = h.clone();
        handles.push(tokio::spawn(async move {
            h.send(&format!("session-{i}"), "I want to speak with an agent")
                .await
                .unwrap()
        }));
    }

    let mut connected = 0;
    for handle in handles {
        if handle.await.unwrap().agent_connected {
            connected += 1;
        }
    }
    assert_eq!(connected, 4);

    for staff in [ada, bayo] {
        let agent = h.store.ensure_agent_profile(staff.id, 2).await.unwrap();
        assert_eq!(agent.current_chats, 2, "{}", agent.username);
    }
}

#[tokio::test]
async fn manager_queues_and_leaves_system_notice() {
    let h = TestHarness::new().await.unwrap();
    let (session, _) = h
        .store
        .get_or_create_session("s1", &ClientMeta::default())
        .await
        .unwrap();
    let manager = EscalationManager::new(h.store.clone(), 5);

    let outcome = manager.assign_agent(&session).await.unwrap();
    assert_eq!(outcome, AssignOutcome::Queued);

    let stored = h.store.get_session("s1").await.unwrap().unwrap();
    assert_eq!(stored.status, SessionStatus::WaitingAgent);
    let messages = h.store.list_messages("s1").await.unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].message_type, MessageType::System);
    assert_eq!(messages[0].content, QUEUED_NOTICE);
}

#[tokio::test]
async fn manager_reports_existing_assignment() {
    let h = TestHarness::new().await.unwrap();
    h.add_staff("ada", "Ada Obi", None).await.unwrap();
    let manager = EscalationManager::new(h.store.clone(), 5);
    let (session, _) = h
        .store
        .get_or_create_session("s1", &ClientMeta::default())
        .await
        .unwrap();

    let AssignOutcome::Assigned(agent) = manager.assign_agent(&session).await.unwrap() else {
        panic!("expected an assignment");
    };

    let session = h.store.get_session("s1").await.unwrap().unwrap();
    assert_eq!(
        manager.assign_agent(&session).await.unwrap(),
        AssignOutcome::AlreadyAssigned { agent_id: agent.id }
    );
    let agent = h.store.get_agent(agent.id).await.unwrap().unwrap();
    assert_eq!(agent.current_chats, 1);
}

#[derive(Debug, Clone)]
enum Step {
    Open,
    Ask(usize),
    Close(usize),
}

fn step() -> impl Strategy<Value = Step> {
    prop_oneof![
        3 => Just(Step::Open),
        2 => (0..16usize).prop_map(Step::Ask),
        2 => (0..16usize).prop_map(Step::Close),
    ]
}

async fn run_steps(steps: Vec<Step>) {
    const MAX: u32 = 2;
    let h = harness_with_capacity(MAX).await;
    let staff = [
        h.add_staff("ada", "Ada Obi", None).await.unwrap(),
        h.add_staff("bayo", "Bayo Ade", None).await.unwrap(),
    ];

    // (session id, has agent, closed)
    let mut sessions: Vec<(String, bool, bool)> = Vec::new();
    for step in steps {
        match step {
            Step::Open => {
                let id = format!("s{}", sessions.len());
                let result = h.send(&id, "I want to speak with an agent").await.unwrap();
                sessions.push((id, result.agent_connected, false));
            }
            Step::Ask(k) if !sessions.is_empty() => {
                let slot = k % sessions.len();
                let (id, has_agent, closed) = &mut sessions[slot];
                if !*closed {
                    let result = h.send(id, "connect me to an agent").await.unwrap();
                    *has_agent |= result.agent_connected;
                }
            }
            Step::Close(k) if !sessions.is_empty() => {
                let slot = k % sessions.len();
                let (id, _, closed) = &mut sessions[slot];
                h.engine.close_session(id).await.unwrap();
                *closed = true;
            }
            _ => {}
        }

        let mut load = 0;
        for member in &staff {
            let agent = h.store.ensure_agent_profile(member.id, MAX).await.unwrap();
            assert!(agent.current_chats <= agent.max_concurrent_chats, "{agent:?}");
            load += agent.current_chats;
        }
        let attended = sessions.iter().filter(|(_, agent, closed)| *agent && !*closed).count();
        assert_eq!(load as usize, attended);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn capacity_holds_across_assign_and_close(steps in prop::collection::vec(step(), 1..30)) {
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap()
            .block_on(run_steps(steps));
    }
}
