mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{ScriptedTransport, TestSink};
use jobpoll_core::{
    update, AppState, CalculationStatus, Effect, JobSlot, Msg, SearchStatus,
};
use jobpoll_engine::{EngineEvent, JobSupervisor, PollSettings};
use pretty_assertions::assert_eq;
use serde_json::json;

fn supervisor(transport: &Arc<ScriptedTransport>, sink: &Arc<TestSink>) -> JobSupervisor {
    JobSupervisor::new(transport.clone(), PollSettings::default(), sink.clone())
}

fn apply(supervisor: &mut JobSupervisor, effects: Vec<Effect>) {
    for effect in effects {
        match effect {
            Effect::StartJob { instance, request } => supervisor.start(instance, request),
            Effect::CancelJob { instance } => {
                supervisor.cancel(instance);
            }
            Effect::Notify { .. } => {}
        }
    }
}

fn deliver(mut state: AppState, events: Vec<EngineEvent>) -> AppState {
    for event in events {
        state = update(state, event.into_msg()).0;
    }
    state
}

#[tokio::test(start_paused = true)]
async fn only_the_latest_search_reaches_the_view() {
    let transport = ScriptedTransport::new();
    transport
        .reply("POST /api/lists/L1/find", 0, json!({"id": "A"}))
        .reply("POST /api/lists/L1/find", 0, json!({"id": "B"}));
    transport.reply(
        "GET /api/listfind/A",
        5000,
        json!({"complete": true, "result": {"rows": [{"email": "stale@x.com"}], "total": 9}}),
    );
    transport.reply(
        "GET /api/listfind/B",
        1000,
        json!({"complete": true, "result": {"rows": [{"email": "fresh@x.com"}], "total": 1}}),
    );
    let sink = TestSink::new();
    let mut supervisor = supervisor(&transport, &sink);

    let (state, effects) = update(
        AppState::new(),
        Msg::ListOpened {
            list_id: "L1".into(),
        },
    );
    apply(&mut supervisor, effects);
    tokio::time::sleep(Duration::from_millis(100)).await;

    let (state, effects) = update(state, Msg::SearchTermChanged("fresh".into()));
    apply(&mut supervisor, effects);

    tokio::time::sleep(Duration::from_secs(30)).await;
    let events = sink.take();
    assert!(events
        .iter()
        .all(|event| !matches!(event, EngineEvent::Finished { instance, .. } if instance.get() == 1)));

    let state = deliver(state, events);
    let view = state.view();
    assert_eq!(view.search.status, SearchStatus::Ready);
    assert_eq!(view.search.total, 1);
    assert_eq!(view.search.rows[0].email, "fresh@x.com");
    assert_eq!(transport.count("GET /api/listfind/A"), 0);
}

#[tokio::test(start_paused = true)]
async fn failed_poll_resets_view_to_ready() {
    let transport = ScriptedTransport::new();
    transport.reply("POST /api/lists/L1/find", 0, json!({"id": "A"}));
    transport.reply(
        "GET /api/listfind/A",
        0,
        json!({"error": "Search index unavailable"}),
    );
    let sink = TestSink::new();
    let mut supervisor = supervisor(&transport, &sink);

    let (state, effects) = update(
        AppState::new(),
        Msg::ListOpened {
            list_id: "L1".into(),
        },
    );
    apply(&mut supervisor, effects);
    tokio::time::sleep(Duration::from_secs(10)).await;

    let state = deliver(state, sink.take());
    let view = state.view();
    assert_eq!(view.search.status, SearchStatus::Ready);
    assert!(view.search.rows.is_empty());
    assert_eq!(view.search.total, 0);
    assert_eq!(view.notice.as_deref(), Some("Search index unavailable"));
    assert_eq!(supervisor.active(JobSlot::Search), None);
}

#[tokio::test(start_paused = true)]
async fn disposing_the_view_stops_polling_and_mutation() {
    let transport = ScriptedTransport::new();
    transport.reply("POST /api/lists/L1/find", 0, json!({"id": "A"}));
    transport.reply("GET /api/listfind/A", 0, json!({}));
    let sink = TestSink::new();
    let mut supervisor = supervisor(&transport, &sink);

    let (state, effects) = update(
        AppState::new(),
        Msg::ListOpened {
            list_id: "L1".into(),
        },
    );
    apply(&mut supervisor, effects);
    tokio::time::sleep(Duration::from_millis(2500)).await;
    assert_eq!(transport.count("GET /api/listfind/A"), 1);
    assert!(supervisor.active(JobSlot::Search).is_some());

    let (state, effects) = update(state, Msg::ViewDisposed);
    apply(&mut supervisor, effects);
    let frozen = state.clone();

    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(transport.count("GET /api/listfind/A"), 1);
    let state = deliver(state, sink.take());
    assert_eq!(state, frozen);
}

#[tokio::test(start_paused = true)]
async fn dropping_the_supervisor_cancels_jobs() {
    let transport = ScriptedTransport::new();
    transport.reply("POST /api/broadcasts/B1/calculate", 0, json!({"id": "g1"}));
    transport.reply("GET /api/broadcastcalculate/g1", 0, json!({}));
    let sink = TestSink::new();
    let mut supervisor = supervisor(&transport, &sink);

    let (_state, effects) = update(
        AppState::new(),
        Msg::CalculateRequested {
            broadcast_id: "B1".into(),
        },
    );
    apply(&mut supervisor, effects);
    tokio::time::sleep(Duration::from_millis(2500)).await;
    drop(supervisor);

    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(transport.count("GET /api/broadcastcalculate/g1"), 1);
    let events = sink.take();
    assert_eq!(events.len(), 1);
    assert!(matches!(events[0], EngineEvent::Accepted { .. }));
}

#[tokio::test(start_paused = true)]
async fn search_and_calculation_run_side_by_side() {
    let transport = ScriptedTransport::new();
    transport.reply(
        "POST /api/lists/L1/find",
        0,
        json!({"complete": true, "result": {"rows": [], "total": 0}}),
    );
    transport.reply("POST /api/broadcasts/B1/calculate", 0, json!({"id": "g1"}));
    transport
        .reply("GET /api/broadcastcalculate/g1", 0, json!({}))
        .reply(
            "GET /api/broadcastcalculate/g1",
            0,
            json!({"complete": true, "count": 10, "suppressed": 2, "remaining": 8, "unavailable": 0}),
        );
    let sink = TestSink::new();
    let mut supervisor = supervisor(&transport, &sink);

    let (state, effects) = update(
        AppState::new(),
        Msg::CalculateRequested {
            broadcast_id: "B1".into(),
        },
    );
    apply(&mut supervisor, effects);
    let (state, effects) = update(
        state,
        Msg::ListOpened {
            list_id: "L1".into(),
        },
    );
    apply(&mut supervisor, effects);

    tokio::time::sleep(Duration::from_secs(10)).await;
    let state = deliver(state, sink.take());
    let view = state.view();
    assert_eq!(view.search.status, SearchStatus::Ready);
    assert_eq!(view.calculation.status, CalculationStatus::Ready);
    let summary = view.calculation.summary.expect("summary");
    assert_eq!(summary.count, 10);
    assert_eq!(summary.remaining, 8);
    assert_eq!(transport.count("GET /api/broadcastcalculate/g1"), 2);
}

#[tokio::test(start_paused = true)]
async fn cancelling_a_superseded_instance_is_a_noop() {
    let transport = ScriptedTransport::new();
    transport.reply("POST /api/lists/L1/find", 0, json!({"id": "A"}));
    transport.reply("GET /api/listfind/A", 0, json!({}));
    let sink = TestSink::new();
    let mut supervisor = supervisor(&transport, &sink);

    let (state, effects) = update(
        AppState::new(),
        Msg::ListOpened {
            list_id: "L1".into(),
        },
    );
    apply(&mut supervisor, effects);
    let (_state, effects) = update(state, Msg::RefreshRequested);
    apply(&mut supervisor, effects);

    let active = supervisor.active(JobSlot::Search).expect("active search");
    assert_eq!(active.get(), 2);
    assert!(!supervisor.cancel(jobpoll_core::InstanceId::new(1)));
    assert_eq!(supervisor.active(JobSlot::Search), Some(active));
}
