use jobpoll_core::{
    update, AppState, CalculationStatus, Effect, InstanceId, JobOutput, Msg, SearchPayload,
    SearchStatus,
};

#[test]
fn disposing_cancels_active_jobs_and_freezes_state() {
    jobpoll_logging::initialize_for_tests();
    let (state, _) = update(
        AppState::new(),
        Msg::ListOpened {
            list_id: "L1".into(),
        },
    );
    let (state, _) = update(
        state,
        Msg::CalculateRequested {
            broadcast_id: "B1".into(),
        },
    );

    let (mut state, effects) = update(state, Msg::ViewDisposed);
    assert_eq!(
        effects,
        vec![
            Effect::CancelJob {
                instance: InstanceId::new(1)
            },
            Effect::CancelJob {
                instance: InstanceId::new(2)
            },
        ]
    );
    assert!(state.consume_dirty());
    let frozen = state.clone();

    let (state, effects) = update(
        state,
        Msg::JobCompleted {
            instance: InstanceId::new(1),
            output: JobOutput::Search(SearchPayload::default()),
        },
    );
    assert!(effects.is_empty());
    let (state, effects) = update(state, Msg::RefreshRequested);
    assert!(effects.is_empty());
    assert_eq!(state, frozen);

    let view = state.view();
    assert!(view.disposed);
    assert_eq!(view.search.status, SearchStatus::Idle);
    assert_eq!(view.calculation.status, CalculationStatus::Idle);
}

#[test]
fn disposing_an_idle_view_emits_nothing() {
    let (state, effects) = update(AppState::new(), Msg::ViewDisposed);
    assert!(effects.is_empty());
    assert!(state.is_disposed());
}
