use jobpoll_logging::{poll_debug, poll_warn};

use crate::{
    AppState, Effect, JobOutput, JobRequest, Msg, PageCursor, SearchQuery, SearchStatus,
    GENERIC_FAILURE,
};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    if state.is_disposed() {
        poll_debug!("view disposed, dropping {:?}", msg);
        return (state, Vec::new());
    }

    let effects = match msg {
        Msg::ListOpened { list_id } => {
            state.search.list_id = Some(list_id);
            state.search.query = SearchQuery::default();
            state.search.rows.clear();
            state.search.total = 0;
            state.search.fields.clear();
            submit_search(&mut state)
        }
        Msg::QuerySubmitted { list_id, query } => {
            if state.search.list_id.as_deref() != Some(list_id.as_str()) {
                state.search.rows.clear();
                state.search.total = 0;
                state.search.fields.clear();
            }
            state.search.list_id = Some(list_id);
            state.search.query = query;
            submit_search(&mut state)
        }
        Msg::SearchTermChanged(term) => {
            if state.search.query.term.trim() == term.trim() {
                return (state, Vec::new());
            }
            state.search.query = SearchQuery::new(term, state.search.query.filter);
            state.mark_dirty();
            submit_search(&mut state)
        }
        Msg::FilterChanged(filter) => {
            if state.search.query.filter == filter {
                return (state, Vec::new());
            }
            let term = std::mem::take(&mut state.search.query.term);
            state.search.query = SearchQuery::new(term, filter);
            state.mark_dirty();
            submit_search(&mut state)
        }
        Msg::NextPageRequested => match state.search.last_key().map(ToOwned::to_owned) {
            Some(key) => page_to(&mut state, PageCursor::After(key)),
            None => Vec::new(),
        },
        Msg::PreviousPageRequested => match state.search.first_key().map(ToOwned::to_owned) {
            Some(key) => page_to(&mut state, PageCursor::Before(key)),
            None => Vec::new(),
        },
        Msg::RefreshRequested => submit_search(&mut state),
        Msg::RowToggled { key } => {
            let known = state.search.rows.iter().any(|row| row.email == key);
            if state.search.status != SearchStatus::Ready || !known {
                return (state, Vec::new());
            }
            let selection = &mut state.search.selection;
            selection.all = false;
            if !selection.keys.remove(&key) {
                selection.keys.insert(key);
            }
            state.mark_dirty();
            Vec::new()
        }
        Msg::SelectAllToggled => {
            if state.search.status != SearchStatus::Ready {
                return (state, Vec::new());
            }
            let selection = &mut state.search.selection;
            selection.all = !selection.all;
            selection.keys.clear();
            state.mark_dirty();
            Vec::new()
        }
        Msg::CalculateRequested { broadcast_id } => {
            let instance = state.issue_instance();
            let superseded = state.begin_calculation(instance, broadcast_id.clone());
            let mut effects = Vec::with_capacity(2);
            if let Some(previous) = superseded {
                effects.push(Effect::CancelJob { instance: previous });
            }
            effects.push(Effect::StartJob {
                instance,
                request: JobRequest::RecipientCount { broadcast_id },
            });
            effects
        }
        Msg::JobAccepted { instance, handle } => {
            if !state.accept_handle(instance, handle) {
                poll_debug!("discarding handle for superseded instance {}", instance);
            }
            Vec::new()
        }
        Msg::JobCompleted { instance, output } => {
            let applied = match output {
                JobOutput::Search(payload) => state.reconcile_search(instance, payload),
                JobOutput::Calculation(summary) => state.reconcile_calculation(instance, summary),
            };
            if applied {
                Vec::new()
            } else if state.fail_instance(instance, GENERIC_FAILURE) {
                poll_warn!("job {} completed with output for the other view", instance);
                vec![Effect::Notify {
                    message: GENERIC_FAILURE.to_owned(),
                }]
            } else {
                poll_debug!("discarding result for superseded instance {}", instance);
                Vec::new()
            }
        }
        Msg::JobFailed { instance, message } => {
            if state.fail_instance(instance, &message) {
                poll_warn!("job {} failed: {}", instance, message);
                vec![Effect::Notify { message }]
            } else {
                poll_debug!("discarding failure for superseded instance {}", instance);
                Vec::new()
            }
        }
        Msg::ViewDisposed => state
            .dispose()
            .into_iter()
            .map(|instance| Effect::CancelJob { instance })
            .collect(),
        Msg::Tick | Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

fn page_to(state: &mut AppState, cursor: PageCursor) -> Vec<Effect> {
    state.search.query.cursor = Some(cursor);
    submit_search(state)
}

/// Starts a new search instance for the current list and query.
fn submit_search(state: &mut AppState) -> Vec<Effect> {
    let Some(list_id) = state.search.list_id.clone() else {
        return Vec::new();
    };
    let instance = state.issue_instance();
    let superseded = state.begin_search(instance);

    let mut effects = Vec::with_capacity(2);
    if let Some(previous) = superseded {
        effects.push(Effect::CancelJob { instance: previous });
    }
    effects.push(Effect::StartJob {
        instance,
        request: JobRequest::ContactSearch {
            list_id,
            query: state.search.query.clone(),
        },
    });
    effects
}
