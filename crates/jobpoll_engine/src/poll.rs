use std::time::Duration;

use futures_util::stream::{self, Stream, StreamExt};
use jobpoll_core::{JobHandle, JobStatus};
use jobpoll_logging::{poll_debug, poll_trace, poll_warn};
use tokio::time::{self, Instant, Interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::wire::parse_status;
use crate::{
    submit, AsyncJob, JobOutcome, PollSettings, Submission, Transport, GENERIC_FAILURE,
    POLL_TIMEOUT,
};

struct PollState<'a, J> {
    transport: &'a dyn Transport,
    job: &'a J,
    handle: JobHandle,
    ticker: Interval,
    polls: u32,
    max_polls: Option<u32>,
    finished: bool,
}

/// Statuses of `handle`, one per interval, ending after the first terminal
/// status. Transport errors and an exhausted poll bound end the stream
/// with a `Failed` item. Dropping the stream stops polling.
pub fn status_stream<'a, J: AsyncJob>(
    transport: &'a dyn Transport,
    job: &'a J,
    handle: JobHandle,
    settings: &PollSettings,
) -> impl Stream<Item = JobStatus<J::Output>> + Send + 'a {
    let period = settings.interval.max(Duration::from_millis(1));
    let mut ticker = time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let state = PollState {
        transport,
        job,
        handle,
        ticker,
        polls: 0,
        max_polls: settings.max_polls,
        finished: false,
    };

    stream::unfold(state, |mut state| async move {
        if state.finished {
            return None;
        }
        if state.max_polls.is_some_and(|max| state.polls >= max) {
            poll_warn!(
                "{} job {} still pending after {} polls",
                state.job.name(),
                state.handle,
                state.polls
            );
            state.finished = true;
            return Some((JobStatus::Failed(POLL_TIMEOUT.to_owned()), state));
        }

        state.ticker.tick().await;
        state.polls += 1;

        let path = state.job.status_path(&state.handle);
        let segments: Vec<&str> = path.iter().map(String::as_str).collect();
        let status = match state
            .transport
            .get_json(&segments)
            .await
            .and_then(parse_status::<J::Output>)
        {
            Ok(status) => status,
            Err(err) => {
                poll_warn!(
                    "{} job {} status request failed: {}",
                    state.job.name(),
                    state.handle,
                    err
                );
                JobStatus::Failed(GENERIC_FAILURE.to_owned())
            }
        };

        poll_trace!(
            "{} job {} poll {} terminal={}",
            state.job.name(),
            state.handle,
            state.polls,
            status.is_terminal()
        );
        state.finished = status.is_terminal();
        Some((status, state))
    })
}

/// Submits `job` and polls it to a terminal state.
///
/// `on_accepted` runs once if the server issues a handle. Cancelling
/// `cancel` at any point drops the in-flight request and returns
/// [`JobOutcome::Cancelled`]; nothing received afterwards is reported.
pub async fn run_job<J, F>(
    transport: &dyn Transport,
    job: &J,
    settings: &PollSettings,
    cancel: &CancellationToken,
    on_accepted: F,
) -> JobOutcome<J::Output>
where
    J: AsyncJob,
    F: FnOnce(JobHandle) + Send,
{
    let submission = tokio::select! {
        biased;
        _ = cancel.cancelled() => return JobOutcome::Cancelled,
        submission = submit(transport, job) => submission,
    };

    let handle = match submission {
        Submission::Immediate(payload) => return JobOutcome::Complete(payload),
        Submission::Failed(message) => return JobOutcome::Failed(message),
        Submission::Deferred(handle) => handle,
    };
    on_accepted(handle.clone());

    let mut statuses = std::pin::pin!(status_stream(transport, job, handle.clone(), settings));
    loop {
        let next = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                poll_debug!("{} job {} cancelled", job.name(), handle);
                return JobOutcome::Cancelled;
            }
            next = statuses.next() => next,
        };
        match next {
            Some(JobStatus::Pending) => continue,
            Some(JobStatus::Complete(payload)) => return JobOutcome::Complete(payload),
            Some(JobStatus::Failed(message)) => return JobOutcome::Failed(message),
            None => return JobOutcome::Failed(GENERIC_FAILURE.to_owned()),
        }
    }
}
