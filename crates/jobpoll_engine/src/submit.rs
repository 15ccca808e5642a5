use jobpoll_core::JobHandle;
use jobpoll_logging::{poll_debug, poll_warn};

use crate::wire::parse_submission;
use crate::{AsyncJob, Transport, GENERIC_FAILURE};

/// Answer to the initiating request of a job.
#[derive(Debug, Clone, PartialEq)]
pub enum Submission<P> {
    /// The server answered synchronously; no polling is needed.
    Immediate(P),
    /// The server deferred the work; poll the handle.
    Deferred(JobHandle),
    /// The job could not be started. Never retried.
    Failed(String),
}

/// Issues the single request that starts `job`.
///
/// Transport and decode errors are logged and reported as
/// [`GENERIC_FAILURE`]; a server-reported error is passed through verbatim.
pub async fn submit<J: AsyncJob>(transport: &dyn Transport, job: &J) -> Submission<J::Output> {
    let path = job.submit_path();
    let segments: Vec<&str> = path.iter().map(String::as_str).collect();

    let result = transport
        .post_json(&segments, &job.submit_query(), &job.submit_body())
        .await
        .and_then(parse_submission::<J::Output>);

    match result {
        Ok(Submission::Deferred(handle)) => {
            poll_debug!("{} deferred as job {}", job.name(), handle);
            Submission::Deferred(handle)
        }
        Ok(submission) => submission,
        Err(err) => {
            poll_warn!("{} submit failed: {}", job.name(), err);
            Submission::Failed(GENERIC_FAILURE.to_owned())
        }
    }
}
