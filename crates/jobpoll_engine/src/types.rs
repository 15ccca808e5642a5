pub use jobpoll_core::GENERIC_FAILURE;
use jobpoll_core::{InstanceId, JobHandle, JobOutput, Msg};

/// Shown to the user when the poll bound is exhausted.
pub const POLL_TIMEOUT: &str = "Timed out waiting for the server to finish";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    #[error("http status {0}")]
    HttpStatus(u16),
    #[error("timeout")]
    Timeout,
    #[error("network error: {0}")]
    Network(String),
    #[error("unencodable request body: {0}")]
    Encode(String),
    #[error("undecodable response: {0}")]
    Decode(String),
    #[error("unexpected response: {0}")]
    Unexpected(String),
}

/// Final state of one submit-and-poll run.
#[derive(Debug, Clone, PartialEq)]
pub enum JobOutcome<P> {
    Complete(P),
    Failed(String),
    Cancelled,
}

impl<P> JobOutcome<P> {
    pub fn map<Q>(self, f: impl FnOnce(P) -> Q) -> JobOutcome<Q> {
        match self {
            JobOutcome::Complete(payload) => JobOutcome::Complete(f(payload)),
            JobOutcome::Failed(message) => JobOutcome::Failed(message),
            JobOutcome::Cancelled => JobOutcome::Cancelled,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// The server deferred the job and issued a handle.
    Accepted {
        instance: InstanceId,
        handle: JobHandle,
    },
    /// The job reached a terminal state. Cancelled jobs never emit this.
    Finished {
        instance: InstanceId,
        result: Result<JobOutput, String>,
    },
}

impl EngineEvent {
    pub fn instance(&self) -> InstanceId {
        match self {
            EngineEvent::Accepted { instance, .. } | EngineEvent::Finished { instance, .. } => {
                *instance
            }
        }
    }

    pub fn into_msg(self) -> Msg {
        match self {
            EngineEvent::Accepted { instance, handle } => Msg::JobAccepted { instance, handle },
            EngineEvent::Finished {
                instance,
                result: Ok(output),
            } => Msg::JobCompleted { instance, output },
            EngineEvent::Finished {
                instance,
                result: Err(message),
            } => Msg::JobFailed { instance, message },
        }
    }
}
