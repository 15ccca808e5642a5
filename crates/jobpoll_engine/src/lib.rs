//! Jobpoll engine: HTTP transport, job submission, status polling and the
//! supervisor that keeps one live job per view slot.
mod engine;
mod job;
mod poll;
mod settings;
mod submit;
mod supervisor;
mod transport;
mod types;
mod wire;

pub use engine::EngineHandle;
pub use job::{AsyncJob, ContactSearch, RecipientCount};
pub use poll::{run_job, status_stream};
pub use settings::{EngineSettings, PollSettings};
pub use submit::{submit, Submission};
pub use supervisor::{ChannelEventSink, EventSink, JobSupervisor};
pub use transport::{ReqwestTransport, Transport};
pub use types::{ApiError, EngineEvent, JobOutcome, GENERIC_FAILURE, POLL_TIMEOUT};
pub use wire::{parse_status, parse_submission};
