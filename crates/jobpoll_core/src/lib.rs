//! Jobpoll core: pure state machine for views backed by server-side
//! asynchronous jobs (contact search, broadcast recipient calculation).
mod calculation;
mod effect;
mod job;
mod msg;
mod search;
mod state;
mod update;
mod view_model;

pub use calculation::CalculationSummary;
pub use effect::Effect;
pub use job::{
    ActiveJob, InstanceId, JobHandle, JobOutput, JobRequest, JobSlot, JobStatus, GENERIC_FAILURE,
};
pub use msg::Msg;
pub use search::{ContactRow, PageCursor, SearchPayload, SearchQuery, StatusFilter};
pub use state::{AppState, CalculationStatus, SearchStatus, Selection};
pub use update::update;
pub use view_model::{AppViewModel, CalculationViewModel, SearchViewModel};
