use crate::{InstanceId, JobHandle, JobOutput, SearchQuery, StatusFilter};

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// User opened a contact list; starts a search with an empty query.
    ListOpened { list_id: String },
    /// Restore a complete query, cursor included, e.g. from a deep link.
    QuerySubmitted { list_id: String, query: SearchQuery },
    /// User edited the search box.
    SearchTermChanged(String),
    /// User switched the status tab.
    FilterChanged(StatusFilter),
    NextPageRequested,
    PreviousPageRequested,
    /// Re-run the current query, cursor included.
    RefreshRequested,
    /// User checked or unchecked a row.
    RowToggled { key: String },
    /// User toggled "select all matching".
    SelectAllToggled,
    /// User asked for the recipient count of a broadcast.
    CalculateRequested { broadcast_id: String },
    /// Engine: the server deferred the job and issued a handle.
    JobAccepted {
        instance: InstanceId,
        handle: JobHandle,
    },
    /// Engine: the job finished with a payload.
    JobCompleted {
        instance: InstanceId,
        output: JobOutput,
    },
    /// Engine: the job failed or could not be reached.
    JobFailed {
        instance: InstanceId,
        message: String,
    },
    /// The owning view was torn down.
    ViewDisposed,
    /// UI/render tick to coalesce rendering.
    Tick,
    /// Fallback for placeholder wiring.
    NoOp,
}
