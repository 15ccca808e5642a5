use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{CalculationSummary, SearchPayload, SearchQuery};

/// Shown to the user when a request fails for reasons other than a
/// server-reported job error.
pub const GENERIC_FAILURE: &str = "The request could not be completed, please try again";

/// Generation number tagging one submit and every callback it produces.
///
/// Issued in strictly increasing order by [`crate::AppState`]; a callback is
/// applied only while its instance still owns the view it targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct InstanceId(u64);

impl InstanceId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Opaque server-side job identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobHandle(String);

impl JobHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Status of a server-side job as reported by one response.
#[derive(Debug, Clone, PartialEq)]
pub enum JobStatus<P> {
    Pending,
    Complete(P),
    Failed(String),
}

impl<P> JobStatus<P> {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, JobStatus::Pending)
    }

    pub fn map<Q>(self, f: impl FnOnce(P) -> Q) -> JobStatus<Q> {
        match self {
            JobStatus::Pending => JobStatus::Pending,
            JobStatus::Complete(payload) => JobStatus::Complete(f(payload)),
            JobStatus::Failed(message) => JobStatus::Failed(message),
        }
    }
}

/// The view a job belongs to. Each slot holds at most one live job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum JobSlot {
    Search,
    Calculation,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobRequest {
    ContactSearch { list_id: String, query: SearchQuery },
    RecipientCount { broadcast_id: String },
}

impl JobRequest {
    pub fn slot(&self) -> JobSlot {
        match self {
            JobRequest::ContactSearch { .. } => JobSlot::Search,
            JobRequest::RecipientCount { .. } => JobSlot::Calculation,
        }
    }
}

/// Payload of a completed job.
#[derive(Debug, Clone, PartialEq)]
pub enum JobOutput {
    Search(SearchPayload),
    Calculation(CalculationSummary),
}

/// Ownership record of the instance currently allowed to mutate a view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActiveJob {
    instance: Option<InstanceId>,
    handle: Option<JobHandle>,
}

impl ActiveJob {
    /// Makes `instance` the owner and returns the superseded owner, if any.
    pub fn begin(&mut self, instance: InstanceId) -> Option<InstanceId> {
        let previous = self.instance.replace(instance);
        self.handle = None;
        previous
    }

    /// Records the handle issued for `instance`. Returns false for stale instances.
    pub fn accept(&mut self, instance: InstanceId, handle: JobHandle) -> bool {
        if !self.owns(instance) {
            return false;
        }
        self.handle = Some(handle);
        true
    }

    /// Releases ownership if `instance` is the owner. Returns false for stale instances.
    pub fn finish(&mut self, instance: InstanceId) -> bool {
        if !self.owns(instance) {
            return false;
        }
        self.instance = None;
        self.handle = None;
        true
    }

    /// Releases ownership unconditionally and returns the released instance.
    pub fn clear(&mut self) -> Option<InstanceId> {
        self.handle = None;
        self.instance.take()
    }

    pub fn owns(&self, instance: InstanceId) -> bool {
        self.instance == Some(instance)
    }

    pub fn instance(&self) -> Option<InstanceId> {
        self.instance
    }

    pub fn handle(&self) -> Option<&JobHandle> {
        self.handle.as_ref()
    }
}
