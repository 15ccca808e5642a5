use crate::{InstanceId, JobRequest};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Submit a job; every callback it produces must carry `instance`.
    StartJob {
        instance: InstanceId,
        request: JobRequest,
    },
    /// Stop polling for a superseded or disposed instance.
    CancelJob { instance: InstanceId },
    /// Transient, non-blocking user notification.
    Notify { message: String },
}
