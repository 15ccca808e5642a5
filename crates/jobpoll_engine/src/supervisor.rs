use std::collections::HashMap;
use std::sync::{mpsc, Arc};

use jobpoll_core::{InstanceId, JobOutput, JobRequest, JobSlot};
use jobpoll_logging::{poll_debug, poll_info};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::{
    run_job, ContactSearch, EngineEvent, JobOutcome, PollSettings, RecipientCount, Transport,
};

pub trait EventSink: Send + Sync {
    fn emit(&self, event: EngineEvent);
}

pub struct ChannelEventSink {
    tx: mpsc::Sender<EngineEvent>,
}

impl ChannelEventSink {
    pub fn new(tx: mpsc::Sender<EngineEvent>) -> Self {
        Self { tx }
    }
}

impl EventSink for ChannelEventSink {
    fn emit(&self, event: EngineEvent) {
        let _ = self.tx.send(event);
    }
}

struct SlotEntry {
    instance: InstanceId,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

/// Runs jobs on the current tokio runtime, at most one per [`JobSlot`].
///
/// Starting a job cancels the previous job of its slot. Dropping the
/// supervisor cancels every job it started.
pub struct JobSupervisor {
    transport: Arc<dyn Transport>,
    settings: PollSettings,
    sink: Arc<dyn EventSink>,
    slots: HashMap<JobSlot, SlotEntry>,
}

impl JobSupervisor {
    pub fn new(
        transport: Arc<dyn Transport>,
        settings: PollSettings,
        sink: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            transport,
            settings,
            sink,
            slots: HashMap::new(),
        }
    }

    /// Must be called from within a tokio runtime.
    pub fn start(&mut self, instance: InstanceId, request: JobRequest) {
        let slot = request.slot();
        if let Some(previous) = self.slots.remove(&slot) {
            poll_debug!(
                "{:?} slot: {} superseded by {}",
                slot,
                previous.instance,
                instance
            );
            previous.cancel.cancel();
        }

        let cancel = CancellationToken::new();
        let task = tokio::spawn(drive(
            self.transport.clone(),
            self.settings.clone(),
            self.sink.clone(),
            instance,
            request,
            cancel.clone(),
        ));
        self.slots.insert(
            slot,
            SlotEntry {
                instance,
                cancel,
                task,
            },
        );
    }

    /// Cancels `instance` if it still owns its slot.
    pub fn cancel(&mut self, instance: InstanceId) -> bool {
        let slot = self
            .slots
            .iter()
            .find_map(|(slot, entry)| (entry.instance == instance).then_some(*slot));
        match slot.and_then(|slot| self.slots.remove(&slot)) {
            Some(entry) => {
                poll_debug!("cancelling {}", instance);
                entry.cancel.cancel();
                true
            }
            None => false,
        }
    }

    pub fn cancel_all(&mut self) {
        for (_, entry) in self.slots.drain() {
            entry.cancel.cancel();
        }
    }

    /// Instance whose job is still running in `slot`.
    pub fn active(&self, slot: JobSlot) -> Option<InstanceId> {
        self.slots
            .get(&slot)
            .filter(|entry| !entry.task.is_finished())
            .map(|entry| entry.instance)
    }
}

impl Drop for JobSupervisor {
    fn drop(&mut self) {
        self.cancel_all();
    }
}

async fn drive(
    transport: Arc<dyn Transport>,
    settings: PollSettings,
    sink: Arc<dyn EventSink>,
    instance: InstanceId,
    request: JobRequest,
    cancel: CancellationToken,
) {
    let accept_sink = sink.clone();
    let accept_cancel = cancel.clone();
    let on_accepted = move |handle| {
        if !accept_cancel.is_cancelled() {
            accept_sink.emit(EngineEvent::Accepted { instance, handle });
        }
    };

    let outcome = match request {
        JobRequest::ContactSearch { list_id, query } => {
            let job = ContactSearch::new(list_id, query);
            run_job(transport.as_ref(), &job, &settings, &cancel, on_accepted)
                .await
                .map(JobOutput::Search)
        }
        JobRequest::RecipientCount { broadcast_id } => {
            let job = RecipientCount::new(broadcast_id);
            run_job(transport.as_ref(), &job, &settings, &cancel, on_accepted)
                .await
                .map(JobOutput::Calculation)
        }
    };

    // A result that raced with cancellation belongs to a superseded instance.
    if cancel.is_cancelled() {
        poll_debug!("dropping outcome of cancelled {}", instance);
        return;
    }
    let result = match outcome {
        JobOutcome::Complete(output) => Ok(output),
        JobOutcome::Failed(message) => Err(message),
        JobOutcome::Cancelled => return,
    };
    poll_info!("{} finished ok={}", instance, result.is_ok());
    sink.emit(EngineEvent::Finished { instance, result });
}
