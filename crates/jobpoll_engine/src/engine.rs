use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use jobpoll_core::{InstanceId, JobRequest};
use jobpoll_logging::{poll_debug, poll_error};

use crate::{
    ApiError, ChannelEventSink, EngineEvent, EngineSettings, JobSupervisor, PollSettings,
    ReqwestTransport, Transport,
};

enum EngineCommand {
    Start {
        instance: InstanceId,
        request: JobRequest,
    },
    Cancel {
        instance: InstanceId,
    },
}

/// Hosts a [`JobSupervisor`] on a dedicated thread with its own runtime.
///
/// Commands and events cross threads through `std::sync::mpsc`, so callers
/// need no async context. Dropping the handle cancels every running job and
/// joins the engine thread.
pub struct EngineHandle {
    cmd_tx: Option<mpsc::Sender<EngineCommand>>,
    event_rx: mpsc::Receiver<EngineEvent>,
    thread: Option<thread::JoinHandle<()>>,
}

impl EngineHandle {
    pub fn new(settings: &EngineSettings) -> Result<Self, ApiError> {
        let transport = ReqwestTransport::new(settings)?;
        Ok(Self::with_transport(
            Arc::new(transport),
            settings.poll.clone(),
        ))
    }

    pub fn with_transport(transport: Arc<dyn Transport>, settings: PollSettings) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();

        let thread = thread::spawn(move || {
            let runtime = match tokio::runtime::Runtime::new() {
                Ok(runtime) => runtime,
                Err(err) => {
                    poll_error!("failed to start engine runtime: {}", err);
                    return;
                }
            };
            let _guard = runtime.enter();
            let sink = Arc::new(ChannelEventSink::new(event_tx));
            let mut supervisor = JobSupervisor::new(transport, settings, sink);

            while let Ok(command) = cmd_rx.recv() {
                match command {
                    EngineCommand::Start { instance, request } => {
                        supervisor.start(instance, request);
                    }
                    EngineCommand::Cancel { instance } => {
                        supervisor.cancel(instance);
                    }
                }
            }
            poll_debug!("engine command channel closed, shutting down");
            supervisor.cancel_all();
        });

        Self {
            cmd_tx: Some(cmd_tx),
            event_rx,
            thread: Some(thread),
        }
    }

    pub fn start(&self, instance: InstanceId, request: JobRequest) {
        self.send(EngineCommand::Start { instance, request });
    }

    pub fn cancel(&self, instance: InstanceId) {
        self.send(EngineCommand::Cancel { instance });
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    /// Waits up to `timeout` for the next event.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }

    /// False once the engine thread has exited.
    pub fn is_running(&self) -> bool {
        self.thread
            .as_ref()
            .is_some_and(|thread| !thread.is_finished())
    }

    fn send(&self, command: EngineCommand) {
        if let Some(tx) = &self.cmd_tx {
            let _ = tx.send(command);
        }
    }
}

impl Drop for EngineHandle {
    fn drop(&mut self) {
        self.cmd_tx.take();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}
