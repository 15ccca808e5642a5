use std::time::Duration;

use jobpoll_core::Effect;
use jobpoll_engine::{ApiError, EngineEvent, EngineHandle, EngineSettings};
use jobpoll_logging::{poll_info, poll_warn};

pub struct EffectRunner {
    engine: EngineHandle,
}

impl EffectRunner {
    pub fn new(settings: &EngineSettings) -> Result<Self, ApiError> {
        Ok(Self {
            engine: EngineHandle::new(settings)?,
        })
    }

    pub fn enqueue(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::StartJob { instance, request } => {
                    poll_info!("StartJob instance={} request={:?}", instance, request);
                    self.engine.start(instance, request);
                }
                Effect::CancelJob { instance } => {
                    poll_info!("CancelJob instance={}", instance);
                    self.engine.cancel(instance);
                }
                // The notice is reported once, by `run_app`, when the job settles.
                Effect::Notify { message } => {
                    poll_warn!("Notify: {}", message);
                }
            }
        }
    }

    pub fn next_event(&self, timeout: Duration) -> Option<EngineEvent> {
        self.engine.recv_timeout(timeout)
    }

    pub fn is_running(&self) -> bool {
        self.engine.is_running()
    }
}
