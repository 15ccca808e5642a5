use std::time::Duration;

use crate::ApiError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollSettings {
    /// Delay between status requests; the first one is sent one interval
    /// after the handle is issued.
    pub interval: Duration,
    /// Status requests allowed per job before it is failed with
    /// [`crate::POLL_TIMEOUT`]. `None` polls until the server finishes.
    pub max_polls: Option<u32>,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(2000),
            max_polls: Some(300),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineSettings {
    pub base_url: url::Url,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub poll: PollSettings,
}

impl EngineSettings {
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let base_url =
            url::Url::parse(base_url).map_err(|err| ApiError::InvalidUrl(err.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidUrl(format!("{base_url} cannot be a base url")));
        }
        Ok(Self {
            base_url,
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            poll: PollSettings::default(),
        })
    }
}
