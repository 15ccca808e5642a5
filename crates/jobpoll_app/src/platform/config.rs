//! RON configuration file for the command-line front end.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use jobpoll_engine::{ApiError, EngineSettings, PollSettings};
use jobpoll_logging::poll_info;
use serde::{Deserialize, Serialize};

const DEFAULT_BASE_URL: &str = "http://localhost:8000";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct AppConfig {
    pub base_url: String,
    pub poll_interval_ms: u64,
    pub max_polls: Option<u32>,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        let poll = PollSettings::default();
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            poll_interval_ms: poll.interval.as_millis() as u64,
            max_polls: poll.max_polls,
            connect_timeout_secs: 10,
            request_timeout_secs: 30,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub(crate) enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to parse config {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: ron::error::SpannedError,
    },
    #[error("invalid setting: {0}")]
    Invalid(String),
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Loads `path`, falling back to defaults when the file does not exist.
pub(crate) fn load(path: &Path) -> Result<AppConfig, ConfigError> {
    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            poll_info!("No config at {:?}, using defaults", path);
            return Ok(AppConfig::default());
        }
        Err(source) => {
            return Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    let config = ron::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    poll_info!("Loaded config from {:?}", path);
    Ok(config)
}

impl AppConfig {
    pub(crate) fn engine_settings(
        &self,
        base_url_override: Option<&str>,
    ) -> Result<EngineSettings, ConfigError> {
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::Invalid("poll_interval_ms must be positive".into()));
        }
        if self.max_polls == Some(0) {
            return Err(ConfigError::Invalid("max_polls must be positive".into()));
        }

        let mut settings = EngineSettings::new(base_url_override.unwrap_or(&self.base_url))?;
        settings.connect_timeout = Duration::from_secs(self.connect_timeout_secs);
        settings.request_timeout = Duration::from_secs(self.request_timeout_secs);
        settings.poll = PollSettings {
            interval: Duration::from_millis(self.poll_interval_ms),
            max_polls: self.max_polls,
        };
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load(&dir.path().join("jobpoll.ron")).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.poll_interval_ms, 2000);
    }

    #[test]
    fn partial_file_keeps_remaining_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("jobpoll.ron");
        fs::write(
            &path,
            r#"(base_url: "https://app.example.com", max_polls: None)"#,
        )
        .unwrap();

        let config = load(&path).unwrap();
        assert_eq!(config.base_url, "https://app.example.com");
        assert_eq!(config.max_polls, None);
        assert_eq!(config.request_timeout_secs, 30);

        let settings = config.engine_settings(None).unwrap();
        assert_eq!(settings.poll.max_polls, None);
        assert_eq!(settings.base_url.as_str(), "https://app.example.com/");
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("jobpoll.ron");
        fs::write(&path, "(base_url: ").unwrap();
        assert!(matches!(load(&path), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn override_and_validation() {
        let config = AppConfig::default();
        let settings = config
            .engine_settings(Some("https://other.example.com"))
            .unwrap();
        assert_eq!(settings.base_url.host_str(), Some("other.example.com"));

        let zero = AppConfig {
            poll_interval_ms: 0,
            ..AppConfig::default()
        };
        assert!(matches!(
            zero.engine_settings(None),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            config.engine_settings(Some("::")),
            Err(ConfigError::Api(_))
        ));
    }
}
