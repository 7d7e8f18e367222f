//! Application configuration, read from a RON file.
//!
//! Every field is optional in the file; missing fields take the defaults
//! below. Command-line flags are applied on top with [`AppConfig::with_overrides`].

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use lexsum_engine::{ApiSettings, PollSettings};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

pub const DEFAULT_CONFIG_FILE: &str = "lexsum.ron";
pub const LOG_FILENAME: &str = "lexsum.log";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config {path:?}: {message}")]
    Parse { path: PathBuf, message: String },
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub api_base_url: String,
    pub data_dir: PathBuf,
    pub poll_interval_ms: u64,
    pub session_timeout_secs: u64,
    pub max_polls: u32,
    pub upload_timeout_secs: u64,
    pub poll_timeout_secs: u64,
    pub result_timeout_secs: u64,
    pub chat_timeout_secs: u64,
    pub log_to_file: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8000".to_string(),
            data_dir: PathBuf::from(".lexsum"),
            poll_interval_ms: 1000,
            session_timeout_secs: 300,
            max_polls: lexsum_core::DEFAULT_MAX_POLLS,
            upload_timeout_secs: 30,
            poll_timeout_secs: 10,
            result_timeout_secs: 30,
            chat_timeout_secs: 60,
            log_to_file: true,
        }
    }
}

impl AppConfig {
    /// Loads `path`, or `lexsum.ron` in the working directory when no path is
    /// given. Only an explicitly named file is required to exist.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let (path, required) = match path {
            Some(path) => (path.to_path_buf(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
        };
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound && !required => {
                return Ok(Self::default());
            }
            Err(source) => return Err(ConfigError::Read { path, source }),
        };
        Self::parse(&text).map_err(|err| match err {
            ConfigError::Parse { message, .. } => ConfigError::Parse { path, message },
            other => other,
        })
    }

    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let config: Self = ron::from_str(text).map_err(|err| ConfigError::Parse {
            path: PathBuf::new(),
            message: err.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_overrides(
        mut self,
        api_url: Option<String>,
        data_dir: Option<PathBuf>,
    ) -> Result<Self, ConfigError> {
        if let Some(api_url) = api_url {
            self.api_base_url = api_url;
        }
        if let Some(data_dir) = data_dir {
            self.data_dir = data_dir;
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = Url::parse(&self.api_base_url).map_err(|err| {
            ConfigError::Invalid(format!("api_base_url {:?}: {}", self.api_base_url, err))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::Invalid(format!(
                "api_base_url {:?} must be http or https",
                self.api_base_url
            )));
        }
        let durations = [
            ("poll_interval_ms", self.poll_interval_ms),
            ("session_timeout_secs", self.session_timeout_secs),
            ("upload_timeout_secs", self.upload_timeout_secs),
            ("poll_timeout_secs", self.poll_timeout_secs),
            ("result_timeout_secs", self.result_timeout_secs),
            ("chat_timeout_secs", self.chat_timeout_secs),
        ];
        if let Some((name, _)) = durations.iter().find(|(_, value)| *value == 0) {
            return Err(ConfigError::Invalid(format!("{name} must be greater than zero")));
        }
        if self.max_polls == 0 {
            return Err(ConfigError::Invalid(
                "max_polls must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn api_settings(&self) -> ApiSettings {
        ApiSettings {
            base_url: self.api_base_url.clone(),
            upload_timeout: Duration::from_secs(self.upload_timeout_secs),
            poll_timeout: Duration::from_secs(self.poll_timeout_secs),
            result_timeout: Duration::from_secs(self.result_timeout_secs),
            tab_timeout: Duration::from_secs(self.result_timeout_secs),
            chat_timeout: Duration::from_secs(self.chat_timeout_secs),
            ..ApiSettings::default()
        }
    }

    pub fn poll_settings(&self) -> PollSettings {
        PollSettings {
            interval: Duration::from_millis(self.poll_interval_ms),
            session_timeout: Duration::from_secs(self.session_timeout_secs),
            max_polls: self.max_polls,
        }
    }

    pub fn log_file(&self) -> PathBuf {
        self.data_dir.join(LOG_FILENAME)
    }
}
