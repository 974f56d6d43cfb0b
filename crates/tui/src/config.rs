use std::path::PathBuf;
use std::time::Duration;

use dbstudio_client::api::DEFAULT_BACKEND_URL;

use crate::error::StudioError;

const DEFAULT_STATE_FILE: &str = ".dbstudio/state.json";
const DEFAULT_LOG_FILE: &str = ".dbstudio/dbstudio.log";
const DEFAULT_TICK_MS: u64 = 250;

/// Studio configuration loaded from environment variables.
///
/// All fields have defaults suitable for a backend running locally.
#[derive(Debug, Clone, PartialEq)]
pub struct StudioConfig {
    /// Base URL of the analysis backend, fixed for the session.
    pub backend_url: String,
    /// File backing the durable key-value storage (panel sizes, node
    /// positions).
    pub state_file: PathBuf,
    /// Log destination. The terminal itself is owned by the UI.
    pub log_file: PathBuf,
    /// Emit JSON log lines instead of the human-readable format.
    pub log_json: bool,
    /// Idle redraw interval of the event loop.
    pub tick: Duration,
}

impl StudioConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                   |
    /// |------------------------|---------------------------|
    /// | `DBSTUDIO_BACKEND_URL` | `http://localhost:5000`   |
    /// | `DBSTUDIO_STATE_FILE`  | `.dbstudio/state.json`    |
    /// | `DBSTUDIO_LOG_FILE`    | `.dbstudio/dbstudio.log`  |
    /// | `DBSTUDIO_LOG_JSON`    | `false`                   |
    /// | `DBSTUDIO_TICK_MS`     | `250`                     |
    pub fn from_env() -> Result<Self, StudioError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, StudioError> {
        let backend_url = lookup("DBSTUDIO_BACKEND_URL")
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BACKEND_URL.into());
        if !backend_url.starts_with("http://") && !backend_url.starts_with("https://") {
            return Err(StudioError::Config(format!(
                "DBSTUDIO_BACKEND_URL must be an http(s) URL, got {backend_url:?}"
            )));
        }

        let state_file = lookup("DBSTUDIO_STATE_FILE")
            .unwrap_or_else(|| DEFAULT_STATE_FILE.into())
            .into();
        let log_file = lookup("DBSTUDIO_LOG_FILE")
            .unwrap_or_else(|| DEFAULT_LOG_FILE.into())
            .into();

        let log_json = match lookup("DBSTUDIO_LOG_JSON").as_deref() {
            None | Some("") => false,
            Some(value) => parse_bool(value).ok_or_else(|| {
                StudioError::Config(format!("DBSTUDIO_LOG_JSON must be true or false, got {value:?}"))
            })?,
        };

        let tick_ms: u64 = match lookup("DBSTUDIO_TICK_MS") {
            None => DEFAULT_TICK_MS,
            Some(value) => value
                .parse::<u64>()
                .ok()
                .filter(|ms| *ms > 0)
                .ok_or_else(|| {
                    StudioError::Config(format!(
                        "DBSTUDIO_TICK_MS must be a positive integer, got {value:?}"
                    ))
                })?,
        };

        Ok(Self {
            backend_url,
            state_file,
            log_file,
            log_json,
            tick: Duration::from_millis(tick_ms),
        })
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
