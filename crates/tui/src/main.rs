//! `dbstudio` -- terminal front end of the database design studio.
//!
//! Drives an analysis backend through a dataset-to-ER-diagram workflow:
//! upload, CSV conversion, cleaning, FD detection, key detection,
//! normalization, dependency-preservation and lossless checks, and ER
//! diagram generation.
//!
//! # Environment variables
//!
//! | Variable               | Required | Default                  | Description                         |
//! |------------------------|----------|--------------------------|-------------------------------------|
//! | `DBSTUDIO_BACKEND_URL` | no       | `http://localhost:5000`  | Base URL of the analysis backend    |
//! | `DBSTUDIO_STATE_FILE`  | no       | `.dbstudio/state.json`   | Saved panel sizes and node layout   |
//! | `DBSTUDIO_LOG_FILE`    | no       | `.dbstudio/dbstudio.log` | Log destination                     |
//! | `DBSTUDIO_LOG_JSON`    | no       | `false`                  | JSON log lines                      |
//! | `DBSTUDIO_TICK_MS`     | no       | `250`                    | Idle redraw interval                |
//! | `RUST_LOG`             | no       | see below                | Log filter                          |

use std::fs::OpenOptions;
use std::sync::Mutex;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dbstudio_tui::config::StudioConfig;
use dbstudio_tui::error::StudioError;
use dbstudio_tui::runtime;

const DEFAULT_LOG_FILTER: &str = "dbstudio_tui=info,dbstudio_client=info";

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), StudioError> {
    dotenvy::dotenv().ok();

    let config = StudioConfig::from_env()?;
    init_tracing(&config)?;

    runtime::run(config).await
}

/// Log to a file; the terminal belongs to the UI.
fn init_tracing(config: &StudioConfig) -> Result<(), StudioError> {
    if let Some(dir) = config
        .log_file
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
    {
        std::fs::create_dir_all(dir)?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_file)?;

    let registry = tracing_subscriber::registry().with(
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
    );
    if config.log_json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(Mutex::new(file)),
            )
            .init();
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
            .init();
    }
    Ok(())
}
