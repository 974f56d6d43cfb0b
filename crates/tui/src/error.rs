use dbstudio_client::api::BackendApiError;

/// Errors that end the studio session.
///
/// Backend failures during normal use never reach this type; they are
/// turned into messages in the message log instead.
#[derive(Debug, thiserror::Error)]
pub enum StudioError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// An environment variable held an unusable value.
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Backend(#[from] BackendApiError),

    /// The terminal could not be switched into or out of UI mode.
    #[error("Terminal error: {0}")]
    Terminal(String),
}
