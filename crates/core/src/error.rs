#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Unknown workflow step: {0}")]
    UnknownStep(String),

    #[error("Unknown panel: {0}")]
    UnknownPanel(String),
}
