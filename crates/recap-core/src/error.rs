//! Error types for the recap pipeline.

use thiserror::Error;

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while running the analysis pipeline.
///
/// `Input` aborts a run immediately. `ModelUnavailable` and
/// `MalformedOutput` are caught at each stage boundary by the orchestrator
/// and turned into an `Unavailable` marker for that stage, so sibling
/// stages still produce results.
#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid input: {0}")]
    Input(String),

    #[error("model unavailable: {0}")]
    ModelUnavailable(String),

    #[error("malformed model output: {0}")]
    MalformedOutput(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// True when the orchestrator may degrade this error into a per-stage
    /// `Unavailable` marker instead of failing the whole run.
    pub fn is_stage_recoverable(&self) -> bool {
        matches!(self, Error::ModelUnavailable(_) | Error::MalformedOutput(_))
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Error::ModelUnavailable(format!("request timed out: {err}"))
        } else if err.is_decode() {
            Error::MalformedOutput(err.to_string())
        } else {
            Error::ModelUnavailable(err.to_string())
        }
    }
}
