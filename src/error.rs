use thiserror::Error;

/// Failure to load or validate a game configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON parse error: {0}")]
    Ron(#[from] ron::error::SpannedError),
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Failure reported by a host collaborator (renderer, audio, UI).
///
/// The simulation never propagates these; they are logged and dropped.
#[derive(Debug, Error)]
pub enum HostError {
    #[error("{0} unavailable")]
    Unavailable(&'static str),
    #[error("request rejected: {0}")]
    Rejected(String),
}
