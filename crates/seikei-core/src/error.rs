use thiserror::Error;

/// Errors from language-model completion providers.
#[derive(Debug, Error)]
pub enum CompleteError {
    #[error("completion failed: {0}")]
    Failed(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// Errors from loading replacement rule files.
#[derive(Debug, Error)]
pub enum RulesError {
    #[error("rules io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("rules parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("rules validation error: {0}")]
    Validation(String),
}
