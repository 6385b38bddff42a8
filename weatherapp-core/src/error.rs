use thiserror::Error;

/// Failures at the weather client boundary.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request to weather API failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("weather API responded with status {status}: {body}")]
    Server { status: u16, body: String },

    #[error("failed to decode weather API response: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Transport,
    Server,
    Decode,
}

impl ClientError {
    pub fn kind(&self) -> FailureKind {
        match self {
            ClientError::Transport(_) => FailureKind::Transport,
            ClientError::Server { .. } => FailureKind::Server,
            ClientError::Decode(_) => FailureKind::Decode,
        }
    }
}
