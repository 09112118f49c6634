use thiserror::Error;

#[derive(Debug, Error)]
pub enum MoodmateError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Generation error: {0}")]
    Generation(#[from] GenerationError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Failure of a single remote text-generation call.
///
/// Always recovered by the conversation pipeline: the user sees a fallback
/// reply and the session carries on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    #[error("network error: {0}")]
    Network(String),

    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("quota exceeded: {0}")]
    Quota(String),

    #[error("service returned {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("malformed response: {0}")]
    Malformed(String),
}

impl GenerationError {
    /// Map a non-success HTTP status (and its body) onto an error kind.
    pub fn from_status(status: u16, body: String) -> Self {
        match status {
            401 | 403 => Self::Auth(format!("{status}: {body}")),
            429 => Self::Quota(format!("{status}: {body}")),
            _ => Self::Upstream { status, body },
        }
    }

    /// Stable tag used in log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Network(_) => "network",
            Self::Auth(_) => "auth",
            Self::Quota(_) => "quota",
            Self::Upstream { .. } => "upstream",
            Self::Malformed(_) => "malformed",
        }
    }
}

pub type Result<T> = std::result::Result<T, MoodmateError>;
