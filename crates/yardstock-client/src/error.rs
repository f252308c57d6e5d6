use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("JSON serialization error for {context}: {source}")]
    Serialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("rate limited by catalog API (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("catalog API rejected credentials (HTTP {status})")]
    Unauthorized { status: u16 },

    #[error("unexpected HTTP status {status} from {url}: {body}")]
    UnexpectedStatus {
        status: u16,
        url: String,
        body: String,
    },

    #[error("invalid catalog API base URL \"{base_url}\": {reason}")]
    InvalidBaseUrl { base_url: String, reason: String },
}

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("nothing to submit")]
    EmptyBatch,

    #[error("{} problems must be fixed before submitting", .0.len())]
    Validation(Vec<String>),

    #[error("All {count} products failed: {details}")]
    AllFailed { count: usize, details: String },

    #[error("submission failed: {0}")]
    Client(#[from] ClientError),
}

impl SubmitError {
    /// Flattens the error into the user-facing message list.
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        match self {
            SubmitError::Validation(messages) => messages.clone(),
            other => vec![other.to_string()],
        }
    }
}
