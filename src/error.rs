use thiserror::Error;

/// Failures raised by the GitHub collaborator layer. Any of these aborts the run.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("{method} {url} returned {status}: {body}")]
    Status {
        method: &'static str,
        url: String,
        status: u16,
        body: String,
    },

    #[error("request to {url} failed")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("unexpected response shape from {url}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

impl SyncError {
    pub fn decode(url: impl Into<String>, source: serde_json::Error) -> Self {
        SyncError::Decode {
            url: url.into(),
            source,
        }
    }
}

pub type SyncResult<T> = Result<T, SyncError>;
