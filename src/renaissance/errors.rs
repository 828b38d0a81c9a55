//! Error types for the student-portal API client.

#[derive(Debug, thiserror::Error)]
pub enum RenaissanceApiError {
    #[error("Portal session is invalid or expired: {0}")]
    InvalidSession(String),
    #[error("Failed to parse response from {url} (status {status})")]
    ParseFailed {
        status: u16,
        url: String,
        #[source]
        source: anyhow::Error,
    },
    #[error(transparent)]
    RequestFailed(#[from] anyhow::Error),
}
