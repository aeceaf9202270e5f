use thiserror::Error;

/// Failure of a single upstream completion call. None of these are retried.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("http: {0}")]
    Http(#[from] reqwest::Error),
    #[error("upstream returned {status}: {message}")]
    Status {
        status: u16,
        message: String,
    },
    #[error("empty completion")]
    EmptyCompletion,
    #[error("client configuration: {0}")]
    Config(String),
}
