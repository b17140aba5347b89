/// All errors that can occur during score fetching and tracking operations.
#[derive(thiserror::Error, Debug)]
pub enum CricketError {
    /// HTTP request failed (network, DNS, TLS, timeout, etc.).
    #[error("http request failed for {url}: {source}")]
    Http {
        url: String,
        source: reqwest::Error,
    },

    /// Server returned a non-success HTTP status code.
    #[error("unexpected status {status} for {url}")]
    UnexpectedStatus {
        url: String,
        status: reqwest::StatusCode,
    },

    /// Failed to read the response body as text.
    #[error("failed to read response body from {url}: {source}")]
    ResponseBody {
        url: String,
        source: reqwest::Error,
    },

    /// A fetched page did not carry the embedded JSON blob.
    #[error("embedded JSON not found: {context}")]
    EmbeddedJsonNotFound { context: &'static str },

    /// Raw bytes could not be parsed as JSON at all.
    #[error("failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The root payload shape matched none of the known upstream layouts.
    #[error("unrecognized payload shape: {context}")]
    UnrecognizedPayload { context: &'static str },

    /// The requested match id is absent from the current list snapshot.
    #[error("match {match_id} not found in the current match list")]
    MatchNotFound { match_id: u32 },

    /// Refresh rate below the minimum floor was rejected.
    #[error("refresh rate of {seconds}s is below the {min}s minimum")]
    InvalidRefreshRate { seconds: u64, min: u64 },
}

pub type Result<T> = std::result::Result<T, CricketError>;
