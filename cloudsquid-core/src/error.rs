//! Error types shared by the client and the extraction workflow.

/// Result type for all cloudsquid operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Every way one extraction workflow can fail.
///
/// The first two variants are detected before any network call; the rest map
/// one-to-one onto the remote interaction that produced them.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Missing or unusable configuration value.
    #[error("configuration error: {reason}")]
    Configuration { reason: String },

    /// No upload filename could be derived from the input path.
    #[error("upload filename must not be empty")]
    MissingFilename,

    /// Network-level failure such as DNS or a refused connection.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-2xx HTTP response, carrying the status code and the body text.
    #[error("API error: {status} - {body}")]
    Api { status: u16, body: String },

    /// A 2xx response whose body did not decode into the expected shape.
    #[error("decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// The pipeline reached the terminal "error" status for this run.
    #[error("processing error: {detail}")]
    Processing { detail: serde_json::Value },

    /// The run was still pending when the configured poll budget ran out.
    #[error("run {run_id} not terminal after {attempts} status checks")]
    PollLimit { run_id: String, attempts: u32 },
}

impl Error {
    /// Configuration error with the given reason.
    pub fn configuration(reason: impl Into<String>) -> Self {
        Self::Configuration {
            reason: reason.into(),
        }
    }

    /// API error from a response status and body text.
    pub fn api_error(status: u16, body: impl Into<String>) -> Self {
        Self::Api {
            status,
            body: body.into(),
        }
    }
}
