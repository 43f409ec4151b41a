//! # contract: Client interface for the cloudsquid document API
//!
//! This module defines a single trait ([`DocumentApi`]) plus the concrete
//! wire types for the three remote operations the workflow needs: uploading
//! a document, starting a pipeline run against it, and fetching the status
//! of that run.
//!
//! ## Interface & Extensibility
//! - Implement [`DocumentApi`] to create new clients (HTTP, test double).
//! - All methods are async and return the typed [`Error`](crate::error::Error)
//!   taxonomy via the crate [`Result`].
//! - Request bodies serialize to exactly the JSON the API expects; response
//!   types ignore any fields the workflow does not consume.
//!
//! ## Mocking & Testing
//! - The trait is annotated for `mockall`, so consumers can generate
//!   deterministic mocks for unit and integration tests.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[cfg(any(test, feature = "test-export-mocks"))]
use mockall::automock;

use crate::error::Result;

/// Payload for uploading one document.
///
/// `file` must hold the standard-base64 encoding of the raw document bytes.
#[derive(Debug, Clone, Serialize)]
pub struct UploadRequest<'a> {
    /// Mimetype reported for the document, e.g. "application/pdf".
    pub mimetype: &'a str,
    /// Upload filename, the basename of the local file.
    pub filename: &'a str,
    /// Payload encoding marker.
    pub file_type: FileKind,
    /// Base64-encoded raw file bytes.
    pub file: &'a str,
}

/// Payload encoding of an uploaded document. The API accepts only binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    Binary,
}

/// Identifier handed back by a successful upload; input for starting a run.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadResult {
    pub file_id: String,
}

/// Payload for starting a pipeline run against an uploaded document.
#[derive(Debug, Clone, Serialize)]
pub struct RunRequest<'a> {
    /// Identifier previously returned by [`DocumentApi::upload_document`].
    pub file_id: &'a str,
    /// Named processing pipeline to apply, e.g. "cloudsquid-flash".
    pub pipeline: &'a str,
}

/// Identifier of a started run; the polling key for status checks.
#[derive(Debug, Clone, Deserialize)]
pub struct RunResult {
    pub run_id: String,
}

/// One status snapshot of a run.
#[derive(Debug, Clone, Deserialize)]
pub struct StatusResult {
    pub status: RunStatus,
    /// Extraction payload; meaningful once the run is terminal.
    #[serde(default)]
    pub result: serde_json::Value,
}

/// Status tag reported for a run.
///
/// The API's in-progress vocabulary is open-ended: anything that is not a
/// known tag deserializes to [`RunStatus::Other`] and is treated as still
/// in progress. Only "done" and "error" are terminal.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum RunStatus {
    /// Queued or running; not terminal.
    Pending,
    /// Finished successfully; the result payload is ready.
    Done,
    /// Finished with a remote processing failure.
    Error,
    /// Unrecognised in-progress tag, kept verbatim.
    Other(String),
}

impl From<String> for RunStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "pending" => RunStatus::Pending,
            "done" => RunStatus::Done,
            "error" => RunStatus::Error,
            _ => {
                tracing::debug!(status = %s, "Unknown run status, treating as in progress");
                RunStatus::Other(s)
            }
        }
    }
}

impl RunStatus {
    /// Whether polling stops at this status.
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunStatus::Done | RunStatus::Error)
    }

    /// The wire label for this status.
    pub fn as_str(&self) -> &str {
        match self {
            RunStatus::Pending => "pending",
            RunStatus::Done => "done",
            RunStatus::Error => "error",
            RunStatus::Other(s) => s,
        }
    }
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The three authenticated calls of the cloudsquid document API.
///
/// Implementors own transport, authentication and serialization. Every
/// method issues exactly one attempt; retrying is the caller's decision.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait DocumentApi: Send + Sync {
    /// Upload one document, returning the file identifier the API assigned.
    async fn upload_document<'a>(&self, req: UploadRequest<'a>) -> Result<UploadResult>;

    /// Start the named pipeline against a previously uploaded file.
    async fn run_pipeline<'a>(&self, req: RunRequest<'a>) -> Result<RunResult>;

    /// Fetch the current status of a run started by [`Self::run_pipeline`].
    async fn get_status(&self, run_id: &str) -> Result<StatusResult>;
}
