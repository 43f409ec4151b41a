//! # extract: End-to-end extraction workflow
//!
//! Orchestrates one document extraction against a [`DocumentApi`]:
//!   1. Encodes the document bytes and uploads them.
//!   2. Starts the named pipeline run against the uploaded file.
//!   3. Polls the run status at a fixed interval until it is terminal.
//!
//! # Major Types
//! - [`ExtractionJob`]: the document plus upload metadata for one run
//! - [`PollOptions`]: interval and optional poll budget for the status loop
//! - [`ExtractionReport`]: identifiers and final payload for the caller
//!
//! # Responsibilities
//! - Fail-fast orchestration: any transport, API or decode error aborts the
//!   workflow immediately. Only a non-terminal status re-polls.
//! - Strict sequencing: at most one call is outstanding at any time, and
//!   consecutive status checks always have one delay between them.
//! - Invokes logging throughout for traceability.

use std::time::Duration;

use base64::Engine;
use tracing::{debug, error, info};

use crate::contract::{DocumentApi, FileKind, RunRequest, RunStatus, StatusResult, UploadRequest};
use crate::error::{Error, Result};

/// Delay between consecutive status checks unless configured otherwise.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// One document to extract: raw bytes plus the metadata the API needs.
#[derive(Debug, Clone)]
pub struct ExtractionJob {
    /// Upload filename; must not be empty.
    pub filename: String,
    /// Mimetype reported to the API.
    pub mimetype: String,
    /// Raw file bytes, encoded by the workflow before upload.
    pub content: Vec<u8>,
    /// Named processing pipeline to run.
    pub pipeline: String,
}

/// Tuning for the status-polling loop.
#[derive(Debug, Clone)]
pub struct PollOptions {
    /// Delay between consecutive status checks.
    pub interval: Duration,
    /// Give up after this many status checks. `None` polls until the run
    /// is terminal or a call fails.
    pub max_polls: Option<u32>,
}

impl Default for PollOptions {
    fn default() -> Self {
        PollOptions {
            interval: DEFAULT_POLL_INTERVAL,
            max_polls: None,
        }
    }
}

/// Outcome of a finished workflow, for rendering and audit.
#[derive(Debug, Clone)]
pub struct ExtractionReport {
    /// Identifier the API assigned to the uploaded file.
    pub file_id: String,
    /// Identifier of the pipeline run.
    pub run_id: String,
    /// Number of status checks issued, including the terminal one.
    pub attempts: u32,
    /// Result payload reported with the terminal "done" status.
    pub result: serde_json::Value,
}

/// Run one complete extraction workflow against the given client.
///
/// Returns the final payload once the run reports "done". A run that
/// reports "error" becomes [`Error::Processing`] with the reported detail.
/// Any other status re-polls after `poll.interval`; with `poll.max_polls`
/// unset the loop ends only on a terminal status or a failed call.
pub async fn extract<A>(api: &A, job: &ExtractionJob, poll: &PollOptions) -> Result<ExtractionReport>
where
    A: DocumentApi,
{
    if job.filename.is_empty() {
        error!("[EXTRACT][ERROR] Upload filename is empty, refusing to start");
        return Err(Error::MissingFilename);
    }

    info!(
        filename = %job.filename,
        mimetype = %job.mimetype,
        size = job.content.len(),
        "[EXTRACT] Preparing upload for file"
    );
    let encoded = base64::engine::general_purpose::STANDARD.encode(&job.content);
    let upload_req = UploadRequest {
        mimetype: &job.mimetype,
        filename: &job.filename,
        file_type: FileKind::Binary,
        file: &encoded,
    };
    let uploaded = match api.upload_document(upload_req).await {
        Ok(res) => {
            info!(file_id = %res.file_id, "[EXTRACT] Upload succeeded");
            res
        }
        Err(e) => {
            error!(error = %e, filename = %job.filename, "[EXTRACT][ERROR] Upload failed");
            return Err(e);
        }
    };

    info!(
        file_id = %uploaded.file_id,
        pipeline = %job.pipeline,
        "[EXTRACT] Starting pipeline run"
    );
    let run_req = RunRequest {
        file_id: &uploaded.file_id,
        pipeline: &job.pipeline,
    };
    let run = match api.run_pipeline(run_req).await {
        Ok(res) => {
            info!(run_id = %res.run_id, "[EXTRACT] Run started");
            res
        }
        Err(e) => {
            error!(error = %e, file_id = %uploaded.file_id, "[EXTRACT][ERROR] Starting run failed");
            return Err(e);
        }
    };

    let mut attempts: u32 = 0;
    loop {
        let check = match api.get_status(&run.run_id).await {
            Ok(res) => res,
            Err(e) => {
                error!(error = %e, run_id = %run.run_id, "[EXTRACT][ERROR] Status check failed");
                return Err(e);
            }
        };
        attempts += 1;

        let StatusResult { status, result } = check;
        match status {
            RunStatus::Done => {
                info!(run_id = %run.run_id, attempts, "[EXTRACT] Run finished");
                return Ok(ExtractionReport {
                    file_id: uploaded.file_id,
                    run_id: run.run_id,
                    attempts,
                    result,
                });
            }
            RunStatus::Error => {
                error!(
                    run_id = %run.run_id,
                    detail = %result,
                    "[EXTRACT][ERROR] Run reported a processing error"
                );
                return Err(Error::Processing { detail: result });
            }
            other => {
                debug!(
                    run_id = %run.run_id,
                    status = %other,
                    attempt = attempts,
                    "[EXTRACT] Run still pending"
                );
            }
        }

        if let Some(max) = poll.max_polls {
            if attempts >= max {
                error!(
                    run_id = %run.run_id,
                    attempts,
                    "[EXTRACT][ERROR] Run not terminal within the poll budget"
                );
                return Err(Error::PollLimit {
                    run_id: run.run_id,
                    attempts,
                });
            }
        }

        tokio::time::sleep(poll.interval).await;
    }
}
