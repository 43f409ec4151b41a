//! Integration tests for the extract module using a mock DocumentApi.
//!
//! Verifies the workflow sequencing (upload, run, poll), the fail-fast
//! behavior on errors, and the timing of the status-polling loop.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use base64::Engine;
use serde_json::{json, Value};
use tokio::time::Instant;

use cloudsquid_core::contract::{
    MockDocumentApi, RunRequest, RunResult, RunStatus, StatusResult, UploadRequest, UploadResult,
};
use cloudsquid_core::error::Error;
use cloudsquid_core::extract::{extract, ExtractionJob, PollOptions, DEFAULT_POLL_INTERVAL};

fn job_with_content(bytes: &[u8]) -> ExtractionJob {
    ExtractionJob {
        filename: "report.pdf".to_string(),
        mimetype: "application/pdf".to_string(),
        content: bytes.to_vec(),
        pipeline: "cloudsquid-flash".to_string(),
    }
}

fn pending() -> StatusResult {
    StatusResult {
        status: RunStatus::Pending,
        result: Value::Null,
    }
}

#[tokio::test]
async fn extract_with_immediately_done_run_calls_each_operation_once() {
    let mut api = MockDocumentApi::new();

    api.expect_upload_document()
        .times(1)
        .withf(|req: &UploadRequest<'_>| {
            req.mimetype == "application/pdf"
                && req.filename == "report.pdf"
                && req.file == "JVBERi0xLjQK"
        })
        .returning(|_| {
            Ok(UploadResult {
                file_id: "f1".to_string(),
            })
        });

    api.expect_run_pipeline()
        .times(1)
        .withf(|req: &RunRequest<'_>| req.file_id == "f1" && req.pipeline == "cloudsquid-flash")
        .returning(|_| {
            Ok(RunResult {
                run_id: "r1".to_string(),
            })
        });

    api.expect_get_status()
        .times(1)
        .withf(|run_id: &str| run_id == "r1")
        .returning(|_| {
            Ok(StatusResult {
                status: RunStatus::Done,
                result: json!({"text": "hello"}),
            })
        });

    let report = extract(
        &api,
        &job_with_content(b"%PDF-1.4\n"),
        &PollOptions::default(),
    )
    .await
    .expect("workflow should succeed when the first status is done");

    assert_eq!(report.file_id, "f1", "report should carry the upload id");
    assert_eq!(report.run_id, "r1", "report should carry the run id");
    assert_eq!(report.attempts, 1, "a done run needs exactly one status check");
    assert_eq!(report.result, json!({"text": "hello"}));
}

#[tokio::test(start_paused = true)]
async fn extract_waits_the_configured_interval_between_status_checks() {
    let mut api = MockDocumentApi::new();

    api.expect_upload_document().returning(|_| {
        Ok(UploadResult {
            file_id: "f1".to_string(),
        })
    });
    api.expect_run_pipeline().returning(|_| {
        Ok(RunResult {
            run_id: "r1".to_string(),
        })
    });

    let instants: Arc<Mutex<Vec<Instant>>> = Arc::new(Mutex::new(Vec::new()));
    let seen = instants.clone();
    let mut remaining_pending = 3;
    api.expect_get_status().times(4).returning(move |_| {
        seen.lock().unwrap().push(Instant::now());
        if remaining_pending > 0 {
            remaining_pending -= 1;
            Ok(pending())
        } else {
            Ok(StatusResult {
                status: RunStatus::Done,
                result: json!({"pages": 1}),
            })
        }
    });

    let report = extract(&api, &job_with_content(b"bytes"), &PollOptions::default())
        .await
        .expect("workflow should succeed after pending statuses");

    assert_eq!(
        report.attempts, 4,
        "three pending statuses then done means four status checks"
    );

    let instants = instants.lock().unwrap();
    assert_eq!(instants.len(), 4);
    for pair in instants.windows(2) {
        assert_eq!(
            pair[1].duration_since(pair[0]),
            DEFAULT_POLL_INTERVAL,
            "consecutive status checks must be separated by exactly one interval"
        );
    }
}

#[tokio::test(start_paused = true)]
async fn extract_treats_unknown_status_labels_as_still_pending() {
    let mut api = MockDocumentApi::new();

    api.expect_upload_document().returning(|_| {
        Ok(UploadResult {
            file_id: "f1".to_string(),
        })
    });
    api.expect_run_pipeline().returning(|_| {
        Ok(RunResult {
            run_id: "r1".to_string(),
        })
    });

    let mut first = true;
    api.expect_get_status().times(2).returning(move |_| {
        if first {
            first = false;
            Ok(StatusResult {
                status: RunStatus::Other("queued".to_string()),
                result: Value::Null,
            })
        } else {
            Ok(StatusResult {
                status: RunStatus::Done,
                result: json!({"pages": 2}),
            })
        }
    });

    let report = extract(&api, &job_with_content(b"bytes"), &PollOptions::default())
        .await
        .expect("an unknown status label must not abort the workflow");

    assert_eq!(report.attempts, 2);
    assert_eq!(report.result, json!({"pages": 2}));
}

#[tokio::test]
async fn extract_stops_with_a_processing_error_when_the_run_reports_error() {
    let mut api = MockDocumentApi::new();

    api.expect_upload_document().returning(|_| {
        Ok(UploadResult {
            file_id: "f1".to_string(),
        })
    });
    api.expect_run_pipeline().returning(|_| {
        Ok(RunResult {
            run_id: "r1".to_string(),
        })
    });
    api.expect_get_status().times(1).returning(|_| {
        Ok(StatusResult {
            status: RunStatus::Error,
            result: json!({"reason": "bad layout"}),
        })
    });

    let err = extract(&api, &job_with_content(b"bytes"), &PollOptions::default())
        .await
        .expect_err("an error status must end the workflow");

    match err {
        Error::Processing { detail } => {
            assert_eq!(detail, json!({"reason": "bad layout"}));
        }
        other => panic!("expected a processing error, got: {other}"),
    }
}

#[tokio::test]
async fn extract_aborts_before_run_when_upload_fails() {
    let mut api = MockDocumentApi::new();

    api.expect_upload_document()
        .times(1)
        .returning(|_| Err(Error::api_error(500, "upload exploded")));
    api.expect_run_pipeline().never();
    api.expect_get_status().never();

    let err = extract(&api, &job_with_content(b"bytes"), &PollOptions::default())
        .await
        .expect_err("a failed upload must end the workflow");

    assert!(
        matches!(err, Error::Api { status: 500, .. }),
        "expected the API error to pass through unchanged, got: {err}"
    );
}

#[tokio::test]
async fn extract_rejects_an_empty_filename_before_any_call() {
    let mut api = MockDocumentApi::new();
    api.expect_upload_document().never();
    api.expect_run_pipeline().never();
    api.expect_get_status().never();

    let mut job = job_with_content(b"bytes");
    job.filename.clear();

    let err = extract(&api, &job, &PollOptions::default())
        .await
        .expect_err("an empty filename must fail before any network call");

    assert!(matches!(err, Error::MissingFilename), "got: {err}");
}

#[tokio::test(start_paused = true)]
async fn extract_gives_up_after_the_configured_maximum_polls() {
    let mut api = MockDocumentApi::new();

    api.expect_upload_document().returning(|_| {
        Ok(UploadResult {
            file_id: "f1".to_string(),
        })
    });
    api.expect_run_pipeline().returning(|_| {
        Ok(RunResult {
            run_id: "r1".to_string(),
        })
    });
    api.expect_get_status().times(3).returning(|_| Ok(pending()));

    let poll = PollOptions {
        interval: Duration::from_secs(2),
        max_polls: Some(3),
    };
    let err = extract(&api, &job_with_content(b"bytes"), &poll)
        .await
        .expect_err("an exhausted poll budget must end the workflow");

    match err {
        Error::PollLimit { run_id, attempts } => {
            assert_eq!(run_id, "r1");
            assert_eq!(attempts, 3, "the budget counts status checks");
        }
        other => panic!("expected a poll limit error, got: {other}"),
    }
}

#[tokio::test]
async fn extract_encodes_file_bytes_so_they_round_trip_exactly() {
    let original: Vec<u8> = (0..=255u8).collect();

    let captured: Arc<Mutex<String>> = Arc::new(Mutex::new(String::new()));
    let sink = captured.clone();

    let mut api = MockDocumentApi::new();
    api.expect_upload_document().returning(move |req: UploadRequest<'_>| {
        *sink.lock().unwrap() = req.file.to_string();
        Ok(UploadResult {
            file_id: "f1".to_string(),
        })
    });
    api.expect_run_pipeline().returning(|_| {
        Ok(RunResult {
            run_id: "r1".to_string(),
        })
    });
    api.expect_get_status().returning(|_| {
        Ok(StatusResult {
            status: RunStatus::Done,
            result: Value::Null,
        })
    });

    extract(&api, &job_with_content(&original), &PollOptions::default())
        .await
        .expect("workflow should succeed");

    let encoded = captured.lock().unwrap();
    let decoded = base64::engine::general_purpose::STANDARD
        .decode(encoded.as_str())
        .expect("the file field must hold valid standard base64");
    assert_eq!(decoded, original, "decoding must give back the exact input bytes");
}
