//! # cloudsquid CLI Interface (Module)
//!
//! This module implements the command-line surface for cloudsquid: argument
//! parsing, configuration loading and the user-visible workflow invocation.
//!
//! All business logic (the API contract and the extraction workflow) lives
//! in the `cloudsquid-core` crate. This module is strictly CLI glue:
//! ergonomic argument exposure, environment configuration and output
//! rendering.
//!
//! ## How To Use
//! - For command-line users: run the installed `cloudsquid` binary with
//!   `--help` for usage.
//! - For programmatic or integration-test use: construct a [`Cli`] and call
//!   [`run`] directly.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;

use cloudsquid_core::extract::{extract, ExtractionJob, PollOptions};

use crate::client::CloudsquidClient;
use crate::config::Config;

/// Upload a document, run an extraction pipeline on it and print the result.
#[derive(Parser)]
#[clap(
    name = "cloudsquid",
    version,
    about = "Upload a document to the cloudsquid API, run an extraction pipeline and print the final result as JSON"
)]
pub struct Cli {
    /// Path of the file to upload.
    pub file: PathBuf,

    /// Named processing pipeline to run against the uploaded document.
    #[clap(long, default_value = "cloudsquid-flash")]
    pub pipeline: String,

    /// Mimetype reported for the uploaded file.
    #[clap(long, default_value = "application/pdf")]
    pub mimetype: String,

    /// Seconds to wait between consecutive status checks.
    #[clap(long, default_value_t = 2)]
    pub poll_interval: u64,

    /// Stop with an error after this many status checks. Without it the
    /// client polls until the run is terminal.
    #[clap(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub max_polls: Option<u32>,
}

/// Load configuration, read the input file and drive the extraction
/// workflow, printing the final result payload to stdout.
pub async fn run(cli: Cli) -> Result<()> {
    let config = Config::from_env()?;
    let client = CloudsquidClient::new(&config)?;

    let content = std::fs::read(&cli.file)
        .with_context(|| format!("reading file {}", cli.file.display()))?;
    let filename = cli
        .file
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    let job = ExtractionJob {
        filename,
        mimetype: cli.mimetype.clone(),
        content,
        pipeline: cli.pipeline.clone(),
    };
    let poll = PollOptions {
        interval: Duration::from_secs(cli.poll_interval),
        max_polls: cli.max_polls,
    };

    tracing::info!(
        file = %cli.file.display(),
        pipeline = %job.pipeline,
        poll_interval_secs = cli.poll_interval,
        max_polls = ?poll.max_polls,
        "Starting extraction workflow"
    );
    let report = extract(&client, &job, &poll).await?;
    tracing::info!(
        file_id = %report.file_id,
        run_id = %report.run_id,
        attempts = report.attempts,
        "Final result ready"
    );

    // stdout carries exactly the pretty-printed result payload.
    println!("{}", serde_json::to_string_pretty(&report.result)?);
    Ok(())
}
