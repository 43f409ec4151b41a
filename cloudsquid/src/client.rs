#![doc = "HTTP implementation of the cloudsquid document API contract."]

//! # Client Integration (cloudsquid <-> core)
//!
//! Bridges the CLI to the [`DocumentApi`] abstraction in `cloudsquid-core`:
//! wires up the trait over reqwest for real use against the remote API.
//!
//! - The API key and the JSON content type are attached as default headers
//!   once, at construction; every call reuses the same connection pool.
//! - Each method issues exactly one attempt. Non-2xx responses become
//!   [`Error::Api`] with the body text, network failures become
//!   [`Error::Transport`] and undecodable bodies become [`Error::Decode`].
//! - Resource paths are appended to the configured endpoint, keeping any
//!   path prefix the endpoint already carries.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::{Response, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, error, info};

use cloudsquid_core::contract::{
    DocumentApi, RunRequest, RunResult, StatusResult, UploadRequest, UploadResult,
};
use cloudsquid_core::error::{Error, Result};

use crate::config::Config;

/// Header carrying the API key on every request.
const API_KEY_HEADER: &str = "X-API-Key";

/// reqwest-backed implementation of [`DocumentApi`].
pub struct CloudsquidClient {
    http: reqwest::Client,
    endpoint: Url,
    source_id: String,
}

impl CloudsquidClient {
    /// Build a client for the given configuration.
    ///
    /// The API key must be usable as an HTTP header value; anything else is
    /// rejected here as a configuration error.
    pub fn new(config: &Config) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let mut api_key = HeaderValue::from_str(&config.api_key).map_err(|e| {
            error!(error = %e, "API key cannot be used as a header value");
            Error::configuration(format!("API key is not a valid header value: {e}"))
        })?;
        api_key.set_sensitive(true);
        headers.insert(API_KEY_HEADER, api_key);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        info!(
            endpoint = %config.endpoint,
            source_id = %config.source_id,
            "Initialised cloudsquid client"
        );
        Ok(CloudsquidClient {
            http,
            endpoint: config.endpoint.clone(),
            source_id: config.source_id.clone(),
        })
    }

    /// Join path segments onto the configured endpoint.
    fn url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.endpoint.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| Error::configuration("endpoint URL cannot be a base"))?;
            path.pop_if_empty().extend(segments);
        }
        Ok(url)
    }
}

/// Check the response status and decode the JSON body.
async fn decode_response<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        error!(status = %status, body = %body, "API returned an error response");
        return Err(Error::api_error(status.as_u16(), body));
    }
    debug!(status = %status, "API call succeeded");
    Ok(serde_json::from_str(&body)?)
}

#[async_trait]
impl DocumentApi for CloudsquidClient {
    async fn upload_document<'a>(&self, req: UploadRequest<'a>) -> Result<UploadResult> {
        info!(filename = %req.filename, mimetype = %req.mimetype, "Uploading file");
        let url = self.url(&["datasources", &self.source_id, "documents"])?;

        let response = match self.http.post(url).json(&req).send().await {
            Ok(response) => response,
            Err(e) => {
                error!(error = %e, filename = %req.filename, "Upload request failed to send");
                return Err(Error::Transport(e));
            }
        };
        let result: UploadResult = decode_response(response).await?;
        info!(file_id = %result.file_id, "File uploaded successfully");
        Ok(result)
    }

    async fn run_pipeline<'a>(&self, req: RunRequest<'a>) -> Result<RunResult> {
        info!(file_id = %req.file_id, pipeline = %req.pipeline, "Running file");
        let url = self.url(&["datasources", &self.source_id, "run"])?;

        let response = match self.http.post(url).json(&req).send().await {
            Ok(response) => response,
            Err(e) => {
                error!(error = %e, file_id = %req.file_id, "Run request failed to send");
                return Err(Error::Transport(e));
            }
        };
        let result: RunResult = decode_response(response).await?;
        info!(run_id = %result.run_id, "File run triggered successfully");
        Ok(result)
    }

    async fn get_status(&self, run_id: &str) -> Result<StatusResult> {
        debug!(run_id = %run_id, "Polling run status");
        let url = self.url(&["datasources", &self.source_id, "run", run_id])?;

        let response = match self.http.get(url).send().await {
            Ok(response) => response,
            Err(e) => {
                error!(error = %e, run_id = %run_id, "Status request failed to send");
                return Err(Error::Transport(e));
            }
        };
        let status: StatusResult = decode_response(response).await?;
        debug!(run_id = %run_id, status = %status.status, "Run status received");
        Ok(status)
    }
}
