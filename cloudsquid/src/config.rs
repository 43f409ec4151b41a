//! Environment-backed configuration for the cloudsquid API.
//!
//! Loading happens once at startup, before any file or network access. The
//! resulting [`Config`] is handed to the client constructor by reference, so
//! nothing reads the ambient environment after this module returns.

use reqwest::Url;
use tracing::{error, info};

use cloudsquid_core::error::{Error, Result};

/// Environment variable holding the API key.
pub const ENV_API_KEY: &str = "CLOUDSQUID_API_KEY";
/// Environment variable holding the API base endpoint.
pub const ENV_ENDPOINT: &str = "CLOUDSQUID_API_ENDPOINT";
/// Environment variable holding the source (agent) identifier.
pub const ENV_SOURCE_ID: &str = "CLOUDSQUID_AGENT_ID";

/// Connection settings for one workflow run. Immutable once constructed.
#[derive(Debug, Clone)]
pub struct Config {
    /// API key attached to every request.
    pub api_key: String,
    /// Base endpoint the resource paths are joined onto.
    pub endpoint: Url,
    /// Source identifier scoping uploaded documents and runs.
    pub source_id: String,
}

impl Config {
    /// Read the three required values from the environment.
    ///
    /// Missing or empty variables fail here, before any network call.
    pub fn from_env() -> Result<Self> {
        let api_key = required_var(ENV_API_KEY)?;
        let raw_endpoint = required_var(ENV_ENDPOINT)?;
        let source_id = required_var(ENV_SOURCE_ID)?;

        let endpoint = Url::parse(&raw_endpoint).map_err(|e| {
            error!(error = %e, variable = ENV_ENDPOINT, "Endpoint is not a valid URL");
            Error::configuration(format!("{ENV_ENDPOINT} is not a valid URL: {e}"))
        })?;

        info!(
            api_key_set = !api_key.is_empty(),
            endpoint = %endpoint,
            source_id = %source_id,
            "Loaded cloudsquid configuration"
        );
        Ok(Config {
            api_key,
            endpoint,
            source_id,
        })
    }
}

fn required_var(name: &str) -> Result<String> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        Ok(_) => {
            error!(variable = name, "Environment variable is set but empty");
            Err(Error::configuration(format!("{name} must not be empty")))
        }
        Err(e) => {
            error!(error = %e, variable = name, "Missing required environment variable");
            Err(Error::configuration(format!("{name} missing in environment")))
        }
    }
}
