//! Error types for the occultation finder.
//!
//! Only [`OutputError`] and [`ConfigError`] can end a run. Fetch and astronomy
//! errors are absorbed by the search controller and the visibility evaluator.

use std::path::PathBuf;

/// The prediction source could not complete a request.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Upstream returned HTTP {status} for {url}")]
    Status { status: u16, url: String },

    #[error("Failed to decode upstream response: {0}")]
    Decode(String),

    #[error("A {days}-day window from now is out of range")]
    InvalidWindow { days: i64 },
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            FetchError::Decode(err.to_string())
        } else {
            FetchError::Transport(err.to_string())
        }
    }
}

/// The astronomy provider cannot evaluate an event.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AstronomyError {
    #[error("Invalid coordinate: ra={ra_deg}, dec={dec_deg}")]
    InvalidCoordinate { ra_deg: f64, dec_deg: f64 },

    #[error("Timestamp outside supported range: {0}")]
    InvalidTimestamp(String),

    #[error("Invalid observing site: {0}")]
    InvalidSite(String),
}

/// Publishing the result failed. Fatal to the run.
#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Errors that abort a pipeline run.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Output(#[from] OutputError),

    /// The prediction client could not be constructed.
    #[error(transparent)]
    Source(#[from] FetchError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub type PipelineResult<T> = Result<T, PipelineError>;
