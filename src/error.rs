use std::path::PathBuf;

use thiserror::Error;

// ---------------------------------------------------------------------------
// Parse-time errors
// ---------------------------------------------------------------------------

/// Failures while turning a dropped file into a [`crate::data::model::Dataset`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    /// The file does not declare a tabular media type; content was not read.
    #[error("please drop a CSV file (got {media_type})")]
    InvalidFileType { media_type: String },

    /// The file has a header but no data rows (or nothing at all).
    #[error("CSV file is empty")]
    EmptyDataset,

    /// The CSV engine rejected the structure of the file.
    #[error("error parsing CSV: {message}")]
    MalformedInput { message: String },
}

// ---------------------------------------------------------------------------
// Submission errors
// ---------------------------------------------------------------------------

/// Failures of a training submission, from validation to response decoding.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SubmitError {
    /// Missing or invalid target / algorithm, or no ready dataset.
    #[error("{message}")]
    Validation { message: String },

    /// A training request is already outstanding.
    #[error("a training request is already in progress")]
    AlreadyInFlight,

    /// Connection error, timeout, or non-2xx status.
    #[error("error training model: {message}")]
    Network { message: String },

    /// The service answered, but not with `train` and `test` reports.
    #[error("unexpected response from training service: {message}")]
    InvalidResponseFormat { message: String },
}

impl SubmitError {
    pub fn validation(message: impl Into<String>) -> Self {
        SubmitError::Validation {
            message: message.into(),
        }
    }

    pub fn invalid_response(message: impl Into<String>) -> Self {
        SubmitError::InvalidResponseFormat {
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for SubmitError {
    fn from(err: reqwest::Error) -> Self {
        SubmitError::Network {
            message: err.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Current-error slot value
// ---------------------------------------------------------------------------

/// The single error shown to the user, whichever stage produced it.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Submit(#[from] SubmitError),
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid config value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}
