//! Transport to the remote training service.

use reqwest::blocking::multipart::{Form, Part};
use reqwest::blocking::Client;

use crate::config::TrainerConfig;
use crate::error::SubmitError;
use crate::results::TrainingResult;

use super::request::TrainingRequest;
use super::response;

pub const GENERATE_PATH: &str = "/generate";

/// Anything that can turn a [`TrainingRequest`] into a [`TrainingResult`].
///
/// Implementations block; callers run them off the UI thread.
pub trait TrainingService: Send + Sync {
    fn train(&self, request: &TrainingRequest) -> Result<TrainingResult, SubmitError>;
}

// ---------------------------------------------------------------------------
// HTTP implementation
// ---------------------------------------------------------------------------

/// Posts multipart requests to `{base_url}/generate`.
#[derive(Debug, Clone)]
pub struct HttpTrainingService {
    client: Client,
    base_url: String,
}

impl HttpTrainingService {
    pub fn new(config: &TrainerConfig) -> Result<Self, SubmitError> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url().to_string(),
        })
    }

    pub fn endpoint(&self) -> String {
        format!("{}{GENERATE_PATH}", self.base_url)
    }
}

/// Multipart body: `algo_name`, `file`, `target_var`, `test_size`.
pub fn build_form(request: &TrainingRequest) -> Result<Form, SubmitError> {
    let file = Part::bytes(request.file_bytes.to_vec())
        .file_name(request.file_name.clone())
        .mime_str(&request.file_media_type)?;

    Ok(Form::new()
        .text("algo_name", request.algorithm.clone())
        .part("file", file)
        .text("target_var", request.target.clone())
        .text("test_size", request.test_size.to_string()))
}

impl TrainingService for HttpTrainingService {
    fn train(&self, request: &TrainingRequest) -> Result<TrainingResult, SubmitError> {
        let url = self.endpoint();
        log::info!(
            "POST {url}: algorithm '{}', target '{}', file '{}' ({} bytes)",
            request.algorithm,
            request.target,
            request.file_name,
            request.file_bytes.len()
        );

        let response = self
            .client
            .post(&url)
            .multipart(build_form(request)?)
            .send()?
            .error_for_status()?;

        let body = response.bytes()?;
        response::decode(&body, &self.base_url)
    }
}
