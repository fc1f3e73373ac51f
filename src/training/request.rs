use std::sync::Arc;

use crate::config::TrainerConfig;
use crate::data::loader;
use crate::data::model::Dataset;
use crate::data::selection::Selection;
use crate::error::SubmitError;
use crate::status::IngestionStatus;

/// Snapshot of everything sent to `/generate`, taken at submit time.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingRequest {
    pub file_name: String,
    pub file_media_type: String,
    pub file_bytes: Arc<[u8]>,
    pub algorithm: String,
    pub target: String,
    pub test_size: f64,
}

impl TrainingRequest {
    /// Validate the inputs and freeze them into a request.
    ///
    /// Fails with [`SubmitError::Validation`] when no dataset is ready or the
    /// selection does not fit the dataset and the configured algorithms.
    pub fn build(
        dataset: Option<&Dataset>,
        ingestion: IngestionStatus,
        selection: &Selection,
        config: &TrainerConfig,
    ) -> Result<Self, SubmitError> {
        let dataset = match (dataset, ingestion) {
            (Some(ds), IngestionStatus::Ready) => ds,
            (_, IngestionStatus::Loading) => {
                return Err(SubmitError::validation("the dataset is still loading"))
            }
            _ => return Err(SubmitError::validation("please select a CSV file")),
        };

        let (target, algorithm) = selection.validate(dataset.columns(), &config.algorithms)?;
        let source = dataset.source();

        Ok(Self {
            file_name: source.name.clone(),
            file_media_type: upload_media_type(&source.media_type).to_string(),
            file_bytes: Arc::clone(&source.bytes),
            algorithm: algorithm.to_string(),
            target: target.to_string(),
            test_size: config.test_size,
        })
    }
}

/// Content type of the uploaded file part. Declared aliases such as
/// `application/vnd.ms-excel` collapse to the canonical type for the delimiter.
fn upload_media_type(declared: &str) -> &'static str {
    match loader::delimiter_for(declared) {
        Ok(b'\t') => "text/tab-separated-values",
        _ => "text/csv",
    }
}
