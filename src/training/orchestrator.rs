use crate::config::TrainerConfig;
use crate::data::model::Dataset;
use crate::data::selection::Selection;
use crate::error::SubmitError;
use crate::results::TrainingResult;
use crate::status::{IngestionStatus, SubmissionEvent, SubmissionStatus};

use super::request::TrainingRequest;

/// A submission accepted by [`Orchestrator::begin`], to be run elsewhere and
/// reported back with its token.
#[derive(Debug, Clone)]
pub struct SubmitTicket {
    pub token: u64,
    pub request: TrainingRequest,
}

/// Single-flight owner of the submission status.
#[derive(Debug, Default)]
pub struct Orchestrator {
    status: SubmissionStatus,
    last_token: u64,
    in_flight: Option<u64>,
}

impl Orchestrator {
    pub fn status(&self) -> SubmissionStatus {
        self.status
    }

    /// Start a submission.
    ///
    /// Rejected with [`SubmitError::AlreadyInFlight`] while a request is
    /// outstanding, and with [`SubmitError::Validation`] when the inputs are
    /// not ready. A rejection leaves the status untouched.
    pub fn begin(
        &mut self,
        dataset: Option<&Dataset>,
        ingestion: IngestionStatus,
        selection: &Selection,
        config: &TrainerConfig,
    ) -> Result<SubmitTicket, SubmitError> {
        if self.status.is_submitting() {
            return Err(SubmitError::AlreadyInFlight);
        }

        let request = TrainingRequest::build(dataset, ingestion, selection, config)?;

        self.last_token += 1;
        self.in_flight = Some(self.last_token);
        self.status = self.status.next(SubmissionEvent::Submit);

        Ok(SubmitTicket {
            token: self.last_token,
            request,
        })
    }

    /// Record the outcome of the request identified by `token`.
    ///
    /// Returns `None`, changing nothing, when `token` is not the request in
    /// flight.
    pub fn finish(
        &mut self,
        token: u64,
        outcome: Result<TrainingResult, SubmitError>,
    ) -> Option<Result<TrainingResult, SubmitError>> {
        if self.in_flight != Some(token) {
            log::warn!("Discarding stale training response (token {token})");
            return None;
        }
        self.in_flight = None;

        let event = if outcome.is_ok() {
            SubmissionEvent::Succeeded
        } else {
            SubmissionEvent::Failed
        };
        self.status = self.status.next(event);
        Some(outcome)
    }

    /// Drop a finished outcome back to `Idle` after its inputs changed.
    pub fn invalidate(&mut self) {
        self.status = self.status.next(SubmissionEvent::Invalidated);
    }
}
