use crate::config::TrainerConfig;
use crate::data::loader;
use crate::data::model::{Dataset, FileInput};
use crate::data::selection::Selection;
use crate::error::{ParseError, PipelineError, SubmitError};
use crate::jobs::JobMessage;
use crate::results::{ResultPresenter, TrainingResult, ViewMode};
use crate::status::{IngestionEvent, IngestionStatus, SubmissionStatus};
use crate::training::client::TrainingService;
use crate::training::orchestrator::{Orchestrator, SubmitTicket};

/// A file accepted for parsing, tagged with the token its completion must carry.
#[derive(Debug, Clone)]
pub struct ParseTicket {
    pub token: u64,
    pub input: FileInput,
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full pipeline state, independent of rendering.
///
/// This is the only writer of dataset, selection, result, statuses and the
/// error slot; background jobs report back through [`AppState::apply`].
#[derive(Debug)]
pub struct AppState {
    pub config: TrainerConfig,

    /// Last successfully parsed dataset (None until a file parses).
    dataset: Option<Dataset>,

    /// Name of the file currently being parsed, shown while loading.
    pending_file: Option<String>,

    selection: Selection,

    ingestion: IngestionStatus,
    parse_token: u64,

    orchestrator: Orchestrator,
    presenter: ResultPresenter,

    /// The single error shown to the user.
    error: Option<PipelineError>,

    /// Bumped whenever dataset or selection change.
    generation: u64,
    /// Generation of the submission in flight.
    submitted_generation: Option<u64>,
    /// Generation the displayed result was requested at.
    result_generation: Option<u64>,
}

impl AppState {
    pub fn new(config: TrainerConfig) -> Self {
        Self {
            config,
            dataset: None,
            pending_file: None,
            selection: Selection::default(),
            ingestion: IngestionStatus::default(),
            parse_token: 0,
            orchestrator: Orchestrator::default(),
            presenter: ResultPresenter::default(),
            error: None,
            generation: 0,
            submitted_generation: None,
            result_generation: None,
        }
    }

    // ---- accessors ----

    pub fn dataset(&self) -> Option<&Dataset> {
        self.dataset.as_ref()
    }

    pub fn pending_file(&self) -> Option<&str> {
        self.pending_file.as_deref()
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn ingestion_status(&self) -> IngestionStatus {
        self.ingestion
    }

    pub fn submission_status(&self) -> SubmissionStatus {
        self.orchestrator.status()
    }

    pub fn presenter(&self) -> &ResultPresenter {
        &self.presenter
    }

    pub fn error(&self) -> Option<&PipelineError> {
        self.error.as_ref()
    }

    /// Whether a busy indicator should be shown.
    pub fn busy(&self) -> bool {
        self.ingestion == IngestionStatus::Loading || self.submission_status().is_submitting()
    }

    /// The displayed result was produced for a dataset or selection that has
    /// since changed.
    pub fn result_is_stale(&self) -> bool {
        self.result_generation
            .is_some_and(|generation| generation != self.generation)
    }

    pub fn can_submit(&self) -> bool {
        !self.submission_status().is_submitting()
            && self.ingestion == IngestionStatus::Ready
            && self.dataset.as_ref().is_some_and(|ds| {
                self.selection
                    .is_valid(ds.columns(), &self.config.algorithms)
            })
    }

    // ---- ingestion ----

    /// Accept a new file. Returns the parse job to run, or `None` when the
    /// file was rejected up front (non-tabular media type).
    pub fn begin_ingest(&mut self, input: impl Into<FileInput>) -> Option<ParseTicket> {
        let input = input.into();
        if let Err(e) = loader::delimiter_for(input.media_type()) {
            self.reject_file(e);
            return None;
        }

        self.parse_token += 1;
        self.ingestion = self.ingestion.next(IngestionEvent::FileDropped);
        self.error = None;

        match &input {
            FileInput::Loaded(file) => log::info!("Loading '{}' ({} bytes)", file.name, file.bytes.len()),
            FileInput::OnDisk { path, .. } => log::info!("Loading '{}'", path.display()),
        }
        self.pending_file = Some(input.name().to_string());
        Some(ParseTicket {
            token: self.parse_token,
            input,
        })
    }

    /// Record a file that failed before parsing could start. Supersedes any
    /// parse still pending.
    pub fn reject_file(&mut self, error: ParseError) {
        log::error!("Failed to load file: {error}");
        self.parse_token += 1;
        self.pending_file = None;
        self.ingestion = self
            .ingestion
            .next(IngestionEvent::FileDropped)
            .next(IngestionEvent::Failed);
        self.error = Some(error.into());
    }

    /// Apply a parse outcome. Returns false when it was stale and discarded.
    pub fn complete_ingest(&mut self, token: u64, outcome: Result<Dataset, ParseError>) -> bool {
        if token != self.parse_token {
            log::warn!("Discarding stale parse result (token {token}, current {})", self.parse_token);
            return false;
        }
        self.pending_file = None;

        match outcome {
            Ok(dataset) => {
                log::info!(
                    "Loaded {} rows with columns {:?}",
                    dataset.len(),
                    dataset.columns()
                );
                if let Some(target) = self.selection.target() {
                    if !dataset.has_column(target) {
                        log::warn!("Selected target '{target}' is not a column of the new dataset");
                    }
                }
                self.dataset = Some(dataset);
                self.ingestion = self.ingestion.next(IngestionEvent::Parsed);
                self.invalidate();
            }
            Err(e) => {
                log::error!("Failed to load file: {e}");
                self.ingestion = self.ingestion.next(IngestionEvent::Failed);
                self.error = Some(e.into());
            }
        }
        true
    }

    /// Parse on the calling thread.
    pub fn ingest_now(&mut self, input: impl Into<FileInput>) {
        if let Some(ticket) = self.begin_ingest(input) {
            let outcome = loader::load(&ticket.input);
            self.complete_ingest(ticket.token, outcome);
        }
    }

    // ---- selection ----

    pub fn set_target(&mut self, name: impl Into<String>) {
        let before = self.selection.clone();
        self.selection.set_target(name);
        if self.selection != before {
            self.invalidate();
        }
    }

    pub fn set_algorithm(&mut self, id: impl Into<String>) {
        let before = self.selection.clone();
        self.selection.set_algorithm(id);
        if self.selection != before {
            self.invalidate();
        }
    }

    pub fn set_view_mode(&mut self, mode: ViewMode) {
        self.presenter.set_view_mode(mode);
    }

    fn invalidate(&mut self) {
        self.generation += 1;
        self.orchestrator.invalidate();
    }

    // ---- submission ----

    /// Validate and start a submission. Rejections are stored in the error
    /// slot as well as returned, except `AlreadyInFlight`: the outstanding
    /// request still owns the status and the slot.
    pub fn begin_submit(&mut self) -> Result<SubmitTicket, SubmitError> {
        match self.orchestrator.begin(
            self.dataset.as_ref(),
            self.ingestion,
            &self.selection,
            &self.config,
        ) {
            Ok(ticket) => {
                self.error = None;
                self.submitted_generation = Some(self.generation);
                log::info!(
                    "Submitting '{}' with {} on target '{}'",
                    ticket.request.file_name,
                    ticket.request.algorithm,
                    ticket.request.target
                );
                Ok(ticket)
            }
            Err(e) => {
                log::warn!("Submission rejected: {e}");
                if e != SubmitError::AlreadyInFlight {
                    self.error = Some(e.clone().into());
                }
                Err(e)
            }
        }
    }

    /// Apply a training outcome. Returns false when it was stale and discarded.
    pub fn complete_submit(
        &mut self,
        token: u64,
        outcome: Result<TrainingResult, SubmitError>,
    ) -> bool {
        let Some(outcome) = self.orchestrator.finish(token, outcome) else {
            return false;
        };
        let generation = self.submitted_generation.take();

        match outcome {
            Ok(result) => {
                log::info!(
                    "Training finished: train accuracy {:.3}, test accuracy {:.3}",
                    result.train.accuracy,
                    result.test.accuracy
                );
                self.presenter.set_result(result);
                self.result_generation = generation;
                if matches!(self.error, Some(PipelineError::Submit(_))) {
                    self.error = None;
                }
            }
            Err(e) => {
                log::error!("Training failed: {e}");
                self.error = Some(e.into());
            }
        }
        true
    }

    /// Submit and wait for the service on the calling thread.
    pub fn submit_now(&mut self, service: &dyn TrainingService) -> Result<(), SubmitError> {
        let ticket = self.begin_submit()?;
        let outcome = service.train(&ticket.request);
        let result = outcome.as_ref().map(|_| ()).map_err(Clone::clone);
        self.complete_submit(ticket.token, outcome);
        result
    }

    /// Route a background job completion.
    pub fn apply(&mut self, message: JobMessage) -> bool {
        match message {
            JobMessage::Parsed { token, outcome } => self.complete_ingest(token, outcome),
            JobMessage::Trained { token, outcome } => self.complete_submit(token, outcome),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::SourceFile;
    use crate::results::tests::result;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Records calls and answers with a canned outcome.
    struct FakeService {
        calls: AtomicUsize,
        last_request: Mutex<Option<crate::training::request::TrainingRequest>>,
        outcome: Result<TrainingResult, SubmitError>,
    }

    impl FakeService {
        fn answering(outcome: Result<TrainingResult, SubmitError>) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                last_request: Mutex::new(None),
                outcome,
            }
        }
    }

    impl TrainingService for FakeService {
        fn train(
            &self,
            request: &crate::training::request::TrainingRequest,
        ) -> Result<TrainingResult, SubmitError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_request.lock().unwrap() = Some(request.clone());
            self.outcome.clone()
        }
    }

    fn csv(name: &str, text: &str) -> SourceFile {
        SourceFile::new(name, "text/csv", text.as_bytes().to_vec())
    }

    fn loaded_state() -> AppState {
        let mut state = AppState::new(TrainerConfig::default());
        state.ingest_now(csv("d.csv", "a,b,target\n1,2,0\n3,4,1\n"));
        assert_eq!(state.ingestion_status(), IngestionStatus::Ready);
        state
    }

    fn ready_state() -> AppState {
        let mut state = loaded_state();
        state.set_target("target");
        state.set_algorithm("Random Forest");
        state
    }

    fn network_error() -> SubmitError {
        SubmitError::Network {
            message: "connection refused".into(),
        }
    }

    #[test]
    fn non_tabular_drop_keeps_existing_dataset() {
        let mut state = loaded_state();
        let ticket = state.begin_ingest(SourceFile::new("x.png", "image/png", vec![1, 2, 3]));

        assert!(ticket.is_none());
        assert_eq!(state.ingestion_status(), IngestionStatus::Error);
        assert!(matches!(
            state.error(),
            Some(PipelineError::Parse(ParseError::InvalidFileType { .. }))
        ));
        assert_eq!(state.dataset().unwrap().columns(), ["a", "b", "target"]);
    }

    #[test]
    fn rejection_supersedes_pending_parse() {
        let mut state = AppState::new(TrainerConfig::default());
        let pending = state.begin_ingest(csv("one.csv", "a\n1\n")).unwrap();
        state.reject_file(ParseError::MalformedInput {
            message: "failed to read two.csv".into(),
        });

        assert!(!state.complete_ingest(pending.token, loader::load(&pending.input)));
        assert!(state.dataset().is_none());
        assert_eq!(state.ingestion_status(), IngestionStatus::Error);
        assert!(!state.busy());
    }

    #[test]
    fn header_only_file_keeps_previous_dataset() {
        let mut state = loaded_state();
        state.ingest_now(csv("empty.csv", "x,y\n"));

        assert_eq!(state.ingestion_status(), IngestionStatus::Error);
        assert_eq!(
            state.error(),
            Some(&PipelineError::Parse(ParseError::EmptyDataset))
        );
        assert_eq!(state.dataset().unwrap().len(), 2);
    }

    #[test]
    fn header_only_first_file_leaves_no_dataset() {
        let mut state = AppState::new(TrainerConfig::default());
        state.ingest_now(csv("empty.csv", "x,y\n"));
        assert!(state.dataset().is_none());
        assert_eq!(state.ingestion_status(), IngestionStatus::Error);
    }

    #[test]
    fn newer_drop_supersedes_pending_parse() {
        let mut state = AppState::new(TrainerConfig::default());
        let first = state.begin_ingest(csv("one.csv", "a\n1\n")).unwrap();
        let second = state.begin_ingest(csv("two.csv", "b\n2\n")).unwrap();
        assert_eq!(state.pending_file(), Some("two.csv"));

        // Second finishes first; the late first completion must not win.
        assert!(state.complete_ingest(second.token, loader::load(&second.input)));
        assert!(!state.complete_ingest(first.token, loader::load(&first.input)));

        assert_eq!(state.dataset().unwrap().columns(), ["b"]);
        assert_eq!(state.ingestion_status(), IngestionStatus::Ready);
    }

    #[test]
    fn stale_parse_failure_does_not_flip_status() {
        let mut state = AppState::new(TrainerConfig::default());
        let first = state.begin_ingest(csv("one.csv", "a\n")).unwrap();
        let second = state.begin_ingest(csv("two.csv", "b\n2\n")).unwrap();
        state.complete_ingest(second.token, loader::load(&second.input));
        state.complete_ingest(first.token, loader::load(&first.input));
        assert_eq!(state.ingestion_status(), IngestionStatus::Ready);
        assert!(state.error().is_none());
    }

    #[test]
    fn submit_without_selection_never_calls_service() {
        let mut state = loaded_state();
        let service = FakeService::answering(Ok(result(0.9, 0.8)));

        let err = state.submit_now(&service).unwrap_err();
        assert!(matches!(err, SubmitError::Validation { .. }));
        assert_eq!(service.calls.load(Ordering::SeqCst), 0);
        assert_eq!(state.submission_status(), SubmissionStatus::Idle);
        assert!(matches!(
            state.error(),
            Some(PipelineError::Submit(SubmitError::Validation { .. }))
        ));
    }

    #[test]
    fn submit_before_any_file_is_validation_error() {
        let mut state = AppState::new(TrainerConfig::default());
        state.set_target("target");
        state.set_algorithm("Random Forest");
        assert!(matches!(
            state.begin_submit(),
            Err(SubmitError::Validation { .. })
        ));
    }

    #[test]
    fn successful_round_trip_and_view_toggle() {
        let mut state = ready_state();
        let service = FakeService::answering(Ok(result(0.9, 0.8)));

        state.submit_now(&service).unwrap();

        let sent = service.last_request.lock().unwrap().clone().unwrap();
        assert_eq!(sent.algorithm, "Random Forest");
        assert_eq!(sent.target, "target");
        assert_eq!(&*sent.file_bytes, b"a,b,target\n1,2,0\n3,4,1\n");

        assert_eq!(state.submission_status(), SubmissionStatus::Success);
        assert!(!state.busy());
        assert_eq!(state.presenter().current_metrics().unwrap().accuracy, 0.9);
        state.set_view_mode(ViewMode::Test);
        assert_eq!(state.presenter().current_metrics().unwrap().accuracy, 0.8);
    }

    #[test]
    fn resubmit_while_in_flight_is_rejected() {
        let mut state = ready_state();
        let ticket = state.begin_submit().unwrap();
        assert!(state.busy());

        assert_eq!(state.begin_submit().unwrap_err(), SubmitError::AlreadyInFlight);
        assert!(!state.can_submit());

        assert!(state.complete_submit(ticket.token, Ok(result(0.9, 0.8))));
        assert!(state.can_submit());
    }

    #[test]
    fn in_flight_rejection_leaves_no_error_after_success() {
        let mut state = ready_state();
        let ticket = state.begin_submit().unwrap();

        assert_eq!(state.begin_submit().unwrap_err(), SubmitError::AlreadyInFlight);
        assert!(state.error().is_none());

        assert!(state.complete_submit(ticket.token, Ok(result(0.9, 0.8))));
        assert_eq!(state.submission_status(), SubmissionStatus::Success);
        assert!(state.error().is_none());
    }

    #[test]
    fn success_keeps_parse_error_raised_during_flight() {
        let mut state = ready_state();
        let ticket = state.begin_submit().unwrap();
        state.reject_file(ParseError::InvalidFileType {
            media_type: "image/png".into(),
        });

        assert!(state.complete_submit(ticket.token, Ok(result(0.9, 0.8))));
        assert!(matches!(
            state.error(),
            Some(PipelineError::Parse(ParseError::InvalidFileType { .. }))
        ));
    }

    #[test]
    fn on_disk_file_with_wrong_type_is_rejected_without_reading() {
        let mut state = AppState::new(TrainerConfig::default());
        let input = FileInput::on_disk("/nonexistent/scan.png", None);

        assert!(state.begin_ingest(input).is_none());
        assert!(matches!(
            state.error(),
            Some(PipelineError::Parse(ParseError::InvalidFileType { .. }))
        ));
        assert!(state.pending_file().is_none());
    }

    #[test]
    fn network_failure_keeps_previous_result() {
        let mut state = ready_state();
        state
            .submit_now(&FakeService::answering(Ok(result(0.9, 0.8))))
            .unwrap();

        let err = state
            .submit_now(&FakeService::answering(Err(network_error())))
            .unwrap_err();

        assert_eq!(err, network_error());
        assert_eq!(state.submission_status(), SubmissionStatus::Error);
        assert_eq!(
            state.error(),
            Some(&PipelineError::Submit(network_error()))
        );
        assert_eq!(state.presenter().result().unwrap().train.accuracy, 0.9);
        assert!(!state.busy());
    }

    #[test]
    fn invalid_response_does_not_touch_result() {
        let mut state = ready_state();
        let err = state
            .submit_now(&FakeService::answering(Err(SubmitError::invalid_response(
                "missing `test` report",
            ))))
            .unwrap_err();
        assert!(matches!(err, SubmitError::InvalidResponseFormat { .. }));
        assert!(state.presenter().result().is_none());
        assert_eq!(state.submission_status(), SubmissionStatus::Error);
    }

    #[test]
    fn selection_change_marks_result_stale_and_resets_status() {
        let mut state = ready_state();
        state
            .submit_now(&FakeService::answering(Ok(result(0.9, 0.8))))
            .unwrap();
        assert!(!state.result_is_stale());

        state.set_algorithm("Decision Tree");
        assert!(state.result_is_stale());
        assert_eq!(state.submission_status(), SubmissionStatus::Idle);
        assert!(state.presenter().result().is_some());

        state
            .submit_now(&FakeService::answering(Ok(result(0.7, 0.6))))
            .unwrap();
        assert!(!state.result_is_stale());
    }

    #[test]
    fn setting_same_value_is_not_a_change() {
        let mut state = ready_state();
        state
            .submit_now(&FakeService::answering(Ok(result(0.9, 0.8))))
            .unwrap();
        state.set_target("target");
        assert!(!state.result_is_stale());
        assert_eq!(state.submission_status(), SubmissionStatus::Success);
    }

    #[test]
    fn change_during_flight_marks_arriving_result_stale() {
        let mut state = ready_state();
        let ticket = state.begin_submit().unwrap();
        state.set_target("a");
        assert_eq!(state.submission_status(), SubmissionStatus::Submitting);

        state.complete_submit(ticket.token, Ok(result(0.9, 0.8)));
        assert_eq!(state.submission_status(), SubmissionStatus::Success);
        assert!(state.result_is_stale());
    }

    #[test]
    fn reparse_preserves_target_but_invalidates_selection() {
        let mut state = ready_state();
        assert!(state.can_submit());

        state.ingest_now(csv("other.csv", "x,y\n1,2\n"));
        assert_eq!(state.selection().target(), Some("target"));
        assert!(!state.can_submit());
        assert!(matches!(
            state.begin_submit(),
            Err(SubmitError::Validation { .. })
        ));
    }

    #[test]
    fn redoing_the_action_clears_the_error() {
        let mut state = loaded_state();
        let _ = state.begin_submit();
        assert!(state.error().is_some());

        state.set_target("target");
        state.set_algorithm("Random Forest");
        state.begin_submit().unwrap();
        assert!(state.error().is_none());
    }
}
