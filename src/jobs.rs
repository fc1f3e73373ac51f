use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread;

use eframe::egui;

use crate::data::loader;
use crate::data::model::Dataset;
use crate::error::{ParseError, SubmitError};
use crate::results::TrainingResult;
use crate::state::ParseTicket;
use crate::training::client::TrainingService;
use crate::training::orchestrator::SubmitTicket;

/// Completion of a background job, tagged with the token it was started with.
#[derive(Debug)]
pub enum JobMessage {
    Parsed {
        token: u64,
        outcome: Result<Dataset, ParseError>,
    },
    Trained {
        token: u64,
        outcome: Result<TrainingResult, SubmitError>,
    },
}

/// Runs parse and training jobs on worker threads.
///
/// Jobs are never cancelled; whoever applies the messages decides whether a
/// completion is still current.
pub struct JobRunner {
    service: Arc<dyn TrainingService>,
    message_tx: Sender<JobMessage>,
    message_rx: Receiver<JobMessage>,
    repaint: Option<egui::Context>,
}

impl JobRunner {
    pub fn new(service: Arc<dyn TrainingService>) -> Self {
        let (message_tx, message_rx) = mpsc::channel();
        Self {
            service,
            message_tx,
            message_rx,
            repaint: None,
        }
    }

    /// Wake the UI when a job finishes.
    pub fn with_repaint(mut self, ctx: egui::Context) -> Self {
        self.repaint = Some(ctx);
        self
    }

    pub fn spawn_parse(&self, ticket: ParseTicket) {
        let tx = self.message_tx.clone();
        let repaint = self.repaint.clone();
        thread::spawn(move || {
            let outcome = loader::load(&ticket.input);
            let _ = tx.send(JobMessage::Parsed {
                token: ticket.token,
                outcome,
            });
            if let Some(ctx) = repaint {
                ctx.request_repaint();
            }
        });
    }

    pub fn spawn_submit(&self, ticket: SubmitTicket) {
        let tx = self.message_tx.clone();
        let repaint = self.repaint.clone();
        let service = Arc::clone(&self.service);
        thread::spawn(move || {
            let outcome = service.train(&ticket.request);
            let _ = tx.send(JobMessage::Trained {
                token: ticket.token,
                outcome,
            });
            if let Some(ctx) = repaint {
                ctx.request_repaint();
            }
        });
    }

    /// Next finished job, if any, without blocking.
    pub fn try_next(&self) -> Option<JobMessage> {
        self.message_rx.try_recv().ok()
    }

    #[cfg(test)]
    fn wait_next(&self, timeout: std::time::Duration) -> Option<JobMessage> {
        self.message_rx.recv_timeout(timeout).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TrainerConfig;
    use crate::data::model::{FileInput, SourceFile};
    use crate::results::tests::result;
    use crate::state::AppState;
    use crate::status::{IngestionStatus, SubmissionStatus};
    use crate::training::request::TrainingRequest;
    use std::sync::Mutex;
    use std::time::Duration;

    const WAIT: Duration = Duration::from_secs(5);

    /// Blocks each call until the test releases it.
    struct GatedService {
        gate: Mutex<Receiver<Result<TrainingResult, SubmitError>>>,
    }

    impl TrainingService for GatedService {
        fn train(&self, _request: &TrainingRequest) -> Result<TrainingResult, SubmitError> {
            self.gate
                .lock()
                .unwrap()
                .recv()
                .unwrap_or_else(|_| Err(SubmitError::invalid_response("gate closed")))
        }
    }

    fn gated() -> (JobRunner, Sender<Result<TrainingResult, SubmitError>>) {
        let (tx, rx) = mpsc::channel();
        let service = GatedService {
            gate: Mutex::new(rx),
        };
        (JobRunner::new(Arc::new(service)), tx)
    }

    fn csv(text: &str) -> SourceFile {
        SourceFile::new("d.csv", "text/csv", text.as_bytes().to_vec())
    }

    #[test]
    fn nothing_pending_yields_none() {
        let (runner, _gate) = gated();
        assert!(runner.try_next().is_none());
    }

    #[test]
    fn parse_job_reports_back_with_its_token() {
        let (runner, _gate) = gated();
        let mut state = AppState::new(TrainerConfig::default());

        let ticket = state.begin_ingest(csv("a,b\n1,2\n")).unwrap();
        assert_eq!(state.ingestion_status(), IngestionStatus::Loading);
        runner.spawn_parse(ticket);

        let message = runner.wait_next(WAIT).unwrap();
        assert!(matches!(message, JobMessage::Parsed { token: 1, .. }));
        assert!(state.apply(message));
        assert_eq!(state.ingestion_status(), IngestionStatus::Ready);
    }

    #[test]
    fn parse_job_reads_file_from_disk() {
        let (runner, _gate) = gated();
        let mut state = AppState::new(TrainerConfig::default());
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        std::io::Write::write_all(&mut file, b"x,target\n1,0\n").unwrap();

        let ticket = state.begin_ingest(FileInput::on_disk(file.path(), None)).unwrap();
        runner.spawn_parse(ticket);

        let message = runner.wait_next(WAIT).unwrap();
        assert!(state.apply(message));
        assert_eq!(state.ingestion_status(), IngestionStatus::Ready);
        assert_eq!(state.dataset().unwrap().columns(), ["x", "target"]);
    }

    #[test]
    fn submit_job_runs_off_thread_and_completes_once() {
        let (runner, gate) = gated();
        let mut state = AppState::new(TrainerConfig::default());
        state.ingest_now(csv("a,b,target\n1,2,0\n"));
        state.set_target("target");
        state.set_algorithm("Random Forest");

        let ticket = state.begin_submit().unwrap();
        runner.spawn_submit(ticket);
        assert!(state.busy());

        // Still in flight: a second submit is refused and nothing arrives.
        assert_eq!(state.begin_submit().unwrap_err(), SubmitError::AlreadyInFlight);
        assert!(runner.try_next().is_none());

        gate.send(Ok(result(0.9, 0.8))).unwrap();
        let message = runner.wait_next(WAIT).unwrap();
        assert!(state.apply(message));

        assert_eq!(state.submission_status(), SubmissionStatus::Success);
        assert!(!state.busy());
        assert!(runner.wait_next(Duration::from_millis(50)).is_none());
    }
}
