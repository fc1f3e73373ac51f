// ---------------------------------------------------------------------------
// Ingestion state machine
// ---------------------------------------------------------------------------

/// Progress of turning a dropped file into a dataset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum IngestionStatus {
    #[default]
    Idle,
    Loading,
    Ready,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestionEvent {
    /// A new file arrived; valid from every state.
    FileDropped,
    Parsed,
    Failed,
}

impl IngestionStatus {
    /// Pure transition function. Completions outside `Loading` are ignored.
    pub fn next(self, event: IngestionEvent) -> Self {
        use IngestionEvent as E;
        use IngestionStatus as S;
        match (self, event) {
            (_, E::FileDropped) => S::Loading,
            (S::Loading, E::Parsed) => S::Ready,
            (S::Loading, E::Failed) => S::Error,
            (state, _) => state,
        }
    }
}

// ---------------------------------------------------------------------------
// Submission state machine
// ---------------------------------------------------------------------------

/// Progress of the (single) training request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SubmissionStatus {
    #[default]
    Idle,
    Submitting,
    Success,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionEvent {
    Submit,
    Succeeded,
    Failed,
    /// Dataset or selection changed after the last outcome.
    Invalidated,
}

impl SubmissionStatus {
    /// Pure transition function. `Submitting` only leaves through an outcome.
    pub fn next(self, event: SubmissionEvent) -> Self {
        use SubmissionEvent as E;
        use SubmissionStatus as S;
        match (self, event) {
            (S::Idle | S::Success | S::Error, E::Submit) => S::Submitting,
            (S::Submitting, E::Succeeded) => S::Success,
            (S::Submitting, E::Failed) => S::Error,
            (S::Success | S::Error, E::Invalidated) => S::Idle,
            (state, _) => state,
        }
    }

    pub fn is_submitting(self) -> bool {
        self == SubmissionStatus::Submitting
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drop_returns_to_loading_from_anywhere() {
        for state in [
            IngestionStatus::Idle,
            IngestionStatus::Loading,
            IngestionStatus::Ready,
            IngestionStatus::Error,
        ] {
            assert_eq!(state.next(IngestionEvent::FileDropped), IngestionStatus::Loading);
        }
    }

    #[test]
    fn parse_outcome_only_applies_while_loading() {
        let loading = IngestionStatus::Loading;
        assert_eq!(loading.next(IngestionEvent::Parsed), IngestionStatus::Ready);
        assert_eq!(loading.next(IngestionEvent::Failed), IngestionStatus::Error);
        assert_eq!(
            IngestionStatus::Ready.next(IngestionEvent::Failed),
            IngestionStatus::Ready
        );
        assert_eq!(
            IngestionStatus::Idle.next(IngestionEvent::Parsed),
            IngestionStatus::Idle
        );
    }

    #[test]
    fn submission_lifecycle() {
        let s = SubmissionStatus::default();
        let s = s.next(SubmissionEvent::Submit);
        assert!(s.is_submitting());
        let s = s.next(SubmissionEvent::Succeeded);
        assert_eq!(s, SubmissionStatus::Success);
        let s = s.next(SubmissionEvent::Submit);
        assert!(s.is_submitting());
        let s = s.next(SubmissionEvent::Failed);
        assert_eq!(s, SubmissionStatus::Error);
        assert_eq!(s.next(SubmissionEvent::Invalidated), SubmissionStatus::Idle);
    }

    #[test]
    fn submitting_ignores_invalidation_and_resubmit() {
        let s = SubmissionStatus::Submitting;
        assert_eq!(s.next(SubmissionEvent::Invalidated), SubmissionStatus::Submitting);
        assert_eq!(s.next(SubmissionEvent::Submit), SubmissionStatus::Submitting);
    }

    #[test]
    fn outcomes_without_request_are_ignored() {
        assert_eq!(
            SubmissionStatus::Idle.next(SubmissionEvent::Succeeded),
            SubmissionStatus::Idle
        );
        assert_eq!(
            SubmissionStatus::Success.next(SubmissionEvent::Failed),
            SubmissionStatus::Success
        );
    }
}
