use std::fmt;
use std::sync::Arc;

use rand::Rng;

use storage::session_store::SessionStore;
use survey_core::model::{
    ParticipantId, RatingDraft, Response, Session, SessionStats, SurveyConfig, Trial,
};
use survey_core::time::Clock;

use crate::error::SurveyError;
use crate::plan::TrialPlanner;
use crate::report::{ResultReporter, SessionReport, dispatch};

/// Lifecycle state of the controller, derived from the owned session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurveyState {
    NoSession,
    InProgress,
    Complete,
}

/// Result of submitting a rating for the current trial.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmitResult {
    pub response: Response,
    pub is_complete: bool,
    pub stats: Option<SessionStats>,
}

/// Owns the current survey session and steps it trial-by-trial.
///
/// A single controller instance exists per running survey; it persists
/// the session after every mutation and recovers it at startup.
/// Persistence failures are logged and swallowed so that the session
/// keeps living in memory; the next successful write re-syncs durable
/// storage.
pub struct SurveyController {
    clock: Clock,
    store: SessionStore,
    reporter: Option<Arc<ResultReporter>>,
    participant: Option<ParticipantId>,
    session: Option<Session>,
}

impl SurveyController {
    #[must_use]
    pub fn new(clock: Clock, store: SessionStore) -> Self {
        Self {
            clock,
            store,
            reporter: None,
            participant: None,
            session: None,
        }
    }

    /// Attach a result reporter for completed sessions.
    #[must_use]
    pub fn with_reporter(mut self, reporter: ResultReporter) -> Self {
        self.reporter = Some(Arc::new(reporter));
        self
    }

    #[must_use]
    pub fn state(&self) -> SurveyState {
        match &self.session {
            None => SurveyState::NoSession,
            Some(session) if session.is_complete() => SurveyState::Complete,
            Some(_) => SurveyState::InProgress,
        }
    }

    #[must_use]
    pub fn participant(&self) -> Option<&ParticipantId> {
        self.participant.as_ref()
    }

    #[must_use]
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// The trial awaiting a rating, if the session is in progress.
    #[must_use]
    pub fn current_trial(&self) -> Option<&Trial> {
        self.session.as_ref().and_then(Session::current_trial)
    }

    /// Answered and total trial counts for a progress indicator.
    #[must_use]
    pub fn progress(&self) -> (usize, usize) {
        self.session
            .as_ref()
            .map_or((0, 0), |s| (s.answered_count(), s.total_trials()))
    }

    /// Aggregate statistics over the responses collected so far.
    #[must_use]
    pub fn stats(&self) -> Option<SessionStats> {
        self.session
            .as_ref()
            .map(|s| SessionStats::from_responses(s.responses()))
    }

    /// Whether a persisted session exists for the identity.
    ///
    /// Lets the caller offer the resume-or-restart choice at login;
    /// the two outcomes are `resume` and `start_session`, never a
    /// merge.
    ///
    /// # Errors
    ///
    /// Returns `SurveyError::Storage` if the backend cannot be read.
    pub async fn has_saved_session(
        &self,
        participant: &ParticipantId,
    ) -> Result<bool, SurveyError> {
        Ok(self.store.load_for(participant).await?.is_some())
    }

    /// Start a fresh session for the identity, replacing any prior one.
    ///
    /// Generates the trial list, persists the new session best-effort,
    /// and enters the in-progress state immediately.
    pub async fn start_session(
        &mut self,
        participant: ParticipantId,
        config: &SurveyConfig,
        rng: &mut (impl Rng + ?Sized),
    ) {
        let plan = TrialPlanner::new(config).build(rng);
        let session = Session::new(plan.trials, self.clock.now());
        tracing::debug!(
            participant = %participant,
            trials = session.total_trials(),
            "starting new session"
        );
        self.participant = Some(participant);
        self.session = Some(session);
        self.persist_best_effort().await;
    }

    /// Resume the persisted session for the identity, verbatim.
    ///
    /// Returns whether a session was found; malformed persisted data
    /// counts as absent and leaves the controller unchanged.
    ///
    /// # Errors
    ///
    /// Returns `SurveyError::Storage` if the backend cannot be read.
    pub async fn resume(&mut self, participant: ParticipantId) -> Result<bool, SurveyError> {
        match self.store.load_for(&participant).await? {
            Some(session) => {
                tracing::debug!(
                    participant = %participant,
                    cursor = session.cursor(),
                    total = session.total_trials(),
                    "resuming persisted session"
                );
                self.participant = Some(participant);
                self.session = Some(session);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Recover whatever session was most recently active, if any.
    ///
    /// # Errors
    ///
    /// Returns `SurveyError::Storage` if the backend cannot be read.
    pub async fn resume_current(&mut self) -> Result<bool, SurveyError> {
        match self.store.load_current().await? {
            Some((participant, session)) => {
                self.participant = Some(participant);
                self.session = Some(session);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Record a rating for the current trial and advance the cursor.
    ///
    /// An incomplete draft is rejected without any state change. On
    /// the submission that exhausts the trial list the session becomes
    /// complete, final statistics are computed, and the report is
    /// dispatched fire-and-forget.
    ///
    /// # Errors
    ///
    /// Returns `SurveyError::Rating` for an incomplete draft,
    /// `NotLoggedIn`/`NoSession` when there is nothing to rate, and
    /// `AlreadyComplete` after the last trial has been answered.
    pub async fn submit_response(
        &mut self,
        draft: RatingDraft,
    ) -> Result<SubmitResult, SurveyError> {
        let participant = self.participant.clone().ok_or(SurveyError::NotLoggedIn)?;
        let session = self.session.as_mut().ok_or(SurveyError::NoSession)?;
        if session.is_complete() {
            return Err(SurveyError::AlreadyComplete);
        }

        // Validate before touching any state.
        let rating = draft.validate()?;
        let trial = session
            .current_trial()
            .cloned()
            .ok_or(SurveyError::AlreadyComplete)?;

        let rated_at = self.clock.now();
        let response = Response::new(participant.clone(), &trial, rating, rated_at);
        session
            .record_response(response.clone())
            .map_err(|_| SurveyError::AlreadyComplete)?;

        let is_complete = session.is_complete();
        let stats = is_complete.then(|| SessionStats::from_responses(session.responses()));

        if is_complete {
            if let (Some(reporter), Some(stats)) = (&self.reporter, &stats) {
                let report = SessionReport::new(participant, session, stats, rated_at);
                dispatch(Arc::clone(reporter), report);
            }
        }

        self.persist_best_effort().await;

        Ok(SubmitResult {
            response,
            is_complete,
            stats,
        })
    }

    /// Explicitly persist the current session.
    ///
    /// # Errors
    ///
    /// Returns `SurveyError::NoSession` without an active session, or
    /// `SurveyError::Storage` if the write fails.
    pub async fn save_progress(&self) -> Result<(), SurveyError> {
        let (Some(participant), Some(session)) = (&self.participant, &self.session) else {
            return Err(SurveyError::NoSession);
        };
        self.store.save(participant, session).await?;
        Ok(())
    }

    /// Serialize the collected responses as CSV.
    #[must_use]
    pub fn export_csv(&self) -> Option<String> {
        self.session
            .as_ref()
            .map(|s| crate::export::responses_to_csv(s.responses()))
    }

    /// Destroy the session and every persisted key for the identity.
    ///
    /// Storage failures are logged and swallowed; the in-memory state
    /// always returns to `NoSession`.
    pub async fn reset(&mut self) {
        if let Some(participant) = &self.participant {
            if let Err(err) = self.store.clear_for(participant).await {
                tracing::warn!(error = %err, "failed to clear persisted session");
            }
        }
        self.participant = None;
        self.session = None;
    }

    async fn persist_best_effort(&self) {
        let (Some(participant), Some(session)) = (&self.participant, &self.session) else {
            return;
        };
        if let Err(err) = self.store.save(participant, session).await {
            tracing::warn!(error = %err, "failed to persist session; continuing in memory");
        }
    }
}

impl fmt::Debug for SurveyController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SurveyController")
            .field("participant", &self.participant)
            .field("state", &self.state())
            .field("progress", &self.progress())
            .finish_non_exhaustive()
    }
}
